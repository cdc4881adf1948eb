//! Subcommand handlers.
//!
//! Each handler drives the portal the way the page would and returns the
//! text to print, so the shell stays a thin wrapper.

use crate::cli::{Cli, Command};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};
use visa_auth::AccessPolicy;
use visa_core::{AppConfig, Codigo, Ndoc};
use visa_portal::{
    render_html, render_text, Fragment, ModalBody, PageHooks, Portal, UiEvent,
};

/// Fold command-line overrides into `config`.
pub fn apply_overrides(config: &mut AppConfig, cli: &Cli) -> Result<()> {
    if let Some(url) = &cli.base_url {
        config.source.base_url = Some(url.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config.source.data_dir = Some(dir.clone());
    }
    if let Some(secs) = cli.timeout {
        config.fetch.timeout_secs = secs;
    }
    config.validate().context("invalid settings")?;
    Ok(())
}

/// Load configuration: file, then environment, then command line.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load_with_env().context("failed to load config")?,
    };
    apply_overrides(&mut config, cli)?;
    Ok(config)
}

/// Run one subcommand and return its output.
pub async fn execute(command: &Command, config: &AppConfig) -> Result<String> {
    match command {
        Command::Search { query, json } => search(config, query, *json).await,
        Command::Show {
            codigo,
            activities,
            inspections,
        } => show(config, *codigo, *activities, *inspections).await,
        Command::History { ndoc } => history(config, *ndoc).await,
        Command::Html {
            query,
            select,
            hooks,
        } => html(config, query, *select, hooks).await,
        Command::Access { email } => access(config, email),
        Command::Config { save } => show_config(config, *save),
    }
}

fn portal(config: &AppConfig) -> Result<Portal> {
    let portal = Portal::from_config(config)
        .context("no dataset configured; pass --base-url or --data-dir")?;
    // No typing to wait for on the command line.
    Ok(portal.with_debounce(Duration::ZERO))
}

async fn init(portal: &Portal) -> Result<()> {
    portal.dispatch(UiEvent::Init).await;
    if portal.index().is_err() {
        let status = portal.view().status.map(|s| s.text).unwrap_or_default();
        bail!("{status}");
    }
    Ok(())
}

async fn search(config: &AppConfig, query: &str, json: bool) -> Result<String> {
    let portal = portal(config)?;
    init(&portal).await?;
    portal.dispatch(UiEvent::QueryChanged(query.to_string())).await;

    if json {
        let state = portal.snapshot();
        return Ok(serde_json::to_string_pretty(&state.results.entries)?);
    }
    Ok(render_text(&portal.view()))
}

async fn show(config: &AppConfig, codigo: Codigo, activities: bool, inspections: bool) -> Result<String> {
    let portal = portal(config)?;
    // The index only backfills missing fields, so a detail lookup still
    // works when it is unavailable.
    portal.dispatch(UiEvent::Init).await;

    portal.dispatch(UiEvent::ResultSelected(codigo)).await;
    let view = portal.view();
    let Some(detail) = view.detail else {
        let reason = match view.modal.map(|m| m.body) {
            Some(ModalBody::Error(text)) => text,
            _ => String::new(),
        };
        bail!("failed to load establishment {codigo}: {reason}");
    };

    let mut out = visa_portal::text::detail_text(&detail);
    if activities {
        out.push('\n');
        out.push_str(&visa_portal::text::activities_text(&detail.activities));
    }
    if inspections {
        out.push('\n');
        out.push_str(&visa_portal::text::inspections_text(&detail.inspections));
    }
    Ok(out)
}

async fn history(config: &AppConfig, ndoc: Ndoc) -> Result<String> {
    let portal = portal(config)?;
    portal.dispatch(UiEvent::HistoryRequested(ndoc)).await;

    let Some(modal) = portal.view().modal else {
        bail!("history dialog did not open");
    };
    match modal.body {
        ModalBody::Error(text) => bail!("{}: {text}", modal.title),
        ModalBody::Text(text) => Ok(format!("{}\n{text}\n", modal.title)),
        ModalBody::Activities(_) | ModalBody::Inspections(_) => Ok(render_text(&portal.view())),
    }
}

async fn html(
    config: &AppConfig,
    query: &str,
    select: Option<Codigo>,
    hooks: &[String],
) -> Result<String> {
    let portal = portal(config)?;
    portal.dispatch(UiEvent::Init).await;
    portal.dispatch(UiEvent::QueryChanged(query.to_string())).await;
    if let Some(codigo) = select {
        let outcome = portal.dispatch(UiEvent::ResultSelected(codigo)).await;
        debug!(%codigo, ?outcome, "selected");
    }

    let page = if hooks.is_empty() {
        PageHooks::all()
    } else {
        PageHooks::from_ids(hooks.iter().map(String::as_str))
    };
    let by_id: BTreeMap<&str, Fragment> = render_html(&portal.view(), &page)
        .into_iter()
        .map(|(hook, fragment)| (hook.id(), fragment))
        .collect();
    Ok(serde_json::to_string_pretty(&by_id)?)
}

fn access(config: &AppConfig, email: &str) -> Result<String> {
    let policy = AccessPolicy::from_config(&config.guard).context("invalid [guard] settings")?;
    let allowed = policy.allows(email);
    info!(allowed, listed = policy.len(), "checked address");

    let verdict = if allowed { "authorized" } else { "not authorized" };
    Ok(format!(
        "{}: {verdict}\nsession lifetime: {} min, idle timeout: {} min, login page: {}\n",
        visa_auth::normalize_email(email),
        policy.session_max().num_minutes(),
        policy.idle_max().num_minutes(),
        policy.login_url(),
    ))
}

fn show_config(config: &AppConfig, save: bool) -> Result<String> {
    if save {
        config.save().context("failed to save config")?;
        let path = AppConfig::config_path()?;
        info!(path = %path.display(), "config saved");
    }
    Ok(toml::to_string_pretty(config)?)
}
