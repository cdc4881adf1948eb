//! The portal: one dispatch table over the page state.

use crate::error::{PortalError, Result};
use crate::event::{DispatchOutcome, Key, UiEvent};
use crate::hooks::PageHooks;
use crate::html::{render_html, Rendered};
use crate::messages::{self, PLACEHOLDER};
use crate::state::{ModalContent, PortalState, StatusLine};
use crate::view::PageView;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use visa_core::{AppConfig, Codigo, Ndoc};
use visa_data::{search, DetailLoader, Fetcher, HistoryLoader, IndexStore, SearchOptions, SearchOutcome};

/// Default quiet period before a typed query runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Headless lookup portal.
///
/// Cloning is cheap and clones share state, so overlapping events may be
/// dispatched from separate tasks. Every load carries a request token;
/// a completion whose token was superseded is dropped.
#[derive(Clone)]
pub struct Portal {
    fetcher: Fetcher,
    details: DetailLoader,
    history: HistoryLoader,
    options: SearchOptions,
    debounce: Duration,
    state: Arc<RwLock<PortalState>>,
}

impl Portal {
    /// Create a portal reading the dataset through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            details: DetailLoader::new(fetcher.clone()),
            history: HistoryLoader::new(fetcher.clone()),
            fetcher,
            options: SearchOptions::default(),
            debounce: DEFAULT_DEBOUNCE,
            state: Arc::new(RwLock::new(PortalState::default())),
        }
    }

    /// Create a portal from application configuration.
    ///
    /// # Errors
    /// Returns error if no dataset source is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = Fetcher::from_config(config)?;
        Ok(Self::new(fetcher)
            .with_search_options(SearchOptions::from(&config.search))
            .with_debounce(Duration::from_millis(config.portal.debounce_ms)))
    }

    /// Override search options.
    #[must_use]
    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the typing quiet period.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, PortalState> {
        self.state.read().expect("acquire read lock on portal state")
    }

    fn write(&self) -> RwLockWriteGuard<'_, PortalState> {
        self.state.write().expect("acquire write lock on portal state")
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> PortalState {
        self.read().clone()
    }

    /// The current state resolved to text.
    #[must_use]
    pub fn view(&self) -> PageView {
        PageView::from_state(&self.read())
    }

    /// Render the current state for a page carrying `hooks`.
    #[must_use]
    pub fn render(&self, hooks: &PageHooks) -> Rendered {
        render_html(&self.view(), hooks)
    }

    /// The loaded index.
    ///
    /// # Errors
    /// Returns `PortalError::IndexNotLoaded` before a successful `Init`.
    pub fn index(&self) -> Result<Arc<IndexStore>> {
        self.read().index.clone().ok_or(PortalError::IndexNotLoaded)
    }

    /// Apply one event.
    pub async fn dispatch(&self, event: UiEvent) -> DispatchOutcome {
        debug!(event = event.name(), "dispatching");
        match event {
            UiEvent::Init => self.init().await,
            UiEvent::QueryChanged(query) => self.query_changed(query).await,
            UiEvent::ClearClicked => self.clear(),
            UiEvent::ResultSelected(codigo) => self.select(codigo).await,
            UiEvent::CloseDetail => self.close_detail(),
            UiEvent::ShowActivities => self.show_list(false),
            UiEvent::ShowInspections => self.show_list(true),
            UiEvent::HistoryRequested(ndoc) => self.open_history(ndoc).await,
            UiEvent::CloseModal | UiEvent::BackdropClicked | UiEvent::KeyDown(Key::Escape) => {
                self.close_modal()
            }
            UiEvent::KeyDown(Key::Enter) => self.search_now(),
            UiEvent::KeyDown(Key::Other) => DispatchOutcome::Ignored,
        }
    }

    async fn init(&self) -> DispatchOutcome {
        {
            let mut state = self.write();
            if state.index.is_some() {
                return DispatchOutcome::Ignored;
            }
            state.modal = None;
            state.detail_visible = false;
            state.set_status(StatusLine::info(messages::INDEX_LOADING));
        }

        let loaded = IndexStore::load(&self.fetcher).await;

        let mut state = self.write();
        match loaded {
            Ok(index) => {
                info!(entries = index.len(), "index ready");
                state.set_status(StatusLine::info(messages::index_loaded(index.len())));
                state.index = Some(Arc::new(index));
                state.results.visible = true;
            }
            Err(err) => {
                error!(error = %err, "failed to load index");
                let text = messages::index_failed(messages::data_error(&err));
                state.status = Some(StatusLine::persistent_error(text));
            }
        }
        DispatchOutcome::Applied
    }

    async fn query_changed(&self, query: String) -> DispatchOutcome {
        let token = {
            let mut state = self.write();
            if state.query.trim().is_empty() && !query.trim().is_empty() {
                state.tokens.detail += 1;
                state.detail_visible = false;
            }
            state.query = query;
            state.tokens.search += 1;
            state.tokens.search
        };

        tokio::time::sleep(self.debounce).await;
        self.run_search(token)
    }

    fn search_now(&self) -> DispatchOutcome {
        let token = {
            let mut state = self.write();
            state.tokens.search += 1;
            state.tokens.search
        };
        self.run_search(token)
    }

    fn run_search(&self, token: u64) -> DispatchOutcome {
        let mut state = self.write();
        if state.tokens.search != token {
            debug!(token, current = state.tokens.search, "search superseded");
            return DispatchOutcome::Stale;
        }
        let Some(index) = state.index.clone() else {
            return DispatchOutcome::Ignored;
        };

        let outcome = search(&state.query, &index, &self.options);
        let status = match &outcome {
            SearchOutcome::Empty => messages::ready(index.len()),
            SearchOutcome::TooShort { min_chars } => messages::type_more(*min_chars),
            SearchOutcome::Matches { entries, .. } if entries.is_empty() => {
                messages::NONE_FOUND.to_string()
            }
            SearchOutcome::Matches { entries, truncated } => {
                messages::found(entries.len(), *truncated)
            }
        };

        debug!(query = %state.query, matches = outcome.entries().len(), truncated = outcome.truncated(), "search ran");
        state.results.searched = matches!(outcome, SearchOutcome::Matches { .. });
        state.results.truncated = outcome.truncated();
        state.results.entries = match outcome {
            SearchOutcome::Matches { entries, .. } => entries,
            SearchOutcome::Empty | SearchOutcome::TooShort { .. } => Vec::new(),
        };
        state.set_status(StatusLine::info(status));
        DispatchOutcome::Applied
    }

    fn clear(&self) -> DispatchOutcome {
        let mut state = self.write();
        state.query.clear();
        state.tokens.search += 1;
        state.tokens.detail += 1;
        state.tokens.history += 1;
        state.modal = None;
        state.clear_results();
        if let Some(count) = state.index.as_ref().map(|index| index.len()) {
            state.set_status(StatusLine::info(messages::ready(count)));
        }
        DispatchOutcome::Applied
    }

    async fn select(&self, codigo: Codigo) -> DispatchOutcome {
        let (token, index) = {
            let mut state = self.write();
            state.tokens.detail += 1;
            state.detail_visible = false;
            state.set_status(StatusLine::info(messages::entity_loading(codigo)));
            (state.tokens.detail, state.index.clone())
        };

        let loaded = self.details.load(codigo, index.as_deref()).await;

        let mut state = self.write();
        if state.tokens.detail != token {
            debug!(%codigo, "detail superseded");
            return DispatchOutcome::Stale;
        }
        match loaded {
            Ok(entity) => {
                state.detail = Some(entity);
                state.detail_visible = true;
                state.set_status(StatusLine::info(messages::entity_loaded(codigo)));
            }
            Err(err) => {
                warn!(%codigo, error = %err, "failed to load entity");
                state.set_status(StatusLine::error(messages::entity_failed(codigo)));
                state.tokens.history += 1;
                state.open_modal(
                    messages::ERROR_TITLE,
                    None,
                    ModalContent::Error(messages::data_error(&err)),
                );
            }
        }
        DispatchOutcome::Applied
    }

    fn close_detail(&self) -> DispatchOutcome {
        let mut state = self.write();
        state.tokens.detail += 1;
        state.detail_visible = false;
        DispatchOutcome::Applied
    }

    fn current_subtitle(state: &PortalState) -> Option<String> {
        state
            .detail
            .as_ref()
            .filter(|_| state.detail_visible)
            .map(|d| d.razao.clone().unwrap_or_else(|| PLACEHOLDER.to_string()))
    }

    fn show_list(&self, inspections: bool) -> DispatchOutcome {
        let mut state = self.write();
        let Some(entity) = state.detail.as_ref().filter(|_| state.detail_visible) else {
            return DispatchOutcome::Ignored;
        };
        let (title, content) = if inspections {
            (
                messages::INSPECTIONS_TITLE,
                ModalContent::Inspections(entity.inspecoes.clone()),
            )
        } else {
            (
                messages::ACTIVITIES_TITLE,
                ModalContent::Activities(entity.atividades.clone()),
            )
        };
        let subtitle = Self::current_subtitle(&state);
        state.tokens.history += 1;
        state.open_modal(title, subtitle, content);
        DispatchOutcome::Applied
    }

    async fn open_history(&self, ndoc: Ndoc) -> DispatchOutcome {
        let (token, subtitle) = {
            let mut state = self.write();
            state.tokens.history += 1;
            let subtitle = Self::current_subtitle(&state);
            state.open_modal(messages::history_title(ndoc), subtitle.clone(), ModalContent::Loading);
            (state.tokens.history, subtitle)
        };

        let loaded = self.history.load(ndoc).await;

        let mut state = self.write();
        if state.tokens.history != token {
            debug!(%ndoc, "history superseded");
            return DispatchOutcome::Stale;
        }
        match loaded {
            Ok(record) => {
                state.open_modal(messages::history_title(ndoc), subtitle, ModalContent::Memo(record.memo));
            }
            Err(err) if err.is_not_found() => {
                debug!(%ndoc, "history not published");
                state.open_modal(
                    messages::history_title(ndoc),
                    subtitle,
                    ModalContent::Notice(messages::history_unavailable(ndoc)),
                );
            }
            Err(err) => {
                warn!(%ndoc, error = %err, "failed to load history");
                state.open_modal(
                    messages::HISTORY_ERROR_TITLE,
                    subtitle,
                    ModalContent::Error(messages::data_error(&err)),
                );
            }
        }
        DispatchOutcome::Applied
    }

    fn close_modal(&self) -> DispatchOutcome {
        let mut state = self.write();
        if state.modal.is_none() {
            return DispatchOutcome::Ignored;
        }
        state.modal = None;
        state.tokens.history += 1;
        DispatchOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StatusLevel;
    use std::path::Path;
    use tempfile::TempDir;
    use visa_data::DirSource;

    fn write(root: &Path, relative: &str, body: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
        std::fs::write(path, body).expect("write file");
    }

    fn portal(root: &Path) -> Portal {
        Portal::new(Fetcher::new(Arc::new(DirSource::new(root)))).with_debounce(Duration::ZERO)
    }

    fn codigo(n: u32) -> Codigo {
        Codigo::new(n).expect("valid codigo")
    }

    fn seeded() -> TempDir {
        let tmp = TempDir::new().expect("create temp dir");
        write(
            tmp.path(),
            "data/index_regulados.json",
            r#"[[1234, "Farmacia Central", "Farma", "12345678900"], [7, "Padaria", null, null]]"#,
        );
        write(
            tmp.path(),
            "data/reg/01/01234.json",
            r#"{"codigo": 1234, "razao": "Farmacia Central", "inspecoes": [{"tipo": "Termo", "ndoc": 12345}]}"#,
        );
        tmp
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let tmp = seeded();
        let portal = portal(tmp.path());
        assert_eq!(portal.dispatch(UiEvent::Init).await, DispatchOutcome::Applied);
        assert_eq!(portal.dispatch(UiEvent::Init).await, DispatchOutcome::Ignored);

        let state = portal.snapshot();
        assert!(state.results.visible);
        assert_eq!(state.status.expect("status").text, "Índice carregado (2).");
        assert_eq!(portal.index().expect("index").len(), 2);
    }

    #[tokio::test]
    async fn test_index_failure_persists() {
        let tmp = TempDir::new().expect("create temp dir");
        let portal = portal(tmp.path());
        portal.dispatch(UiEvent::Init).await;
        assert_eq!(
            portal.dispatch(UiEvent::QueryChanged("farma".into())).await,
            DispatchOutcome::Ignored
        );

        let status = portal.snapshot().status.expect("status");
        assert!(status.persistent);
        assert_eq!(status.level, StatusLevel::Error);
        assert!(!portal.snapshot().results.visible);
        assert!(matches!(portal.index(), Err(PortalError::IndexNotLoaded)));
    }

    #[tokio::test]
    async fn test_search_statuses() {
        let tmp = seeded();
        let portal = portal(tmp.path());
        portal.dispatch(UiEvent::Init).await;

        portal.dispatch(UiEvent::QueryChanged("f".into())).await;
        assert_eq!(
            portal.snapshot().status.expect("status").text,
            "Digite ao menos 2 caracteres para buscar."
        );

        portal.dispatch(UiEvent::QueryChanged("farma".into())).await;
        let state = portal.snapshot();
        assert_eq!(state.results.entries.len(), 1);
        assert_eq!(state.status.expect("status").text, "1 encontrado(s).");

        portal.dispatch(UiEvent::QueryChanged("zzz".into())).await;
        assert_eq!(
            portal.snapshot().status.expect("status").text,
            "Nenhum regulado encontrado."
        );
    }

    #[tokio::test]
    async fn test_truncation_reported() {
        let tmp = seeded();
        let portal = portal(tmp.path()).with_search_options(SearchOptions {
            min_query_chars: 2,
            max_results: 1,
        });
        portal.dispatch(UiEvent::Init).await;
        portal.dispatch(UiEvent::QueryChanged("ar".into())).await;

        let state = portal.snapshot();
        assert!(state.results.truncated);
        assert_eq!(state.results.entries.len(), 1);
        assert!(state.status.expect("status").text.contains("primeiros 1"));
    }

    #[tokio::test]
    async fn test_select_and_close() {
        let tmp = seeded();
        let portal = portal(tmp.path());
        portal.dispatch(UiEvent::Init).await;

        assert_eq!(
            portal.dispatch(UiEvent::ResultSelected(codigo(1234))).await,
            DispatchOutcome::Applied
        );
        let state = portal.snapshot();
        assert!(state.detail_visible);
        assert_eq!(
            state.detail.expect("detail").documento.as_deref(),
            Some("12345678900")
        );
        assert_eq!(state.status.expect("status").text, "Regulado 1234 carregado.");

        portal.dispatch(UiEvent::ShowInspections).await;
        assert!(portal.snapshot().modal.is_some());
        portal.dispatch(UiEvent::KeyDown(Key::Escape)).await;
        assert!(portal.snapshot().modal.is_none());

        portal.dispatch(UiEvent::CloseDetail).await;
        assert!(!portal.snapshot().detail_visible);
        assert_eq!(
            portal.dispatch(UiEvent::ShowActivities).await,
            DispatchOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_detail_failure_opens_error_modal() {
        let tmp = seeded();
        let portal = portal(tmp.path());
        portal.dispatch(UiEvent::Init).await;
        portal.dispatch(UiEvent::ResultSelected(codigo(99))).await;

        let state = portal.snapshot();
        assert!(!state.detail_visible);
        let status = state.status.expect("status");
        assert_eq!(status.text, "Erro ao carregar regulado 99.");
        assert_eq!(status.level, StatusLevel::Error);
        let modal = state.modal.expect("error modal");
        assert_eq!(modal.title, "Erro");
        assert_eq!(
            modal.content,
            ModalContent::Error("Arquivo não encontrado: data/reg/00/00099.json.".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_history_is_soft() {
        let tmp = seeded();
        let portal = portal(tmp.path());
        portal.dispatch(UiEvent::Init).await;
        portal.dispatch(UiEvent::ResultSelected(codigo(1234))).await;
        portal.dispatch(UiEvent::HistoryRequested(Ndoc::from(12_345))).await;

        let modal = portal.snapshot().modal.expect("modal open");
        assert_eq!(modal.title, "Histórico NDOC 12345");
        assert_eq!(modal.subtitle.as_deref(), Some("Farmacia Central"));
        match modal.content {
            ModalContent::Notice(text) => assert!(text.contains("publicado posteriormente")),
            other => panic!("expected soft notice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_search_from_empty_hides_detail() {
        let tmp = seeded();
        let portal = portal(tmp.path());
        portal.dispatch(UiEvent::Init).await;
        portal.dispatch(UiEvent::ResultSelected(codigo(1234))).await;
        assert!(portal.snapshot().detail_visible);

        portal.dispatch(UiEvent::QueryChanged("pa".into())).await;
        assert!(!portal.snapshot().detail_visible);
    }

    #[tokio::test]
    async fn test_clear_resets_page() {
        let tmp = seeded();
        let portal = portal(tmp.path());
        portal.dispatch(UiEvent::Init).await;
        portal.dispatch(UiEvent::QueryChanged("farma".into())).await;
        portal.dispatch(UiEvent::ResultSelected(codigo(1234))).await;
        portal.dispatch(UiEvent::ShowActivities).await;

        portal.dispatch(UiEvent::ClearClicked).await;
        let state = portal.snapshot();
        assert!(state.query.is_empty());
        assert!(state.results.entries.is_empty());
        assert!(!state.detail_visible);
        assert!(state.modal.is_none());
        assert_eq!(state.status.expect("status").text, "Pronto. (2 no índice)");
    }
}
