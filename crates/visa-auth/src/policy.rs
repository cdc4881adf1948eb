//! Static access policy.

use crate::error::{AuthError, Result};
use chrono::Duration;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use visa_core::GuardConfig;

/// Lower-case and trim an e-mail address for comparison.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("valid regex"))
        .is_match(email)
}

/// Who may open protected pages, and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    authorized: BTreeSet<String>,
    session_max: Duration,
    idle_max: Duration,
    login_url: String,
}

impl AccessPolicy {
    /// Default absolute session lifetime (8 hours).
    pub const DEFAULT_SESSION_MAX_MINUTES: i64 = 8 * 60;
    /// Default idle timeout (20 minutes).
    pub const DEFAULT_IDLE_MAX_MINUTES: i64 = 20;
    /// Default login page.
    pub const DEFAULT_LOGIN_URL: &'static str = "index.html";

    /// Build a policy with default lifetimes.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidEmail` if an entry is not an e-mail address.
    pub fn new<I, S>(emails: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut authorized = BTreeSet::new();
        for email in emails {
            let normalized = normalize_email(email.as_ref());
            if !is_email(&normalized) {
                return Err(AuthError::InvalidEmail(email.as_ref().to_string()));
            }
            authorized.insert(normalized);
        }

        Ok(Self {
            authorized,
            session_max: Duration::minutes(Self::DEFAULT_SESSION_MAX_MINUTES),
            idle_max: Duration::minutes(Self::DEFAULT_IDLE_MAX_MINUTES),
            login_url: Self::DEFAULT_LOGIN_URL.to_string(),
        })
    }

    /// Build a policy from the `[guard]` configuration section.
    ///
    /// # Errors
    /// Returns error for malformed e-mails or an idle timeout longer than
    /// the session lifetime.
    pub fn from_config(config: &GuardConfig) -> Result<Self> {
        let minutes = |m: u64| {
            i64::try_from(m)
                .map(Duration::minutes)
                .map_err(|_| AuthError::InvalidSettings(format!("{m} minutes is out of range")))
        };
        Self::new(&config.authorized_emails)?
            .with_lifetimes(minutes(config.session_max_minutes)?, minutes(config.idle_max_minutes)?)
            .map(|policy| policy.with_login_url(config.login_url.clone()))
    }

    /// Override session lifetime and idle timeout.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidSettings` unless `0 < idle_max <= session_max`.
    pub fn with_lifetimes(mut self, session_max: Duration, idle_max: Duration) -> Result<Self> {
        if idle_max <= Duration::zero() || idle_max > session_max {
            return Err(AuthError::InvalidSettings(format!(
                "idle timeout ({} min) must be positive and at most the session lifetime ({} min)",
                idle_max.num_minutes(),
                session_max.num_minutes()
            )));
        }
        self.session_max = session_max;
        self.idle_max = idle_max;
        Ok(self)
    }

    /// Override the page unauthorized users are sent to.
    #[must_use]
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }

    /// Whether `email` is on the allow-list (case and padding ignored).
    #[must_use]
    pub fn allows(&self, email: &str) -> bool {
        self.authorized.contains(&normalize_email(email))
    }

    /// Absolute session lifetime.
    #[must_use]
    pub fn session_max(&self) -> Duration {
        self.session_max
    }

    /// Idle timeout.
    #[must_use]
    pub fn idle_max(&self) -> Duration {
        self.idle_max
    }

    /// Login page.
    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Number of allow-listed addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.authorized.len()
    }

    /// Whether nobody is allowed in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authorized.is_empty()
    }
}
