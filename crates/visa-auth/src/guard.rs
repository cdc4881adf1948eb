//! Guarding protected pages.
//!
//! The identity provider is external; the guard only decides, from the
//! signed-in address and the session marks, whether a page may be shown.

use crate::policy::{normalize_email, AccessPolicy};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider user id
    pub uid: String,
    /// E-mail, if the provider exposes one
    pub email: Option<String>,
}

/// The external authentication service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The currently signed-in user, if any.
    async fn current_user(&self) -> Option<Identity>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<()>;
}

/// Session marks kept while a page is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Local session id
    pub id: Uuid,
    /// Normalized e-mail of the user
    pub email: String,
    /// Set once, when the session starts
    pub started_at: DateTime<Utc>,
    /// Refreshed on every user interaction
    pub last_active: DateTime<Utc>,
}

impl Session {
    fn start(email: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            started_at: now,
            last_active: now,
        }
    }

    /// Whether the session outlived `policy` at `now`.
    #[must_use]
    pub fn is_expired(&self, policy: &AccessPolicy, now: DateTime<Utc>) -> bool {
        now - self.started_at > policy.session_max() || now - self.last_active > policy.idle_max()
    }
}

/// Why the user is being sent away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// Nobody is signed in
    Unauthenticated,
    /// The signed-in address is not allow-listed
    Unauthorized,
    /// Session lifetime or idle timeout exceeded
    SessionExpired,
}

impl RedirectReason {
    /// Message shown to the user before redirecting, if any.
    #[must_use]
    pub fn message(self) -> Option<&'static str> {
        match self {
            RedirectReason::Unauthenticated => None,
            RedirectReason::Unauthorized => {
                Some("Acesso não autorizado. Solicite liberação ao administrador.")
            }
            RedirectReason::SessionExpired => {
                Some("Sessão expirada por tempo/inatividade. Faça login novamente.")
            }
        }
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// The page may be shown
    Authorized {
        /// Current session
        session: Session,
    },
    /// The page must redirect
    Redirect {
        /// Target page
        to: String,
        /// Reason
        reason: RedirectReason,
    },
}

impl GuardDecision {
    /// Whether the page may be shown.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, GuardDecision::Authorized { .. })
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Applies an [`AccessPolicy`] to the user of an [`IdentityProvider`].
pub struct PageGuard {
    policy: AccessPolicy,
    provider: Arc<dyn IdentityProvider>,
    session: Mutex<Option<Session>>,
    clock: Clock,
}

impl PageGuard {
    /// Create a guard using the system clock.
    pub fn new(policy: AccessPolicy, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            policy,
            provider,
            session: Mutex::new(None),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used by [`PageGuard::watch`] and [`PageGuard::touch_now`].
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn marks(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().expect("acquire session lock")
    }

    /// The policy in force.
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Current session, if one was started.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.marks().clone()
    }

    fn redirect(&self, reason: RedirectReason) -> GuardDecision {
        GuardDecision::Redirect {
            to: self.policy.login_url().to_string(),
            reason,
        }
    }

    async fn sign_out(&self) {
        self.marks().take();
        if let Err(err) = self.provider.sign_out().await {
            warn!(error = %err, "identity provider sign-out failed");
        }
    }

    /// Decide whether the page may be shown at `now`.
    ///
    /// Starts the session on first success and refreshes its activity mark
    /// on later ones. Unauthorized users and expired sessions are signed
    /// out before the redirect is returned.
    pub async fn check(&self, now: DateTime<Utc>) -> GuardDecision {
        let Some(user) = self.provider.current_user().await else {
            debug!("no signed-in user");
            self.marks().take();
            return self.redirect(RedirectReason::Unauthenticated);
        };

        let email = normalize_email(user.email.as_deref().unwrap_or_default());
        if !self.policy.allows(&email) {
            info!(uid = %user.uid, "signed-in user is not allow-listed");
            self.sign_out().await;
            return self.redirect(RedirectReason::Unauthorized);
        }

        let expired = {
            let mut marks = self.marks();
            match marks.as_mut() {
                Some(session) if session.email == email => {
                    if session.is_expired(&self.policy, now) {
                        true
                    } else {
                        session.last_active = now;
                        false
                    }
                }
                _ => {
                    *marks = Some(Session::start(email, now));
                    false
                }
            }
        };

        if expired {
            info!(uid = %user.uid, "session expired");
            self.sign_out().await;
            return self.redirect(RedirectReason::SessionExpired);
        }

        match self.session() {
            Some(session) => GuardDecision::Authorized { session },
            None => self.redirect(RedirectReason::Unauthenticated),
        }
    }

    /// Record user activity at `now`.
    pub fn touch(&self, now: DateTime<Utc>) {
        if let Some(session) = self.marks().as_mut() {
            session.last_active = now;
        }
    }

    /// Record user activity at the guard clock's current time.
    pub fn touch_now(&self) {
        self.touch((self.clock)());
    }

    /// Whether the current session is expired at `now`. No session is not expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.marks()
            .as_ref()
            .is_some_and(|session| session.is_expired(&self.policy, now))
    }

    /// Poll every `interval` until the session expires, then sign out and
    /// return the redirect.
    pub async fn watch(&self, interval: Duration) -> GuardDecision {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if self.is_expired((self.clock)()) {
                info!("session expired while page was open");
                self.sign_out().await;
                return self.redirect(RedirectReason::SessionExpired);
            }
        }
    }
}
