//! Session management: login and single-flight re-authentication.
//!
//! [`SessionManager`] is the only owner of the bearer token. Transport reads
//! it through a [`SessionTicket`] and hands the ticket back when the token is
//! rejected, so the manager can tell whether someone else already replaced
//! that token.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use url::Url;

use storh_core::Credentials;

use crate::endpoints::Endpoints;
use crate::error::FetchError;
use crate::host::HttpApi;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginEnvelope {
    result: LoginResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResult {
    access_token: String,
}

// ============================================================================
// Session State
// ============================================================================

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    /// Number of completed login attempts.
    epoch: u64,
    /// Outcome of the most recent login attempt.
    last_outcome: bool,
}

/// A read of the session taken before an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    /// Token at the time of the read.
    pub token: Option<String>,
    /// Login epoch at the time of the read.
    pub epoch: u64,
}

// ============================================================================
// Session Manager
// ============================================================================

/// Owns the bearer token and the credentials used to obtain it.
pub struct SessionManager {
    http: Arc<dyn HttpApi>,
    login_url: Url,
    credentials: Credentials,
    state: RwLock<SessionState>,
    /// Held for the duration of every login request.
    login_gate: Mutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("login_url", &self.login_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates an unauthenticated session.
    pub fn new(
        http: Arc<dyn HttpApi>,
        endpoints: &Endpoints,
        credentials: Credentials,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            http,
            login_url: endpoints.login()?,
            credentials,
            state: RwLock::new(SessionState::default()),
            login_gate: Mutex::new(()),
        })
    }

    /// Account email, for logging.
    pub fn email(&self) -> &str {
        self.credentials.email()
    }

    /// Returns the current token and login epoch.
    pub async fn ticket(&self) -> SessionTicket {
        let state = self.state.read().await;
        SessionTicket {
            token: state.token.clone(),
            epoch: state.epoch,
        }
    }

    /// Returns true once a login has succeeded.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// Logs in with the session's credentials.
    ///
    /// Returns `Ok(true)` and stores the token on HTTP 200, `Ok(false)` on
    /// any other status. A rejected login never touches the stored token.
    pub async fn login(&self) -> Result<bool, FetchError> {
        let _gate = self.login_gate.lock().await;
        self.login_locked().await
    }

    /// Replaces a token that the service rejected.
    ///
    /// Only one login runs at a time. A caller whose `stale` ticket predates
    /// the latest completed login does not log in again; it gets that
    /// login's outcome instead, so callers racing into 401 recovery share a
    /// single login request.
    pub async fn reauthenticate(&self, stale: &SessionTicket) -> bool {
        let _gate = self.login_gate.lock().await;

        {
            let state = self.state.read().await;
            if state.epoch != stale.epoch {
                debug!(
                    epoch = state.epoch,
                    success = state.last_outcome,
                    "Re-authentication already completed by a concurrent caller"
                );
                return state.last_outcome;
            }
        }

        info!(email = %self.email(), "Re-authenticating after token rejection");
        match self.login_locked().await {
            Ok(success) => success,
            Err(e) => {
                warn!(error = %e, "Re-authentication request failed");
                false
            }
        }
    }

    /// Performs the login request. Caller must hold `login_gate`.
    #[instrument(skip(self), fields(email = %self.credentials.email()))]
    async fn login_locked(&self) -> Result<bool, FetchError> {
        let body = serde_json::to_value(&self.credentials)?;
        let outcome = match self.http.post_json(&self.login_url, &body).await {
            Ok(response) if response.is_ok() => Self::parse_token(&response.body).map(Some),
            Ok(response) => {
                warn!(status = response.status, "Login rejected");
                Ok(None)
            }
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        state.epoch += 1;
        match outcome {
            Ok(Some(token)) => {
                state.token = Some(token);
                state.last_outcome = true;
                info!(epoch = state.epoch, "Logged in");
                Ok(true)
            }
            Ok(None) => {
                state.last_outcome = false;
                Ok(false)
            }
            Err(e) => {
                state.last_outcome = false;
                Err(e)
            }
        }
    }

    fn parse_token(body: &str) -> Result<String, FetchError> {
        let envelope: LoginEnvelope = serde_json::from_str(body)?;
        let token = envelope.result.access_token;
        if token.trim().is_empty() {
            return Err(FetchError::MalformedResponse(
                "login response carried an empty access token".to_string(),
            ));
        }
        Ok(token)
    }
}

// ============================================================================
// Tests
// ============================================================================
