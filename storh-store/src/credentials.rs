//! Login credential lookup.
//!
//! Each field is taken from the first source that has it:
//!
//! 1. **Config** - `account.email` / `account.password`
//! 2. **Environment** - `STORH_EMAIL` / `STORH_PASSWORD`
//! 3. **Keychain** - password only, service `storh`, account = email

use std::fmt;

use keyring::Entry;
use tracing::{debug, instrument, warn};

use storh_core::Credentials;

use crate::config::AccountConfig;
use crate::error::StoreError;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable for the account email.
pub const EMAIL_ENV: &str = "STORH_EMAIL";

/// Environment variable for the account password.
pub const PASSWORD_ENV: &str = "STORH_PASSWORD";

/// Keychain service name; the account name is the email.
pub const KEYCHAIN_SERVICE: &str = "storh";

// ============================================================================
// Sources
// ============================================================================

/// Where a credential field was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The config file.
    Config,
    /// An environment variable.
    Environment,
    /// The system keychain.
    Keychain,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Config => "config",
            Self::Environment => "environment",
            Self::Keychain => "keychain",
        })
    }
}

/// Read access to stored passwords.
pub trait SecretStore {
    /// Returns the stored password for `email`, if any.
    fn password(&self, email: &str) -> Option<String>;
}

/// The OS keychain (macOS Keychain, Windows Credential Manager, Secret Service).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemKeychain;

impl SecretStore for SystemKeychain {
    #[instrument(skip(self))]
    fn password(&self, email: &str) -> Option<String> {
        let entry = match Entry::new(KEYCHAIN_SERVICE, email) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Keychain unavailable");
                return None;
            }
        };

        match entry.get_password() {
            Ok(password) if !password.is_empty() => Some(password),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "Keychain lookup failed");
                None
            }
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Credentials plus where each field came from.
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    /// Validated credentials.
    pub credentials: Credentials,
    /// Source of the email.
    pub email_source: CredentialSource,
    /// Source of the password.
    pub password_source: CredentialSource,
}

/// Resolves credentials from config, the process environment and the keychain.
pub fn resolve_credentials(account: &AccountConfig) -> Result<ResolvedCredentials, StoreError> {
    resolve_credentials_with(account, |name| std::env::var(name).ok(), &SystemKeychain)
}

/// Resolves credentials with explicit environment and keychain lookups.
pub fn resolve_credentials_with<E>(
    account: &AccountConfig,
    env: E,
    keychain: &dyn SecretStore,
) -> Result<ResolvedCredentials, StoreError>
where
    E: Fn(&str) -> Option<String>,
{
    let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let (email, email_source) = if let Some(email) = non_blank(account.email.clone()) {
        (email, CredentialSource::Config)
    } else if let Some(email) = non_blank(env(EMAIL_ENV)) {
        (email, CredentialSource::Environment)
    } else {
        return Err(StoreError::MissingCredentials(format!(
            "no email in config (account.email) or ${EMAIL_ENV}"
        )));
    };

    let (password, password_source) = if let Some(password) = non_blank(account.password.clone())
    {
        (password, CredentialSource::Config)
    } else if let Some(password) = non_blank(env(PASSWORD_ENV)) {
        (password, CredentialSource::Environment)
    } else if let Some(password) = non_blank(keychain.password(email.trim())) {
        (password, CredentialSource::Keychain)
    } else {
        return Err(StoreError::MissingCredentials(format!(
            "no password in config (account.password), ${PASSWORD_ENV}, \
             or keychain service \"{KEYCHAIN_SERVICE}\""
        )));
    };

    debug!(
        email_source = %email_source,
        password_source = %password_source,
        "Resolved credentials"
    );
    Ok(ResolvedCredentials {
        credentials: Credentials::new(email, password)?,
        email_source,
        password_source,
    })
}

// ============================================================================
// Tests
// ============================================================================
