//! Account credentials.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Login credentials for the StorH service.
///
/// Supplied once at startup and never mutated afterwards. The password is
/// kept out of `Debug` output so credentials can travel through `tracing`
/// fields safely.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates credentials, rejecting blank values.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, CoreError> {
        let email = email.into().trim().to_string();
        let password = password.into();

        if email.is_empty() {
            return Err(CoreError::InvalidConfig("email must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(CoreError::InvalidConfig(
                "password must not be empty".to_string(),
            ));
        }

        Ok(Self { email, password })
    }

    /// Account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Account password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_rejected() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("   ", "secret").is_err());
        assert!(Credentials::new("user@example.com", "").is_err());
    }

    #[test]
    fn test_email_is_trimmed() {
        let creds = Credentials::new("  user@example.com ", "secret").unwrap();
        assert_eq!(creds.email(), "user@example.com");
        assert_eq!(creds.password(), "secret");
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::new("user@example.com", "hunter2").unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_serializes_login_body() {
        let creds = Credentials::new("user@example.com", "hunter2").unwrap();
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "user@example.com", "password": "hunter2"})
        );
    }
}
