//! API credential check
//!
//! Bulk endpoints authenticate with a single configured username and an
//! Argon2 password hash. Credentials come from the `x-api-username` /
//! `x-api-password` headers, or from top-level `username` / `password`
//! fields of the JSON body when the headers are absent.

use http::HeaderMap;
use serde_json::Value;
use shared::error::AppError;

use crate::util::verify_password;

pub const USERNAME_HEADER: &str = "x-api-username";
pub const PASSWORD_HEADER: &str = "x-api-password";

/// Configured API account
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
}

/// Credentials presented by a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedCredentials {
    pub username: String,
    pub password: String,
}

/// Read credentials from headers, falling back to the body.
///
/// Must run on the raw body, before sanitation rewrites the password.
pub fn extract(headers: &HeaderMap, body: &Value) -> Option<PresentedCredentials> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let (username, password) = match (header(USERNAME_HEADER), header(PASSWORD_HEADER)) {
        (Some(u), Some(p)) => (u, p),
        _ => (field("username")?, field("password")?),
    };
    Some(PresentedCredentials { username, password })
}

impl ApiCredentials {
    /// Check a request's credentials: missing → `NotAuthenticated`,
    /// wrong → `InvalidCredentials`
    pub fn authenticate(&self, headers: &HeaderMap, body: &Value) -> Result<(), AppError> {
        let presented = extract(headers, body).ok_or_else(AppError::not_authenticated)?;

        if presented.username != self.username
            || !verify_password(&presented.password, &self.password_hash)
        {
            tracing::warn!(username = %presented.username, "Rejected sync credentials");
            return Err(AppError::invalid_credentials());
        }
        Ok(())
    }
}
