//! Sync server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Sync server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Pool size
    pub db_max_connections: u32,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Username accepted by the credential check
    pub api_username: String,
    /// Argon2 PHC hash of the API password
    pub api_password_hash: String,
    /// Chunk size used when a request does not pass `batchSize`
    pub batch_size: usize,
    /// Request body limit in bytes
    pub max_body_bytes: usize,
    /// Physical delete policy per record family
    pub delete_flags: DeleteFlags,
    /// Failure notification recipient; `None` logs notifications instead of mailing them
    pub notify_email_to: Option<String>,
    /// Failure notification sender address
    pub notify_email_from: String,
}

/// Whether `is_active = 0` deletes the row instead of updating it.
///
/// Catalogs and products have no flag: they are never deleted by the sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteFlags {
    pub prices: bool,
    pub stock: bool,
    pub uom: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str, dev_default: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                dev_default.to_string()
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let api_password_hash = match std::env::var("SYNC_API_PASSWORD_HASH") {
            Ok(hash) if !hash.is_empty() => hash,
            _ if environment == "development" => {
                tracing::warn!("SYNC_API_PASSWORD_HASH not set, using development password 'dev'");
                crate::util::hash_password("dev").map_err(|e| e.to_string())?
            }
            _ => {
                return Err(
                    format!("SYNC_API_PASSWORD_HASH must be set in {environment} environment").into(),
                );
            }
        };

        let batch_size = parse_env("SYNC_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err("SYNC_BATCH_SIZE must be a positive integer".into());
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            http_port: parse_env("HTTP_PORT", 8080)?,
            api_username: Self::require_secret("SYNC_API_USERNAME", &environment, "dev")?,
            api_password_hash,
            batch_size,
            max_body_bytes: parse_env("SYNC_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            delete_flags: DeleteFlags {
                prices: env_flag("SYNC_DELETE_INACTIVE_PRICES"),
                stock: env_flag("SYNC_DELETE_INACTIVE_STOCK"),
                uom: env_flag("SYNC_DELETE_INACTIVE_UOM"),
            },
            notify_email_to: std::env::var("NOTIFY_EMAIL_TO")
                .ok()
                .filter(|s| !s.is_empty()),
            notify_email_from: std::env::var("NOTIFY_EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@catalog-sync.local".into()),
            environment,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, BoxError> {
    parse_setting(name, std::env::var(name).ok().as_deref(), default)
}

/// Unset or blank falls back to `default`; anything else must parse
fn parse_setting<T: std::str::FromStr>(
    name: &str,
    value: Option<&str>,
    default: T,
) -> Result<T, BoxError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {v:?}").into()),
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .is_some_and(|v| parse_bool(&v).unwrap_or(false))
}

/// Parse `1/0/true/false/yes/no` (case-insensitive)
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_setting() {
        assert_eq!(parse_setting::<u16>("HTTP_PORT", None, 8080).unwrap(), 8080);
        assert_eq!(parse_setting::<u16>("HTTP_PORT", Some(" "), 8080).unwrap(), 8080);
        assert_eq!(parse_setting::<usize>("SYNC_BATCH_SIZE", Some(" 250 "), 100).unwrap(), 250);

        let err = parse_setting::<usize>("SYNC_BATCH_SIZE", Some("lots"), 100).unwrap_err();
        assert_eq!(err.to_string(), "SYNC_BATCH_SIZE has an invalid value: \"lots\"");
        assert!(parse_setting::<u16>("HTTP_PORT", Some("70000"), 8080).is_err());
        assert!(parse_setting::<u32>("DB_MAX_CONNECTIONS", Some("-1"), 10).is_err());
    }

    #[test]
    fn test_delete_flags_default_off() {
        let flags = DeleteFlags::default();
        assert!(!flags.prices && !flags.stock && !flags.uom);
    }
}
