//! Process configuration, read from the environment (and an optional `.env`).

use std::{fmt, net::SocketAddr, path::PathBuf};

use chrono::Duration;
use thiserror::Error;
use url::Url;

/// Minimum length of the token signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

const DEFAULT_DATABASE_URL: &str = "sqlite://school_activities.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load .env: {0}")]
    DotEnv(#[source] dotenvy::Error),

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("SECRET_KEY must be at least {MIN_SECRET_LENGTH} bytes, got {0}")]
    SecretTooShort(usize),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Account created at startup when it does not exist yet.
///
/// It is the only way to obtain the first ADMIN, who can then grant elevated roles.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub secret_key: String,
    pub access_token_ttl: Duration,
    pub static_dir: PathBuf,
    pub seed_data: bool,
    pub log_format: LogFormat,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &redact_database_url(&self.database_url))
            .field("bind_addr", &self.bind_addr)
            .field("secret_key", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("static_dir", &self.static_dir)
            .field("seed_data", &self.seed_data)
            .field("log_format", &self.log_format)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        accept_missing_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    ///
    /// There is no fallback signing secret: `SECRET_KEY` must be provided.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let secret_key = lookup("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;
        if secret_key.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort(secret_key.len()));
        }

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_addr.clone(),
            reason: "expected host:port",
        })?;

        let access_token_ttl = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            None => Duration::minutes(DEFAULT_ACCESS_TOKEN_MINUTES),
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => Duration::minutes(minutes),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                        value: raw,
                        reason: "expected a positive number of minutes",
                    });
                }
            },
        };

        let seed_data = match lookup("SEED_DATA") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                key: "SEED_DATA",
                value: raw.clone(),
                reason: "expected true/false",
            })?,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected text or json",
                });
            }
        };

        let bootstrap_admin = match (
            lookup("ADMIN_USERNAME"),
            lookup("ADMIN_EMAIL"),
            lookup("ADMIN_PASSWORD"),
        ) {
            (None, None, None) => None,
            (Some(username), Some(email), Some(password)) => Some(BootstrapAdmin {
                username,
                email,
                password,
            }),
            (username, email, _) => {
                let missing = if username.is_none() {
                    "ADMIN_USERNAME"
                } else if email.is_none() {
                    "ADMIN_EMAIL"
                } else {
                    "ADMIN_PASSWORD"
                };
                return Err(ConfigError::Missing(missing));
            }
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            secret_key,
            access_token_ttl,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            seed_data,
            log_format,
            bootstrap_admin,
        })
    }
}

/// A missing `.env` is fine; the real environment still applies. A malformed one is not.
fn accept_missing_dotenv<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

/// The connection URL with any password replaced, for logging.
fn redact_database_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return "[UNPARSEABLE]".to_string();
    };
    if url.password().is_some() && url.set_password(Some("***")).is_err() {
        return "[REDACTED]".to_string();
    }
    url.to_string()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = load(&[("SECRET_KEY", SECRET)]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.access_token_ttl, Duration::minutes(30));
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(config.seed_data);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn there_is_no_default_secret() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("SECRET_KEY"))));
        assert!(matches!(
            load(&[("SECRET_KEY", "short")]),
            Err(ConfigError::SecretTooShort(5))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("SECRET_KEY", SECRET),
            ("DATABASE_URL", "postgres://localhost/school"),
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("SEED_DATA", "false"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/school");
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.access_token_ttl, Duration::minutes(5));
        assert!(!config.seed_data);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_values_are_reported_by_key() {
        for (key, value) in [
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "0"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "soon"),
            ("BIND_ADDR", "localhost"),
            ("SEED_DATA", "maybe"),
            ("LOG_FORMAT", "xml"),
        ] {
            let err = load(&[("SECRET_KEY", SECRET), (key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { key: k, .. } if *k == key),
                "{key}={value} gave {err}"
            );
        }
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = load(&[("SECRET_KEY", SECRET)]).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }

    #[test]
    fn debug_output_hides_the_database_password() {
        let config = load(&[
            ("SECRET_KEY", SECRET),
            ("DATABASE_URL", "postgres://app:hunter2@db/school"),
        ])
        .unwrap();

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"), "{rendered}");
        assert!(rendered.contains("postgres://app:***@db/school"), "{rendered}");
        assert_eq!(config.database_url, "postgres://app:hunter2@db/school");
    }

    #[test]
    fn database_urls_without_a_password_are_shown_as_is() {
        assert_eq!(
            redact_database_url("sqlite://school_activities.db?mode=rwc"),
            "sqlite://school_activities.db?mode=rwc"
        );
        assert_eq!(redact_database_url("not a url"), "[UNPARSEABLE]");
    }

    #[test]
    fn only_a_missing_dotenv_is_ignored() {
        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(accept_missing_dotenv::<()>(Err(missing)).is_ok());

        let malformed = dotenvy::Error::LineParse("KEY='unterminated".to_string(), 4);
        assert!(matches!(
            accept_missing_dotenv::<()>(Err(malformed)),
            Err(ConfigError::DotEnv(_))
        ));
    }

    #[test]
    fn bootstrap_admin_needs_all_three_values() {
        let config = load(&[
            ("SECRET_KEY", SECRET),
            ("ADMIN_USERNAME", "principal"),
            ("ADMIN_EMAIL", "principal@mergington.edu"),
            ("ADMIN_PASSWORD", "correct horse battery"),
        ])
        .unwrap();
        let admin = config.bootstrap_admin.as_ref().unwrap();
        assert_eq!(admin.username, "principal");
        assert!(!format!("{config:?}").contains("correct horse battery"));

        let partial = load(&[("SECRET_KEY", SECRET), ("ADMIN_USERNAME", "principal")]);
        assert!(matches!(partial, Err(ConfigError::Missing("ADMIN_EMAIL"))));

        assert!(load(&[("SECRET_KEY", SECRET)]).unwrap().bootstrap_admin.is_none());
    }
}
