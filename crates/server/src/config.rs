//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string, or `memory://` for the in-memory store
//! - `TOKEN_SECRET` - Session token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 5000)
//! - `TOKEN_TTL_SECS` - Session token lifetime in seconds (default: 86400)
//! - `DELETE_POLICY` - `admin_or_owner` (default), `admin_only`, or `open`
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: any origin)
//! - `LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use taskie_core::DeletePolicy;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// URL scheme selecting the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Backing store connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing configuration
    pub token: TokenConfig,
    /// Who may delete tasks and locations
    pub delete_policy: DeletePolicy,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Session token configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret: SecretString,
    /// Lifetime of issued tokens
    pub ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("TOKEN_SECRET")?;
        validate_secret_length(&secret, "TOKEN_SECRET")?;

        let ttl_secs = get_env_or_default("TOKEN_TTL_SECS", &DEFAULT_TOKEN_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar("TOKEN_TTL_SECS".to_string(), e.to_string()))?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "TOKEN_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            secret,
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token secret fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let token = TokenConfig::from_env()?;
        let delete_policy = get_env_or_default("DELETE_POLICY", "admin_or_owner")
            .parse::<DeletePolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("DELETE_POLICY".to_string(), e))?;
        let cors_allowed_origins = get_optional_env("CORS_ALLOWED_ORIGINS").map(|s| parse_list(&s));
        let log_format = match get_env_or_default("LOG_FORMAT", "text").as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected text or json, got {other:?}"),
                ));
            }
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_sample_rate("SENTRY_SAMPLE_RATE")?;
        let sentry_traces_sample_rate = get_sample_rate("SENTRY_TRACES_SAMPLE_RATE")?;

        Ok(Self {
            database_url,
            host,
            port,
            token,
            delete_policy,
            cors_allowed_origins,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns `true` when `DATABASE_URL` selects the in-memory store.
    #[must_use]
    pub fn uses_memory_store(&self) -> bool {
        self.database_url
            .expose_secret()
            .starts_with(MEMORY_DATABASE_URL)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a sampling rate in `0.0..=1.0`, defaulting to `1.0` when unset.
fn get_sample_rate(key: &str) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(1.0);
    };
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0, got {rate}"),
        ));
    }
    Ok(rate)
}

/// Split a comma-separated list, dropping empty entries.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use super::*;

    fn config(database_url: &str) -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from(database_url),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            token: TokenConfig {
                secret: SecretString::from("kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%"),
                ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            },
            delete_policy: DeletePolicy::default(),
            cors_allowed_origins: None,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-token-secret-here", "TOKEN_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "TOKEN_SECRET");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TOKEN_SECRET").is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "TOKEN_SECRET").is_err());
        assert!(validate_secret_length(&SecretString::from("x".repeat(32)), "TOKEN_SECRET").is_ok());
    }

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list(" http://localhost:3000, ,https://app.taskie.io "),
            vec!["http://localhost:3000", "https://app.taskie.io"]
        );
    }

    #[test]
    fn test_socket_addr_and_store_selection() {
        let cfg = config("memory://");
        assert_eq!(cfg.socket_addr().port(), 5000);
        assert!(cfg.uses_memory_store());
        assert!(!config("postgres://localhost/taskie").uses_memory_store());
    }

    /// `from_env` reads process-wide state, so these tests run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "DATABASE_URL",
        "TOKEN_SECRET",
        "TOKEN_TTL_SECS",
        "HOST",
        "PORT",
        "DELETE_POLICY",
        "CORS_ALLOWED_ORIGINS",
        "LOG_FORMAT",
        "SENTRY_DSN",
        "SENTRY_ENVIRONMENT",
        "SENTRY_SAMPLE_RATE",
        "SENTRY_TRACES_SAMPLE_RATE",
    ];

    /// Run `from_env` against exactly the given variables.
    #[allow(unsafe_code)]
    fn from_vars(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        // SAFETY: ENV_LOCK serializes every test in this module that touches the environment.
        unsafe {
            for key in ENV_KEYS {
                std::env::remove_var(key);
            }
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
        ServerConfig::from_env()
    }

    const VALID: &[(&str, &str)] = &[
        ("DATABASE_URL", "memory://"),
        ("TOKEN_SECRET", "kQ9#vT2$wX7!pL4@zR8&nM3*bH6^cJ1%"),
    ];

    fn with(extra: (&'static str, &'static str)) -> Vec<(&'static str, &'static str)> {
        let mut vars = VALID.to_vec();
        vars.push(extra);
        vars
    }

    fn invalid_var(result: Result<ServerConfig, ConfigError>) -> String {
        match result {
            Err(ConfigError::InvalidEnvVar(key, _)) => key,
            other => panic!("expected InvalidEnvVar, got {other:?}"),
        }
    }

    #[test]
    fn test_from_env_defaults() {
        let cfg = from_vars(VALID).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.delete_policy, DeletePolicy::AdminOrOwner);
        assert_eq!(cfg.token.ttl, Duration::from_secs(DEFAULT_TOKEN_TTL_SECS));
        assert!((cfg.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(cfg.uses_memory_store());
    }

    #[test]
    fn test_from_env_reads_sample_rates() {
        let mut vars = with(("SENTRY_SAMPLE_RATE", "0.25"));
        vars.push(("SENTRY_TRACES_SAMPLE_RATE", "0"));
        let cfg = from_vars(&vars).unwrap();
        assert!((cfg.sentry_sample_rate - 0.25).abs() < f32::EPSILON);
        assert!(cfg.sentry_traces_sample_rate.abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_env_rejects_bad_sample_rates() {
        assert_eq!(
            invalid_var(from_vars(&with(("SENTRY_SAMPLE_RATE", "not-a-number")))),
            "SENTRY_SAMPLE_RATE"
        );
        assert_eq!(
            invalid_var(from_vars(&with(("SENTRY_TRACES_SAMPLE_RATE", "7.5")))),
            "SENTRY_TRACES_SAMPLE_RATE"
        );
        assert_eq!(
            invalid_var(from_vars(&with(("SENTRY_SAMPLE_RATE", "-0.1")))),
            "SENTRY_SAMPLE_RATE"
        );
    }

    #[test]
    fn test_from_env_rejects_bad_delete_policy() {
        assert_eq!(
            invalid_var(from_vars(&with(("DELETE_POLICY", "whoever")))),
            "DELETE_POLICY"
        );
    }

    #[test]
    fn test_from_env_rejects_zero_ttl() {
        assert_eq!(
            invalid_var(from_vars(&with(("TOKEN_TTL_SECS", "0")))),
            "TOKEN_TTL_SECS"
        );
    }

    #[test]
    fn test_from_env_requires_token_secret() {
        let result = from_vars(&[("DATABASE_URL", "memory://")]);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "TOKEN_SECRET"));
    }

    #[test]
    fn test_from_env_rejects_weak_token_secret() {
        let result = from_vars(&[("DATABASE_URL", "memory://"), ("TOKEN_SECRET", "short")]);
        assert!(matches!(result, Err(ConfigError::InsecureSecret(..))));
    }

    #[test]
    fn test_token_config_debug_redacts_secret() {
        let cfg = config("memory://");
        let debug_output = format!("{:?}", cfg.token);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("kQ9#"));
    }
}
