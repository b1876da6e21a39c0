use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_MASTER_SOURCE: &str =
    "https://services-sandbox.sheerid.com/rest/0.5/organization?type=UNIVERSITY";
pub const DEFAULT_CANDIDATE_SOURCE: &str =
    "http://www.studentclearinghouse.org/colleges/enrollmentverify/Participation-List.csv";

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for a reconciliation run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub sources: SourceConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let master = env::var("RECON_MASTER_SOURCE")
            .unwrap_or_else(|_| DEFAULT_MASTER_SOURCE.to_string());
        let candidates = env::var("RECON_CANDIDATE_SOURCE")
            .unwrap_or_else(|_| DEFAULT_CANDIDATE_SOURCE.to_string());
        let delimiter =
            parse_delimiter(&env::var("RECON_CANDIDATE_DELIMITER").unwrap_or_else(|_| ",".into()))?;
        let http_timeout_secs = env::var("RECON_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            sources: SourceConfig {
                master,
                candidates,
                delimiter,
                http_timeout_secs,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where the two name lists come from and how the candidate feed is split.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub master: String,
    pub candidates: String,
    pub delimiter: u8,
    pub http_timeout_secs: u64,
}

impl SourceConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Accepts exactly one ASCII character, with `\t` and `tab` as aliases for a tab.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    if raw == "\\t" || raw.eq_ignore_ascii_case("tab") {
        return Ok(b'\t');
    }

    match raw.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(ConfigError::InvalidDelimiter {
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidDelimiter { value: String },
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDelimiter { value } => write!(
                f,
                "candidate delimiter '{}' must be a single ASCII character",
                value
            ),
            ConfigError::InvalidTimeout => {
                write!(f, "RECON_HTTP_TIMEOUT_SECS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("RECON_MASTER_SOURCE");
        env::remove_var("RECON_CANDIDATE_SOURCE");
        env::remove_var("RECON_CANDIDATE_DELIMITER");
        env::remove_var("RECON_HTTP_TIMEOUT_SECS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.sources.master, DEFAULT_MASTER_SOURCE);
        assert_eq!(config.sources.candidates, DEFAULT_CANDIDATE_SOURCE);
        assert_eq!(config.sources.delimiter, b',');
        assert_eq!(config.sources.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn load_reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("RECON_MASTER_SOURCE", "./master.json");
        env::set_var("RECON_CANDIDATE_DELIMITER", ";");
        env::set_var("RECON_HTTP_TIMEOUT_SECS", "5");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.sources.master, "./master.json");
        assert_eq!(config.sources.delimiter, b';');
        assert_eq!(config.sources.http_timeout_secs, 5);
        reset_env();
    }

    #[test]
    fn load_rejects_zero_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("RECON_HTTP_TIMEOUT_SECS", "0");
        let error = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(error, ConfigError::InvalidTimeout));
        reset_env();
    }

    #[test]
    fn delimiter_accepts_single_ascii_and_tab_aliases() {
        assert_eq!(parse_delimiter("|").expect("pipe"), b'|');
        assert_eq!(parse_delimiter("\\t").expect("escaped tab"), b'\t');
        assert_eq!(parse_delimiter("TAB").expect("named tab"), b'\t');
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("\u{00a7}").is_err());
    }
}
