use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log filter '{}' (set APP_LOG_LEVEL to a level or directive list)",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Target prefix shared by the library and the `org-recon` binary.
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Expands a bare level such as `debug` into directives that apply it to this
/// crate only, keeping HTTP and TLS internals at `warn`. Anything else is
/// treated as a full `EnvFilter` directive string and passed through.
pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim().to_ascii_lowercase();
    if LEVELS.contains(&level.as_str()) {
        format!("warn,{CRATE_TARGET}={level}")
    } else {
        log_level.trim().to_string()
    }
}

/// Installs the global subscriber. Events go to stderr; stdout is reserved for the report.
///
/// `RUST_LOG` wins over the configured level when it is set and parses.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = filter_directives(&config.log_level);
            EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
                value: directives,
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
