//! Logging bootstrap.
//!
//! The library only talks to the `log` facade. Binaries call
//! [`init_logging`] once to route records to stderr through `env_logger`,
//! keeping stdout free for interpreter output.

use env_logger::{Builder, Env, Target};

/// Environment variable overriding the configured level.
pub const LOG_ENV: &str = "RUST_LOG";

/// Returns the default log level for the current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `warn`
#[must_use]
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "warn"
    }
}

/// Normalizes a user-supplied level name.
///
/// # Errors
///
/// Returns a human-readable message for unsupported levels.
pub fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected off|trace|debug|info|warn|error"
        )),
    }
}

/// Initializes stderr logging.
///
/// `level` is used when `RUST_LOG` is unset; `None` falls back to
/// [`default_log_level`].
///
/// # Errors
///
/// Returns an error for an unsupported level or when a logger is already
/// installed.
pub fn init_logging(level: Option<&str>) -> Result<(), String> {
    let level = normalize_level(level.unwrap_or(default_log_level()))?;
    Builder::from_env(Env::new().filter_or(LOG_ENV, level))
        .target(Target::Stderr)
        .format_timestamp_micros()
        .try_init()
        .map_err(|e| format!("failed to start logger: {e}"))?;
    log::debug!(
        "event=logging_init level={level} version={}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}
