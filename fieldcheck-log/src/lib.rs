//! fieldcheck logging
//!
//! Leveled logging for the validation engine, configured from the
//! environment and written to stderr.
//!
//! # Usage
//!
//! ```rust
//! use fieldcheck_log::{debug, info, warn};
//!
//! info!("Rule registry built with {} providers", 3);
//! let rule = "string_length_min";
//! debug!(target: "fieldcheck::dispatch", "Dispatching rule {}", rule);
//! warn!("Rule registry is empty");
//! ```
//!
//! # Environment Variables
//!
//! - `FIELDCHECK_DEBUG=1` - Enable debug logging
//! - `FIELDCHECK_LOG_LEVEL=trace|debug|info|warn|error|off` - Minimum level
//! - `FIELDCHECK_LOG_FORMAT=pretty|compact|json` - Output format
//! - `FIELDCHECK_LOG_TIMESTAMPS=1|0` - Include timestamps

use once_cell::sync::Lazy;
use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Nothing is written
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human readable, one field per column
    Pretty,
    /// Short single-letter level prefix
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

/// Unset until the environment has been read.
const LEVEL_UNSET: u8 = u8::MAX;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LEVEL_UNSET);

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level written
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Prefix lines with a timestamp
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Warn,
            format: Format::Json,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Build the configuration from `FIELDCHECK_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let debug = env::var("FIELDCHECK_DEBUG")
            .map(|v| flag(&v))
            .unwrap_or(false);

        let level = env::var("FIELDCHECK_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { defaults.level });

        let format = env::var("FIELDCHECK_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(defaults.format);

        let timestamps = env::var("FIELDCHECK_LOG_TIMESTAMPS")
            .map(|v| flag(&v))
            .unwrap_or(defaults.timestamps);

        Self {
            level,
            format,
            timestamps,
        }
    }
}

fn flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

// ============================================================================
// Public API
// ============================================================================

/// Read the environment eagerly instead of on the first log call.
pub fn init() {
    let _ = current_level();
}

/// The global configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Current minimum level. A level set with [`set_level`] wins over the
/// environment.
pub fn current_level() -> Level {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        LEVEL_UNSET => {
            let level = config().level;
            let _ = LOG_LEVEL.compare_exchange(
                LEVEL_UNSET,
                level as u8,
                Ordering::SeqCst,
                Ordering::Relaxed,
            );
            Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
        }
        raw => Level::from_u8(raw),
    }
}

/// Override the minimum level at runtime.
pub fn set_level(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level >= current_level()
}

// ============================================================================
// Log Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    if !is_level_enabled(level) {
        return;
    }

    let config = config();
    let line = match config.format {
        Format::Pretty => format_pretty(level, target, message, config.timestamps),
        Format::Compact => format_compact(level, target, message, config.timestamps),
        Format::Json => format_json(level, target, message),
    };

    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}

fn format_pretty(level: Level, target: &str, message: &str, timestamps: bool) -> String {
    let mut line = String::new();
    if timestamps {
        line.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
    }
    line.push_str(&format!("{:5} ", level.as_str()));
    if !target.is_empty() {
        line.push_str(&format!("[{}] ", target));
    }
    line.push_str(message);
    line
}

fn format_compact(level: Level, target: &str, message: &str, timestamps: bool) -> String {
    let mut line = String::new();
    if timestamps {
        line.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
    }
    line.push(level.as_str().chars().next().unwrap_or('?'));
    line.push(' ');
    if !target.is_empty() {
        line.push_str(target);
        line.push_str(": ");
    }
    line.push_str(message);
    line
}

#[cfg(feature = "json")]
fn format_json(level: Level, target: &str, message: &str) -> String {
    use serde::Serialize;

    #[derive(Serialize)]
    struct LogEntry<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let entry = LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&entry).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn format_json(level: Level, target: &str, message: &str) -> String {
    format!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}"}}"#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    )
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug message.
///
/// Enabled by `FIELDCHECK_DEBUG=1` or `FIELDCHECK_LOG_LEVEL=debug`.
///
/// ```rust
/// use fieldcheck_log::debug;
///
/// let field = "age";
/// debug!("Validating field {}", field);
/// debug!(target: "fieldcheck::registry", "Registered {} operations", 4);
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Debug, $($arg)+) };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Info, $($arg)+) };
}

/// Log a warning.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Warn, $($arg)+) };
}

/// Log an error.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse(" DEBUG "), Some(Level::Debug));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("none"), Some(Level::Off));
        assert_eq!(Level::parse("loud"), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("pretty"), Some(Format::Pretty));
        assert_eq!(Format::parse("Compact"), Some(Format::Compact));
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("xml"), None);
    }

    #[test]
    fn test_set_level() {
        let original = current_level();

        set_level(Level::Error);
        assert_eq!(current_level(), Level::Error);
        assert!(!is_level_enabled(Level::Warn));
        assert!(is_level_enabled(Level::Error));

        set_level(Level::Off);
        assert!(!is_level_enabled(Level::Error));
        assert!(!is_level_enabled(Level::Off));

        set_level(original);
    }

    #[test]
    fn test_compact_line() {
        let line = format_compact(Level::Warn, "fieldcheck", "empty registry", false);
        assert_eq!(line, "W fieldcheck: empty registry");
    }

    #[test]
    fn test_pretty_line_without_target() {
        let line = format_pretty(Level::Info, "", "ready", false);
        assert_eq!(line, "INFO  ready");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_line_is_parseable() {
        let line = format_json(Level::Debug, "fieldcheck::dispatch", "rule \"x\" failed");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "DEBUG");
        assert_eq!(value["message"], "rule \"x\" failed");
    }

    #[test]
    fn test_macros_compile() {
        trace!("trace message");
        debug!("debug message");
        info!("info message");
        warn!("warn message");
        error!("error message");

        debug!(target: "test", "with target");
        let x = 42;
        info!("formatted: {}", x);
    }
}
