//! Logging and tracing configuration
//!
//! Logs always go to stderr so that stdout stays free for CDR output. File
//! logging adds a daily rolling JSON file next to the console layer.

use std::io;
use thiserror::Error;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Logging setup failures
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Directive as given
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Keeps background log writers alive; dropping it flushes pending lines
#[derive(Debug, Default)]
pub struct LoggingGuard {
    guards: Vec<WorkerGuard>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the crate
    pub level: Level,
    /// Whether console output is JSON
    pub json_format: bool,
    /// Rolling log file directory, if file logging is on
    pub log_directory: Option<String>,
    /// Log file prefix
    pub log_file_prefix: String,
    /// Whether span open/close events are logged
    pub enable_span_events: bool,
    /// Whether console output uses ANSI colors
    pub enable_ansi: bool,
    /// Filter directive overriding `level`
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            log_directory: None,
            log_file_prefix: "cdr-synth".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the configuration selected by command line flags
    ///
    /// `--debug` wins over `--verbose`; without either only warnings are shown.
    pub fn from_flags(verbose: bool, debug: bool, json: bool, log_dir: Option<&str>) -> Self {
        let mut config = if debug {
            Self::new().with_level(Level::DEBUG).with_span_events()
        } else if verbose {
            Self::new().with_level(Level::INFO)
        } else {
            Self::new()
        };
        if json {
            config = config.with_json_format();
        }
        if let Some(dir) = log_dir {
            config = config.with_file_logging(dir);
        }
        config
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom filter directive
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directive this configuration installs when `RUST_LOG` is unset
    pub fn filter_directive(&self) -> String {
        match &self.env_filter {
            Some(filter) => filter.clone(),
            None => format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level),
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggingError> {
        if self.env_filter.is_none() {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        let directive = self.filter_directive();
        EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
            filter: directive,
            reason: e.to_string(),
        })
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Install the global tracing subscriber
    ///
    /// Keep the returned guard alive for the life of the program.
    pub fn init(self) -> Result<LoggingGuard, LoggingError> {
        let env_filter = self.build_filter()?;
        let mut guard = LoggingGuard::default();

        let file_layer = self.log_directory.as_ref().map(|dir| {
            let (writer, file_guard) = non_blocking(rolling::daily(dir, &self.log_file_prefix));
            guard.guards.push(file_guard);
            fmt::layer().json().with_writer(writer).with_span_events(self.span_events())
        });

        // Exactly one of the two console layers is present
        let json_console = self
            .json_format
            .then(|| fmt::layer().json().with_writer(io::stderr).with_span_events(self.span_events()));
        let text_console = (!self.json_format).then(|| {
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events())
        });

        Registry::default()
            .with(env_filter)
            .with(file_layer)
            .with(json_console)
            .with(text_console)
            .try_init()
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

        info!(level = %self.level, json = self.json_format, file = ?self.log_directory, "Logging initialized");
        Ok(guard)
    }
}
