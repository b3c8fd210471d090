// src/config.rs
// Environment-derived configuration - single source of truth for all env vars

use tracing::debug;

/// Transcript size threshold in KB (CONTEXT_SENTRY_THRESHOLD_KB)
pub const DEFAULT_THRESHOLD_KB: u64 = 200;
/// Minutes between repeated reminders (CONTEXT_SENTRY_BACKOFF_MIN)
pub const DEFAULT_BACKOFF_MINUTES: u64 = 10;
/// Additional growth in KB before re-warning (CONTEXT_SENTRY_BACKOFF_DELTA_KB)
pub const DEFAULT_BACKOFF_DELTA_KB: u64 = 50;

/// Sentry configuration, loaded once at startup and threaded explicitly
/// into the evaluator.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Minimum transcript size before a reminder is ever considered
    pub threshold_kb: u64,
    /// Minimum elapsed time since the last reminder before re-firing
    pub backoff_minutes: u64,
    /// Transcript growth since the last reminder that re-arms it early
    pub backoff_delta_kb: u64,
    /// Extra stderr diagnostics (CONTEXT_SENTRY_DEBUG)
    pub debug: bool,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            threshold_kb: DEFAULT_THRESHOLD_KB,
            backoff_minutes: DEFAULT_BACKOFF_MINUTES,
            backoff_delta_kb: DEFAULT_BACKOFF_DELTA_KB,
            debug: false,
        }
    }
}

impl SentryConfig {
    /// Load configuration from environment variables (call once at startup).
    /// Unparsable values fall back to the defaults rather than erroring.
    pub fn from_env() -> Self {
        let config = Self {
            threshold_kb: read_env("CONTEXT_SENTRY_THRESHOLD_KB")
                .as_deref()
                .and_then(parse_u64)
                .unwrap_or(DEFAULT_THRESHOLD_KB),
            backoff_minutes: read_env("CONTEXT_SENTRY_BACKOFF_MIN")
                .as_deref()
                .and_then(parse_u64)
                .unwrap_or(DEFAULT_BACKOFF_MINUTES),
            backoff_delta_kb: read_env("CONTEXT_SENTRY_BACKOFF_DELTA_KB")
                .as_deref()
                .and_then(parse_u64)
                .unwrap_or(DEFAULT_BACKOFF_DELTA_KB),
            debug: read_env("CONTEXT_SENTRY_DEBUG")
                .as_deref()
                .and_then(parse_bool)
                .unwrap_or(false),
        };
        debug!(?config, "environment configuration loaded");
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if self.threshold_kb == 0 {
            validation.add_warning(
                "CONTEXT_SENTRY_THRESHOLD_KB is 0 - the reminder is considered on every tool call",
            );
        }

        if self.backoff_minutes == 0 && self.backoff_delta_kb == 0 {
            validation.add_warning(
                "Both backoff windows are 0 - every evaluation above the threshold will re-fire",
            );
        }

        validation
    }

    /// Human-readable report of effective values plus validation, for
    /// `sentry config`.
    pub fn report(&self) -> String {
        let lines = [
            format!(
                "threshold:      {} KB (CONTEXT_SENTRY_THRESHOLD_KB)",
                self.threshold_kb
            ),
            format!(
                "backoff:        {} min (CONTEXT_SENTRY_BACKOFF_MIN)",
                self.backoff_minutes
            ),
            format!(
                "backoff delta:  {} KB (CONTEXT_SENTRY_BACKOFF_DELTA_KB)",
                self.backoff_delta_kb
            ),
            format!(
                "debug:          {} (CONTEXT_SENTRY_DEBUG)",
                if self.debug { "on" } else { "off" }
            ),
        ];
        format!("{}\n\n{}", lines.join("\n"), self.validate().report())
    }
}

/// Configuration validation result
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        if self.warnings.is_empty() {
            return "Configuration OK".to_string();
        }
        let mut lines = vec!["Warnings:".to_string()];
        for warn in &self.warnings {
            lines.push(format!("  - {}", warn));
        }
        lines.join("\n")
    }
}

/// Read a single env var, filtering empty values
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
