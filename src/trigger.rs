// src/trigger.rs
// Debounced threshold trigger - decides when the checkpoint reminder fires

use crate::config::SentryConfig;
use serde::{Deserialize, Serialize};

/// Persisted trigger history.
///
/// Only firing events update this record; a run that decides not to fire
/// leaves it untouched. Zero values mean "never triggered". Field names
/// match the on-disk JSON written by earlier releases, so existing state
/// files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TriggerState {
    /// Seconds since epoch of the last firing
    #[serde(default)]
    pub last_triggered_ts: f64,
    /// Transcript size in KB at the last firing
    #[serde(default)]
    pub last_triggered_size_kb: f64,
}

/// Per-invocation evaluation input.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput {
    /// Current transcript size in KB
    pub size_kb: f64,
    /// The triggering action targets the checkpoint files themselves
    pub is_self_write: bool,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Emit the reminder; `next` must be persisted before emitting
    Fire { next: TriggerState },
    /// Stay quiet and leave persisted state untouched
    Suppress(SuppressReason),
}

/// Which short-circuit branch suppressed the reminder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuppressReason {
    /// The action writes the checkpoint files - firing would nag about
    /// the very write that satisfies the nag
    SelfWrite,
    BelowThreshold,
    /// Recently fired and the transcript has not grown enough since
    CoolingDown { elapsed_min: f64, growth_kb: f64 },
}

impl std::fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfWrite => write!(f, "checkpoint write detected"),
            Self::BelowThreshold => write!(f, "below threshold"),
            Self::CoolingDown {
                elapsed_min,
                growth_kb,
            } => write!(
                f,
                "cooling down: elapsed={elapsed_min:.1}min growth={growth_kb:.0}KB"
            ),
        }
    }
}

/// Decide whether the checkpoint reminder fires for this invocation.
///
/// Backoff releases on EITHER enough elapsed time OR enough growth: a
/// long-idle session eventually re-warns without growing, and a
/// fast-growing session re-warns before the time window closes.
pub fn evaluate(
    input: EvaluationInput,
    config: &SentryConfig,
    state: TriggerState,
    now: f64,
) -> Verdict {
    if input.is_self_write {
        return Verdict::Suppress(SuppressReason::SelfWrite);
    }

    if input.size_kb < config.threshold_kb as f64 {
        return Verdict::Suppress(SuppressReason::BelowThreshold);
    }

    let elapsed_min = (now - state.last_triggered_ts) / 60.0;
    let growth_kb = input.size_kb - state.last_triggered_size_kb;
    if elapsed_min < config.backoff_minutes as f64 && growth_kb < config.backoff_delta_kb as f64 {
        return Verdict::Suppress(SuppressReason::CoolingDown {
            elapsed_min,
            growth_kb,
        });
    }

    Verdict::Fire {
        next: TriggerState {
            last_triggered_ts: now,
            last_triggered_size_kb: input.size_kb,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
