// src/hooks/mod.rs
// Claude Code hook handlers

pub mod pre_tool;
pub mod precompact;

use crate::config::SentryConfig;
use crate::trigger::{self, EvaluationInput, Verdict};
use anyhow::Result;
use std::io::Read;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Checkpoint artifacts the self-trigger guard watches for.
pub const CHECKPOINT_SENTINELS: [&str; 2] = ["CHECKPOINT.md", "HANDOFF.md"];

/// Performance threshold in milliseconds - warn if hook exceeds this.
const HOOK_PERF_THRESHOLD_MS: u128 = 100;

/// Read hook input from stdin (Claude Code passes JSON)
pub fn read_hook_input() -> Result<serde_json::Value> {
    let mut input = String::new();
    std::io::stdin().take(1_048_576).read_to_string(&mut input)?;
    let json: serde_json::Value = serde_json::from_str(&input)?;
    Ok(json)
}

/// Write hook output to stdout
pub fn write_hook_output(output: &serde_json::Value) {
    use std::io::Write;
    match serde_json::to_string(output) {
        Ok(s) => {
            let _ = writeln!(std::io::stdout(), "{}", s);
        }
        Err(e) => {
            eprintln!("Failed to serialize hook output: {}", e);
            let _ = writeln!(std::io::stdout(), "{{}}");
        }
    }
}

/// Seconds since epoch as a float - state timestamps keep sub-second
/// precision.
pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// The action a PreToolUse event describes, reduced to the one string the
/// self-trigger guard inspects.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolAction {
    /// Write/Edit - inspect the target path
    FileWrite { file_path: String },
    /// Bash - inspect the command text
    ShellCommand { command: String },
}

impl ToolAction {
    /// Extract the action from hook input. Tools that neither write files
    /// nor run commands carry no action worth guarding.
    pub fn from_hook_input(input: &serde_json::Value) -> Option<Self> {
        let tool_name = input.get("tool_name").and_then(|v| v.as_str())?;
        let tool_input = input.get("tool_input")?;
        match tool_name {
            "Write" | "Edit" => tool_input
                .get("file_path")
                .and_then(|v| v.as_str())
                .map(|p| Self::FileWrite {
                    file_path: p.to_string(),
                }),
            "Bash" => tool_input
                .get("command")
                .and_then(|v| v.as_str())
                .map(|c| Self::ShellCommand {
                    command: c.to_string(),
                }),
            _ => None,
        }
    }

    /// True when the action itself targets the checkpoint files.
    pub fn targets_checkpoint(&self) -> bool {
        let haystack = match self {
            Self::FileWrite { file_path } => file_path,
            Self::ShellCommand { command } => command,
        };
        CHECKPOINT_SENTINELS.iter().any(|s| haystack.contains(s))
    }
}

/// Transcript size in KB, or None when the file cannot be statted.
pub fn transcript_size_kb(path: &str) -> Option<f64> {
    std::fs::metadata(path).ok().map(|m| m.len() as f64 / 1024.0)
}

/// Reminder text injected into Claude's context when the trigger fires.
pub fn reminder_message(size_kb: f64, threshold_kb: u64) -> String {
    format!(
        "**Context Sentry Warning**: transcript has grown large ({} KB, threshold {} KB).\n\
         \n\
         Before proceeding with this tool call, you MUST update the following files:\n\
         \n\
         1. `docs/_runtime/CHECKPOINT.md`: record\n\
         \x20  - Key decisions and invariants established so far\n\
         \x20  - What has been completed (files created/modified, features implemented)\n\
         \x20  - What is in progress or next\n\
         \x20  - Critical file paths and their purposes\n\
         \n\
         2. `docs/_runtime/HANDOFF.md`: record\n\
         \x20  - Concrete next steps (numbered, actionable)\n\
         \x20  - Explicit do-not list (things to avoid or that are out of scope)\n\
         \x20  - Verification checklist (how to confirm current state is correct)\n\
         \n\
         Create the `docs/_runtime/` directory if it does not exist.\n\
         Write these files NOW, then continue with the original tool call.",
        size_kb.round() as u64,
        threshold_kb
    )
}

/// Probe the transcript, run the trigger evaluation, and on fire persist
/// state before emitting the reminder payload. Shared by both hook events.
///
/// Persist-then-emit ordering matters: a crash between the two costs one
/// missed reminder, never an immediate duplicate.
pub(crate) fn evaluate_and_emit(
    event_name: &str,
    is_self_write: bool,
    transcript_path: Option<&str>,
    config: &SentryConfig,
) {
    let Some(path) = transcript_path else {
        tracing::debug!("no transcript_path in hook input");
        return;
    };
    let Some(size_kb) = transcript_size_kb(path) else {
        tracing::debug!("cannot stat transcript: {path}");
        return;
    };

    let state_path = crate::state::state_path();
    let state = crate::state::load(&state_path);
    let input = EvaluationInput {
        size_kb,
        is_self_write,
    };

    match trigger::evaluate(input, config, state, unix_now()) {
        Verdict::Suppress(reason) => {
            tracing::debug!("{event_name} skipped ({reason})");
        }
        Verdict::Fire { next } => {
            crate::state::store(&state_path, &next);

            // Always trace firings to stderr, visible in verbose mode
            eprintln!(
                "[context-sentry] TRIGGERED: transcript={}KB threshold={}KB backoff={}min",
                size_kb.round() as u64,
                config.threshold_kb,
                config.backoff_minutes
            );

            let output = serde_json::json!({
                "hookSpecificOutput": {
                    "hookEventName": event_name,
                    "additionalContext": reminder_message(size_kb, config.threshold_kb)
                }
            });
            write_hook_output(&output);
        }
    }
}

/// Timer guard for hook performance monitoring
/// Logs execution time to stderr on drop
pub struct HookTimer {
    hook_name: &'static str,
    start: Instant,
}

impl HookTimer {
    /// Start timing a hook
    pub fn start(hook_name: &'static str) -> Self {
        Self {
            hook_name,
            start: Instant::now(),
        }
    }
}

impl Drop for HookTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_millis();
        if elapsed > HOOK_PERF_THRESHOLD_MS {
            tracing::warn!(
                "[context-sentry] PERF: {} hook took {}ms (threshold: {}ms)",
                self.hook_name,
                elapsed,
                HOOK_PERF_THRESHOLD_MS
            );
        } else {
            tracing::debug!(
                "[context-sentry] {} hook completed in {}ms",
                self.hook_name,
                elapsed
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // ── ToolAction extraction ───────────────────────────────────────────────

    #[test]
    fn tool_action_from_write() {
        let action = ToolAction::from_hook_input(&serde_json::json!({
            "tool_name": "Write",
            "tool_input": {"file_path": "/project/src/main.rs", "content": "fn main() {}"}
        }));
        assert_eq!(
            action,
            Some(ToolAction::FileWrite {
                file_path: "/project/src/main.rs".to_string()
            })
        );
    }

    #[test]
    fn tool_action_from_edit() {
        let action = ToolAction::from_hook_input(&serde_json::json!({
            "tool_name": "Edit",
            "tool_input": {"file_path": "/project/notes.md"}
        }));
        assert!(matches!(action, Some(ToolAction::FileWrite { .. })));
    }

    #[test]
    fn tool_action_from_bash() {
        let action = ToolAction::from_hook_input(&serde_json::json!({
            "tool_name": "Bash",
            "tool_input": {"command": "cargo test"}
        }));
        assert_eq!(
            action,
            Some(ToolAction::ShellCommand {
                command: "cargo test".to_string()
            })
        );
    }

    #[test]
    fn tool_action_ignores_other_tools() {
        let action = ToolAction::from_hook_input(&serde_json::json!({
            "tool_name": "Grep",
            "tool_input": {"pattern": "CHECKPOINT.md"}
        }));
        assert_eq!(action, None);
    }

    #[test]
    fn tool_action_tolerates_missing_and_wrong_typed_fields() {
        assert_eq!(ToolAction::from_hook_input(&serde_json::json!({})), None);
        assert_eq!(
            ToolAction::from_hook_input(&serde_json::json!({"tool_name": "Write"})),
            None
        );
        assert_eq!(
            ToolAction::from_hook_input(&serde_json::json!({
                "tool_name": "Write",
                "tool_input": {"file_path": 42}
            })),
            None
        );
        assert_eq!(
            ToolAction::from_hook_input(&serde_json::json!({
                "tool_name": 7,
                "tool_input": {"file_path": "/x"}
            })),
            None
        );
    }

    // ── Self-trigger guard ──────────────────────────────────────────────────

    #[test]
    fn guard_matches_checkpoint_path() {
        let action = ToolAction::FileWrite {
            file_path: "/project/docs/_runtime/CHECKPOINT.md".to_string(),
        };
        assert!(action.targets_checkpoint());
    }

    #[test]
    fn guard_matches_handoff_path() {
        let action = ToolAction::FileWrite {
            file_path: "docs/_runtime/HANDOFF.md".to_string(),
        };
        assert!(action.targets_checkpoint());
    }

    #[test]
    fn guard_matches_sentinel_inside_command_text() {
        let action = ToolAction::ShellCommand {
            command: "mkdir -p docs/_runtime && touch docs/_runtime/CHECKPOINT.md".to_string(),
        };
        assert!(action.targets_checkpoint());
    }

    #[test]
    fn guard_ignores_unrelated_writes() {
        let action = ToolAction::FileWrite {
            file_path: "/project/src/checkpoint.rs".to_string(),
        };
        assert!(!action.targets_checkpoint());

        let action = ToolAction::ShellCommand {
            command: "git status".to_string(),
        };
        assert!(!action.targets_checkpoint());
    }

    // ── Transcript size probe ───────────────────────────────────────────────

    #[test]
    fn transcript_size_of_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();

        let size = transcript_size_kb(path.to_str().unwrap());
        assert_eq!(size, Some(2.0));
    }

    #[test]
    fn transcript_size_of_missing_file_is_none() {
        assert_eq!(transcript_size_kb("/nonexistent/transcript.jsonl"), None);
    }

    // ── Reminder message ────────────────────────────────────────────────────

    #[test]
    fn reminder_message_includes_rounded_size_and_threshold() {
        let msg = reminder_message(250.7, 200);
        assert!(msg.contains("251 KB"));
        assert!(msg.contains("threshold 200 KB"));
        assert!(msg.contains("CHECKPOINT.md"));
        assert!(msg.contains("HANDOFF.md"));
    }
}
