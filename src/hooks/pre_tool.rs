// src/hooks/pre_tool.rs
// PreToolUse hook handler - reminds Claude to checkpoint before the
// transcript outgrows its context

use crate::config::SentryConfig;
use crate::hooks::{HookTimer, ToolAction, evaluate_and_emit, read_hook_input};
use anyhow::{Context, Result};

/// PreToolUse hook input from Claude Code
#[derive(Debug)]
struct PreToolInput {
    hook_event_name: String,
    transcript_path: Option<String>,
    action: Option<ToolAction>,
}

impl PreToolInput {
    fn from_json(json: &serde_json::Value) -> Self {
        Self {
            hook_event_name: json
                .get("hook_event_name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            transcript_path: json
                .get("transcript_path")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            action: ToolAction::from_hook_input(json),
        }
    }
}

/// Run PreToolUse hook
pub fn run(config: &SentryConfig) -> Result<()> {
    let input = read_hook_input().context("Failed to parse hook input from stdin")?;
    let pre_input = PreToolInput::from_json(&input);

    // Only process PreToolUse events
    if pre_input.hook_event_name != "PreToolUse" {
        return Ok(());
    }

    let _timer = HookTimer::start("PreToolUse");

    let is_self_write = pre_input
        .action
        .as_ref()
        .is_some_and(ToolAction::targets_checkpoint);

    evaluate_and_emit(
        &pre_input.hook_event_name,
        is_self_write,
        pre_input.transcript_path.as_deref(),
        config,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_input_parses_full_input() {
        let input = PreToolInput::from_json(&serde_json::json!({
            "hook_event_name": "PreToolUse",
            "transcript_path": "/tmp/session.jsonl",
            "tool_name": "Write",
            "tool_input": {"file_path": "/project/src/lib.rs"}
        }));
        assert_eq!(input.hook_event_name, "PreToolUse");
        assert_eq!(input.transcript_path.as_deref(), Some("/tmp/session.jsonl"));
        assert!(matches!(input.action, Some(ToolAction::FileWrite { .. })));
    }

    #[test]
    fn pre_input_defaults_on_empty_json() {
        let input = PreToolInput::from_json(&serde_json::json!({}));
        assert!(input.hook_event_name.is_empty());
        assert!(input.transcript_path.is_none());
        assert!(input.action.is_none());
    }

    #[test]
    fn pre_input_ignores_wrong_typed_transcript_path() {
        let input = PreToolInput::from_json(&serde_json::json!({
            "hook_event_name": "PreToolUse",
            "transcript_path": ["not", "a", "string"]
        }));
        assert!(input.transcript_path.is_none());
    }

    #[test]
    fn checkpoint_write_is_flagged_as_self_write() {
        let input = PreToolInput::from_json(&serde_json::json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Write",
            "tool_input": {"file_path": "/project/docs/_runtime/CHECKPOINT.md"}
        }));
        assert!(
            input
                .action
                .as_ref()
                .is_some_and(ToolAction::targets_checkpoint)
        );
    }
}
