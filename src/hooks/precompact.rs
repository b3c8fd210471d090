// src/hooks/precompact.rs
// PreCompact hook handler - last chance to checkpoint before compaction
// rewrites the conversation

use crate::config::SentryConfig;
use crate::hooks::{HookTimer, evaluate_and_emit, read_hook_input};
use anyhow::{Context, Result};

/// PreCompact hook input from Claude Code
#[derive(Debug)]
struct PreCompactInput {
    hook_event_name: String,
    transcript_path: Option<String>,
}

impl PreCompactInput {
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
        }
    }
}

/// Run PreCompact hook
pub fn run(config: &SentryConfig) -> Result<()> {
    let input = read_hook_input().context("Failed to parse hook input from stdin")?;
    let pc_input = PreCompactInput::from_json(&input);

    // Only process PreCompact events
    if pc_input.hook_event_name != "PreCompact" {
        return Ok(());
    }

    let _timer = HookTimer::start("PreCompact");

    // Compaction carries no tool action, so the self-trigger guard never
    // applies here.
    evaluate_and_emit(
        &pc_input.hook_event_name,
        false,
        pc_input.transcript_path.as_deref(),
        config,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precompact_input_parses_event_and_transcript() {
        let input = PreCompactInput::from_json(&serde_json::json!({
            "hook_event_name": "PreCompact",
            "transcript_path": "/tmp/session.jsonl",
            "trigger": "auto"
        }));
        assert_eq!(input.hook_event_name, "PreCompact");
        assert_eq!(input.transcript_path.as_deref(), Some("/tmp/session.jsonl"));
    }

    #[test]
    fn precompact_input_defaults_on_empty_json() {
        let input = PreCompactInput::from_json(&serde_json::json!({}));
        assert!(input.hook_event_name.is_empty());
        assert!(input.transcript_path.is_none());
    }
}
