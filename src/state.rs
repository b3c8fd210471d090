// src/state.rs
// Persisted trigger state - a tiny JSON record replaced wholesale on each fire

use crate::trigger::TriggerState;
use std::io::Write;
use std::path::{Path, PathBuf};

/// State file name, kept under the project's `.claude/` directory
/// (auto-created, expected to be gitignored).
pub const STATE_FILE: &str = ".context_sentry_state.json";

/// Resolve the project directory the state file lives under.
///
/// `CLAUDE_PROJECT_DIR` (set by Claude Code for hook processes) wins;
/// otherwise the working directory, then the home directory.
pub fn project_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLAUDE_PROJECT_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    std::env::current_dir().unwrap_or_else(|_| {
        dirs::home_dir().unwrap_or_else(|| {
            tracing::warn!("neither cwd nor HOME available, using '.' for sentry state");
            PathBuf::from(".")
        })
    })
}

/// Path of the persisted trigger state for the current project.
pub fn state_path() -> PathBuf {
    project_dir().join(".claude").join(STATE_FILE)
}

/// Load persisted state. Missing, unreadable, or malformed files all mean
/// "never previously triggered" - the evaluator must always be able to run.
pub fn load(path: &Path) -> TriggerState {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|data| serde_json::from_str(&data).ok())
        .unwrap_or_default()
}

/// Persist state, overwriting the whole record.
///
/// Write to a temp file then rename for atomicity (prevents corruption when
/// concurrent hook invocations race). Errors are swallowed: the reminder is
/// still emitted when backoff bookkeeping fails.
pub fn store(path: &Path, state: &TriggerState) {
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::debug!("Failed to create state dir: {e}");
        return;
    }

    let json = match serde_json::to_string(state) {
        Ok(j) => j,
        Err(e) => {
            tracing::debug!("Failed to serialize trigger state: {e}");
            return;
        }
    };

    let temp = path.with_extension("tmp");
    let mut opts = std::fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    match opts.open(&temp) {
        Ok(mut f) => {
            if let Err(e) = f.write_all(json.as_bytes()) {
                tracing::debug!("Failed to write state temp file: {e}");
                return;
            }
            drop(f);
            if let Err(e) = std::fs::rename(&temp, path) {
                tracing::debug!("Failed to rename state temp file: {e}");
            }
        }
        Err(e) => {
            tracing::debug!("Failed to open state temp file: {e}");
        }
    }
}
