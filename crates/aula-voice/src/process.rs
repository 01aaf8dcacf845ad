//! Running external command-line tools.

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Runs `command` to completion within `timeout`.
///
/// The child is killed if the timeout elapses. A non-zero exit status is an
/// error carrying the tool's stderr.
pub(crate) async fn run_tool(
    tool: &str,
    mut command: Command,
    timeout: Duration,
) -> Result<Output, String> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command
        .spawn()
        .map_err(|e| format!("Failed to spawn {}: {}", tool, e))?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            format!(
                "{} process timed out after {} seconds",
                tool,
                timeout.as_secs()
            )
        })?
        .map_err(|e| format!("Failed to wait for {}: {}", tool, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} failed ({}): {}",
            tool,
            output.status,
            stderr.trim()
        ));
    }

    Ok(output)
}
