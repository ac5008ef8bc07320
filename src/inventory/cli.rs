//! Provider CLI command execution.
//!
//! Runs `aws ...` commands and returns their stdout. Arguments are passed to
//! the process as given, one element per argument, without any shell or
//! re-splitting in between.

use crate::config::MAX_CLI_OUTPUT_BYTES;
use colored::Colorize;
use std::error::Error;
use tokio::process::Command;

/// Run `program` with `args` and return its stdout.
///
/// # Returns
/// * `Ok(String)` - stdout on success
/// * `Err` - if the command cannot start, exits non-zero, or prints more than
///   [`MAX_CLI_OUTPUT_BYTES`]
pub async fn run(program: &str, args: &[String]) -> Result<String, Box<dyn Error>> {
    let cmd = format!("{program} {}", args.join(" "));
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    if program.is_empty() {
        return Err("Empty command".into());
    }

    let output = Command::new(program).args(args).output().await.map_err(|e| {
        log::error!("Command execution failed: {}", e);
        format!("Failed to execute command '{program}': {e}")
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(format!("ERROR running: {stderr}").into());
    }

    log::debug!("Success cmd: {cmd} stdout.len()={}", output.stdout.len());
    if output.stdout.len() > MAX_CLI_OUTPUT_BYTES {
        return Err(format!(
            "Response too large: {} bytes for command: {cmd}",
            output.stdout.len()
        )
        .into());
    }

    let stdout = String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    Ok(stdout)
}
