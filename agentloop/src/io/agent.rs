//! Agent invocation behind the [`AgentRunner`] seam.
//!
//! The trait decouples the loop from the actual agent binary; tests drive
//! the loop with scripted runners that never spawn processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::io::process::run_with_timeout;

/// Parameters for one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Working directory for the agent process.
    pub workdir: PathBuf,
    /// Instruction text handed to the agent.
    pub prompt: String,
    /// Model name forwarded via `--model`, if any.
    pub model: Option<String>,
    /// Hard wall-clock ceiling for the invocation.
    pub timeout: Duration,
    /// Bound on captured stdout/stderr.
    pub output_limit_bytes: usize,
}

/// What one agent invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    /// Exit code; `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl AgentOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Abstraction over the agent backend.
pub trait AgentRunner {
    fn run(&self, request: &AgentRequest) -> Result<AgentOutcome>;
}

/// Production runner that spawns the configured agent binary in
/// non-interactive forced mode.
#[derive(Debug, Clone)]
pub struct CliAgent {
    binary: String,
}

impl CliAgent {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl AgentRunner for CliAgent {
    fn run(&self, request: &AgentRequest) -> Result<AgentOutcome> {
        info!(workdir = %request.workdir.display(), "starting agent");
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-p").arg("--force");
        if let Some(model) = &request.model {
            cmd.arg("--model").arg(model);
        }
        // The prompt travels as a single argv entry; no shell, no escaping.
        cmd.arg(&request.prompt).current_dir(&request.workdir);

        let output = run_with_timeout(cmd, request.timeout, request.output_limit_bytes)
            .context("run agent")?;
        Ok(AgentOutcome {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            timed_out: output.timed_out,
        })
    }
}

/// Invoke the agent and fold every failure mode into a boolean.
///
/// Failures never propagate past this boundary: they print one status line
/// plus truncated diagnostics and return `false`.
pub fn invoke<A: AgentRunner>(agent: &A, request: &AgentRequest) -> bool {
    match agent.run(request) {
        Ok(outcome) if outcome.success() => {
            debug!("agent completed");
            true
        }
        Ok(outcome) => {
            if outcome.timed_out {
                println!(
                    "  agent error: timed out after {}s",
                    request.timeout.as_secs()
                );
            } else {
                match outcome.exit_code {
                    Some(code) => println!("  agent exited with code {code}"),
                    None => println!("  agent error: terminated by signal"),
                }
            }
            if let Some(diagnostics) = failure_diagnostics(&outcome) {
                println!("  {diagnostics}");
            }
            false
        }
        Err(err) => {
            warn!(err = %err, "agent invocation failed");
            let message = format!("{err:#}");
            println!(
                "  agent error: {}",
                message.lines().next().unwrap_or("unknown error")
            );
            false
        }
    }
}

/// Pick the diagnostic excerpt for a failed invocation: the first 3 lines of
/// stderr when present, otherwise the last 3 lines of stdout. Continuation
/// lines are indented to align under the label.
fn failure_diagnostics(outcome: &AgentOutcome) -> Option<String> {
    let stderr = outcome.stderr.trim();
    if !stderr.is_empty() {
        let lines: Vec<&str> = stderr.lines().take(3).collect();
        return Some(format!("stderr: {}", lines.join("\n          ")));
    }
    let stdout = outcome.stdout.trim();
    if !stdout.is_empty() {
        let lines: Vec<&str> = stdout.lines().collect();
        let tail = &lines[lines.len().saturating_sub(3)..];
        return Some(format!("stdout: {}", tail.join("\n          ")));
    }
    None
}
