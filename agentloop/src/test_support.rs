//! Test-only fakes and fixtures for driving the loop without real processes.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::Ordering;

use anyhow::{Result, anyhow};

use crate::io::agent::{AgentOutcome, AgentRequest, AgentRunner};
use crate::looping::StopFlag;

/// Successful outcome with empty output.
pub fn ok_outcome() -> AgentOutcome {
    AgentOutcome {
        exit_code: Some(0),
        stdout: String::new(),
        stderr: String::new(),
        timed_out: false,
    }
}

/// Failed outcome with the given exit code and stderr.
pub fn failed_outcome(exit_code: i32, stderr: &str) -> AgentOutcome {
    AgentOutcome {
        exit_code: Some(exit_code),
        stdout: String::new(),
        stderr: stderr.to_string(),
        timed_out: false,
    }
}

/// One scripted invocation for [`ScriptedAgent`].
#[derive(Debug, Clone)]
pub struct ScriptedCall {
    /// Outcome handed back to the loop.
    pub outcome: AgentOutcome,
    /// Optional `(filename, contents)` written into the workspace before
    /// returning, to simulate the agent editing files.
    pub write_file: Option<(String, String)>,
}

/// Agent fake that replays scripted calls in order and records the prompts
/// it received. Optionally raises a stop flag once the script is drained, so
/// loop tests terminate after a known number of cycles.
pub struct ScriptedAgent {
    calls: Mutex<VecDeque<ScriptedCall>>,
    prompts: Mutex<Vec<String>>,
    stop_when_drained: Option<StopFlag>,
}

impl ScriptedAgent {
    pub fn new(calls: Vec<ScriptedCall>) -> Self {
        Self {
            calls: Mutex::new(calls.into()),
            prompts: Mutex::new(Vec::new()),
            stop_when_drained: None,
        }
    }

    pub fn stop_when_drained(mut self, stop: StopFlag) -> Self {
        self.stop_when_drained = Some(stop);
        self
    }

    /// Number of invocations observed so far.
    pub fn invocation_count(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }

    /// Prompts received so far, in order.
    pub fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

impl AgentRunner for ScriptedAgent {
    fn run(&self, request: &AgentRequest) -> Result<AgentOutcome> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(request.prompt.clone());

        let mut calls = self.calls.lock().expect("calls lock");
        let call = calls
            .pop_front()
            .ok_or_else(|| anyhow!("scripted agent exhausted"))?;
        if calls.is_empty()
            && let Some(stop) = &self.stop_when_drained
        {
            stop.store(true, Ordering::SeqCst);
        }
        drop(calls);

        if let Some((name, contents)) = &call.write_file {
            std::fs::write(request.workdir.join(name), contents)?;
        }
        Ok(call.outcome)
    }
}

/// Temporary directory holding a workspace root and metrics path for loop
/// tests.
pub struct TestDir {
    temp: tempfile::TempDir,
}

impl TestDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn workspace(&self) -> std::path::PathBuf {
        self.temp.path().join("workspace")
    }

    pub fn metrics_path(&self) -> std::path::PathBuf {
        self.temp.path().join("metrics.jsonl")
    }
}
