//! The long-running generate → invoke → measure → wait loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{info, warn};

use crate::core::delay::{DelayMode, next_delay};
use crate::core::prompt::PromptGenerator;
use crate::core::session::Session;
use crate::io::agent::{AgentRequest, AgentRunner, invoke};
use crate::io::config::LoopConfig;
use crate::io::git::Git;
use crate::io::metrics::{MetricsLog, init_repo, measure};
use crate::io::workspace::{list_source_files, seed_workspace};

/// Cooperative stop flag shared with the signal handler.
pub type StopFlag = Arc<AtomicBool>;

/// Per-run parameters, beyond the agent backend and randomness.
#[derive(Debug, Clone)]
pub struct LoopOptions {
    /// Directory the agent works in.
    pub workspace: PathBuf,
    /// Append-only JSONL metrics log.
    pub metrics_path: PathBuf,
    /// Inter-cycle pacing.
    pub delay: DelayMode,
    /// Model name forwarded to the agent, if any.
    pub model: Option<String>,
}

/// Run cycles until `stop` is raised, then return the session totals.
///
/// Seeds the workspace and initializes version control exactly once, then
/// loops: generate an instruction, invoke the agent, measure the resulting
/// diff, wait. A failed invocation skips measurement for that cycle; a git
/// failure degrades the cycle to a no-op. The stop flag is only consulted
/// between cycles, never mid-invocation.
pub fn run_loop<A: AgentRunner, R: Rng>(
    config: &LoopConfig,
    options: &LoopOptions,
    agent: &A,
    stop: &StopFlag,
    rng: &mut R,
) -> Result<Session> {
    seed_workspace(&options.workspace)?;
    let git = Git::new(&options.workspace);
    init_repo(&git);

    let log = MetricsLog::new(&options.metrics_path);
    let mut generator =
        PromptGenerator::new(config.followup_probability, config.typo_probability);
    let mut session = Session::new();
    let mut cycle: u64 = 0;

    while !stop.load(Ordering::SeqCst) {
        cycle += 1;
        let files = list_source_files(&options.workspace);
        let generated = generator.next(rng, &files);
        println!("[cycle {cycle}] ({}) {}", generated.category, generated.text);

        let request = AgentRequest {
            workdir: options.workspace.clone(),
            prompt: generated.text.clone(),
            model: options.model.clone(),
            timeout: Duration::from_secs(config.agent_timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
        };

        if invoke(agent, &request) {
            match measure(
                &git,
                &log,
                &mut session,
                cycle,
                &generated.text,
                generated.category,
            ) {
                Ok(Some(record)) => println!(
                    "  +{} -{} in {} file(s)",
                    record.insertions, record.deletions, record.files_changed
                ),
                Ok(None) => println!("  (no changes)"),
                Err(err) => warn!(err = %err, "cycle measurement failed"),
            }
        }

        if !stop.load(Ordering::SeqCst) {
            let delay = next_delay(options.delay, rng);
            println!("  waiting {:.1}s...", delay.as_secs_f64());
            thread::sleep(delay);
        }
    }

    info!(cycles = session.cycles, "loop stopped");
    Ok(session)
}

/// Print the aggregate session summary block.
pub fn print_summary(session: &Session, metrics_path: &Path) {
    let elapsed = session.elapsed().as_secs_f64();
    println!();
    println!("--- session summary ---");
    println!("cycles:      {}", session.cycles);
    println!("insertions:  +{}", session.total_insertions);
    println!("deletions:   -{}", session.total_deletions);
    println!("files:       {} total changes", session.total_files_changed);
    println!("duration:    {elapsed:.1}s");
    if session.cycles > 0 {
        println!(
            "avg/cycle:   +{:.1} -{:.1}",
            session.total_insertions as f64 / session.cycles as f64,
            session.total_deletions as f64 / session.cycles as f64
        );
    }
    println!("metrics logged to {}", metrics_path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedAgent, ScriptedCall, failed_outcome, ok_outcome};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn options(temp: &tempfile::TempDir) -> LoopOptions {
        LoopOptions {
            workspace: temp.path().join("workspace"),
            metrics_path: temp.path().join("metrics.jsonl"),
            delay: DelayMode::Fixed(Duration::ZERO),
            model: None,
        }
    }

    #[test]
    fn preset_stop_runs_no_cycles() {
        let temp = tempfile::tempdir().expect("tempdir");
        let stop: StopFlag = Arc::new(AtomicBool::new(true));
        let agent = ScriptedAgent::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(1);

        let session = run_loop(
            &LoopConfig::default(),
            &options(&temp),
            &agent,
            &stop,
            &mut rng,
        )
        .expect("loop");

        assert_eq!(session.cycles, 0);
        assert_eq!(agent.invocation_count(), 0);
    }

    #[test]
    fn failed_invocation_skips_measurement() {
        let temp = tempfile::tempdir().expect("tempdir");
        let stop: StopFlag = Arc::new(AtomicBool::new(false));
        let agent = ScriptedAgent::new(vec![ScriptedCall {
            outcome: failed_outcome(2, "model refused"),
            write_file: None,
        }])
        .stop_when_drained(Arc::clone(&stop));
        let mut rng = StdRng::seed_from_u64(2);

        let opts = options(&temp);
        let session = run_loop(&LoopConfig::default(), &opts, &agent, &stop, &mut rng)
            .expect("loop");

        assert_eq!(agent.invocation_count(), 1);
        assert_eq!(session.cycles, 0);
        assert!(!opts.metrics_path.exists());
    }

    #[test]
    fn noop_cycle_appends_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let stop: StopFlag = Arc::new(AtomicBool::new(false));
        // Succeeds without touching the workspace: a no-op cycle.
        let agent = ScriptedAgent::new(vec![ScriptedCall {
            outcome: ok_outcome(),
            write_file: None,
        }])
        .stop_when_drained(Arc::clone(&stop));
        let mut rng = StdRng::seed_from_u64(3);

        let opts = options(&temp);
        let session = run_loop(&LoopConfig::default(), &opts, &agent, &stop, &mut rng)
            .expect("loop");

        assert_eq!(agent.invocation_count(), 1);
        assert_eq!(session.cycles, 0);
        assert!(!opts.metrics_path.exists());
    }
}
