//! CLI entry point for the agent-driving loop.
//!
//! Parses flags, installs the two-stage interrupt handler, and hands control
//! to [`agentloop::looping::run_loop`] until a stop is requested.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use agentloop::core::delay::DelayMode;
use agentloop::io::agent::CliAgent;
use agentloop::io::config::load_config;
use agentloop::looping::{LoopOptions, StopFlag, print_summary, run_loop};
use agentloop::{exit_codes, logging};

const CONFIG_FILE: &str = "agentloop.toml";
const METRICS_FILE: &str = "metrics.jsonl";

#[derive(Parser)]
#[command(
    name = "agentloop",
    version,
    about = "Simulated developer driving a coding agent in a loop"
)]
struct Cli {
    /// Fixed inter-cycle delay in milliseconds (default: randomized
    /// human-like pacing).
    #[arg(long)]
    delay: Option<u64>,

    /// Model name forwarded to the agent.
    #[arg(long, default_value = "gemini-3-flash")]
    model: String,

    /// Directory the agent works in.
    #[arg(long, default_value = "workspace")]
    workspace: PathBuf,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(exit_codes::ERROR);
    }
}

fn run() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = load_config(Path::new(CONFIG_FILE))?;
    let stop = install_stop_handler()?;

    println!("agentloop");
    println!();
    println!("workspace: {}", cli.workspace.display());
    match cli.delay {
        Some(ms) => println!("delay:     {ms}ms (fixed)"),
        None => println!("delay:     human-like (random)"),
    }
    println!("model:     {}", cli.model);
    println!();

    let options = LoopOptions {
        workspace: cli.workspace,
        metrics_path: PathBuf::from(METRICS_FILE),
        delay: match cli.delay {
            Some(ms) => DelayMode::Fixed(Duration::from_millis(ms)),
            None => DelayMode::Human,
        },
        model: Some(cli.model),
    };
    let agent = CliAgent::new(&config.agent_bin);
    let mut rng = rand::thread_rng();

    let session = run_loop(&config, &options, &agent, &stop, &mut rng)?;
    print_summary(&session, &options.metrics_path);
    Ok(())
}

/// First interrupt requests a stop once the in-flight cycle completes; a
/// second interrupt terminates immediately.
fn install_stop_handler() -> Result<StopFlag> {
    let stop: StopFlag = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(exit_codes::FORCED_STOP);
        }
        println!("\nstopping after current cycle...");
    })
    .context("set interrupt handler")?;
    Ok(stop)
}
