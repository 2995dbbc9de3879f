//! Inter-cycle pacing.

use std::time::Duration;

use rand::Rng;

/// How the orchestrator waits between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMode {
    /// Always wait exactly this long (the `--delay` override).
    Fixed(Duration),
    /// Sample a human-like pause from tiered probability bands.
    Human,
}

/// Compute the next inter-cycle delay.
pub fn next_delay<R: Rng>(mode: DelayMode, rng: &mut R) -> Duration {
    match mode {
        DelayMode::Fixed(duration) => duration,
        DelayMode::Human => human_delay(rng),
    }
}

/// Four bands: quick "thinking" pauses dominate, with a rare long tail that
/// dominates the expected wait.
fn human_delay<R: Rng>(rng: &mut R) -> Duration {
    let band = rng.r#gen::<f64>();
    let ms: u64 = if band < 0.4 {
        rng.gen_range(500..3500)
    } else if band < 0.7 {
        rng.gen_range(3000..11_000)
    } else if band < 0.9 {
        rng.gen_range(8000..28_000)
    } else {
        rng.gen_range(20_000..65_000)
    };
    Duration::from_millis(ms)
}
