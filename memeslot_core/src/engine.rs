use serde::{Deserialize, Serialize};

use crate::{
    paytable::Paytable,
    rng::ProvablyFairRng,
    symbols::{ReelsConfig, Symbol},
};

/// Everything besides the seeds that decides a spin.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineParams {
    pub reels: ReelsConfig,
    pub paytable: Paytable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    /// `rows` lines of one symbol per reel.
    pub reel_window: Vec<Vec<Symbol>>,
    pub payout: f64,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.payout > 0.0
    }

    /// The payline row, left to right.
    pub fn center_line(&self) -> &[Symbol] {
        self.reel_window.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn indices(&self) -> Vec<Vec<u8>> {
        window_indices(&self.reel_window)
    }
}

pub fn window_indices(window: &[Vec<Symbol>]) -> Vec<Vec<u8>> {
    window
        .iter()
        .map(|row| row.iter().copied().map(Symbol::to_index).collect())
        .collect()
}

/// Stop position on a strip of `len` symbols for a float in `[0, 1)`.
fn stop_index(f: f64, len: usize) -> usize {
    ((f * len as f64) as usize).min(len - 1)
}

/// Each reel consumes one float from the stream and stops there; the window
/// shows `rows` consecutive symbols from that stop, wrapping around the strip.
/// Empty strips are skipped.
pub fn compute_reel_window(rng: &ProvablyFairRng, reels: &ReelsConfig) -> Vec<Vec<Symbol>> {
    let stops: Vec<(&[Symbol], usize)> = reels
        .reels
        .iter()
        .zip(rng.floats())
        .filter(|(strip, _)| !strip.is_empty())
        .map(|(strip, f)| (strip.as_slice(), stop_index(f, strip.len())))
        .collect();

    (0..reels.rows)
        .map(|row| {
            stops
                .iter()
                .map(|(strip, stop)| strip[(stop + row) % strip.len()])
                .collect()
        })
        .collect()
}

/// Sum over rows of `bet * multiplier` for every row showing a single symbol.
fn evaluate_payout(window: &[Vec<Symbol>], paytable: &Paytable, bet: f64) -> f64 {
    let line_multiplier = |row: &Vec<Symbol>| {
        let first = *row.first()?;
        row.iter()
            .all(|s| *s == first)
            .then(|| paytable.multiplier(first, row.len()))
            .flatten()
    };
    window
        .iter()
        .filter_map(line_multiplier)
        .map(|m| bet * m)
        .sum()
}

pub fn spin_once(rng: &ProvablyFairRng, params: &EngineParams, bet: f64) -> SpinOutcome {
    let reel_window = compute_reel_window(rng, &params.reels);
    let payout = evaluate_payout(&reel_window, &params.paytable, bet);
    SpinOutcome {
        reel_window,
        payout,
    }
}

pub fn spin_with_seeds(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    params: &EngineParams,
    bet: f64,
) -> SpinOutcome {
    spin_once(&ProvablyFairRng::new(server_seed, client_seed, nonce), params, bet)
}

/// True when `expected` is exactly the window these seeds produce.
pub fn verify_reels(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    reels: &ReelsConfig,
    expected: &[Vec<u8>],
) -> bool {
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    window_indices(&compute_reel_window(&rng, reels)) == expected
}
