use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::ledger::Ledger;

/// Fixed-count polling: `attempts` reads spaced `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Single read, no waiting. Used where the ledger settles synchronously.
    pub const fn immediate() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(500))
    }
}

/// Re-reads `owner`'s balance until it moves off `previous` or the policy is
/// spent. Returns the last successful read, `None` if every read failed.
pub async fn refresh_balance(
    ledger: &dyn Ledger,
    owner: &Pubkey,
    previous: Option<u64>,
    policy: &PollPolicy,
) -> Option<u64> {
    let mut last = None;
    for attempt in 1..=policy.attempts.max(1) {
        match ledger.balance(owner).await {
            Ok(lamports) => {
                last = Some(lamports);
                if previous != Some(lamports) {
                    debug!(%owner, lamports, attempt, "balance refreshed");
                    break;
                }
            }
            Err(e) => warn!(%owner, attempt, error = %e, "balance read failed"),
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    last
}
