use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use memeslot_chain::{
    KeypairWallet, Ledger, MemoryLedger, PollPolicy, Pubkey, RpcLedger, WalletProvider,
    DEVNET_URL, LAMPORTS_PER_SOL,
};
use memeslot_core::{bet, BetLimits, ReelsConfig};
use solana_sdk::signature::Keypair;
use sqlx::SqlitePool;
use tracing::info;

use crate::game::{GameSettings, SlotMachine};

/// Default house account on devnet.
pub const HOUSE_WALLET: &str = "4iLbQpA51ZJN5yFf5RoswabcvqWxsninf4GJGGh24o3J";

const OFFLINE_FEE_LAMPORTS: u64 = 5_000;
const OFFLINE_PLAYER_SOL: u64 = 2;
const OFFLINE_HOUSE_SOL: u64 = 100;

#[derive(Parser, Debug, Clone)]
#[command(name = "memeslot-server", about = "Slot machine backend with Solana payouts")]
pub struct Config {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://memeslot.db?mode=rwc")]
    pub database_url: String,
    #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,
    /// Bearer token for /admin routes
    #[arg(long, env = "API_KEY", default_value = "dev-key")]
    pub api_key: String,
    /// JSON-RPC endpoint of the cluster
    #[arg(long, env = "RPC_URL", default_value = DEVNET_URL)]
    pub rpc_url: String,
    /// Player keypair file, as written by solana-keygen
    #[arg(long, env = "PLAYER_KEYPAIR")]
    pub player_keypair: Option<PathBuf>,
    /// Connect the player wallet at start-up without an explicit connect
    #[arg(long, env = "PLAYER_TRUSTED")]
    pub player_trusted: bool,
    /// House keypair; without it payouts cannot be signed
    #[arg(long, env = "HOUSE_KEYPAIR")]
    pub house_keypair: Option<PathBuf>,
    /// House address receiving bets when no house keypair is loaded
    #[arg(long, env = "HOUSE_ADDRESS", default_value = HOUSE_WALLET)]
    pub house_address: String,
    #[arg(long, env = "MIN_BET", default_value_t = bet::DEFAULT_MIN_BET)]
    pub min_bet: f64,
    #[arg(long, env = "MAX_BET", default_value_t = bet::DEFAULT_MAX_BET)]
    pub max_bet: f64,
    #[arg(long, env = "BET_STEP", default_value_t = bet::DEFAULT_BET_STEP)]
    pub bet_step: f64,
    /// Minimum gap between spins
    #[arg(long, env = "COOLDOWN_MS", default_value_t = 2500)]
    pub cooldown_ms: u64,
    #[arg(long, env = "POLL_ATTEMPTS", default_value_t = 10)]
    pub poll_attempts: u32,
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 500)]
    pub poll_interval_ms: u64,
    /// Play against an in-process ledger with airdropped demo funds
    #[arg(long, env = "OFFLINE")]
    pub offline: bool,
}

impl Config {
    pub fn settings(&self) -> anyhow::Result<GameSettings> {
        Ok(GameSettings {
            limits: BetLimits::new(self.min_bet, self.max_bet, self.bet_step)?,
            cooldown: Duration::from_millis(self.cooldown_ms),
            poll: PollPolicy::new(self.poll_attempts, Duration::from_millis(self.poll_interval_ms)),
            reels: ReelsConfig::default(),
        })
    }

    fn load_wallet(path: Option<&PathBuf>, name: &str, trusted: bool) -> anyhow::Result<Option<KeypairWallet>> {
        path.map(|p| {
            KeypairWallet::from_file(name, p, trusted)
                .with_context(|| format!("loading {name} keypair"))
        })
        .transpose()
    }

    pub async fn build_game(&self, db: SqlitePool) -> anyhow::Result<SlotMachine> {
        let settings = self.settings()?;
        let mut player = Self::load_wallet(self.player_keypair.as_ref(), "keypair", self.player_trusted)?;
        let mut house = Self::load_wallet(self.house_keypair.as_ref(), "house", true)?;

        let ledger: Arc<dyn Ledger> = if self.offline {
            let ledger = MemoryLedger::new().with_fee(OFFLINE_FEE_LAMPORTS);
            let p = player.get_or_insert_with(|| {
                KeypairWallet::new("demo", Keypair::new(), self.player_trusted)
            });
            ledger.airdrop(&p.address(), OFFLINE_PLAYER_SOL * LAMPORTS_PER_SOL);
            let h = house.get_or_insert_with(|| KeypairWallet::new("house", Keypair::new(), true));
            ledger.airdrop(&h.address(), OFFLINE_HOUSE_SOL * LAMPORTS_PER_SOL);
            info!(player = %p.address(), house = %h.address(), "offline ledger funded");
            Arc::new(ledger)
        } else {
            info!(rpc = %self.rpc_url, "using rpc ledger");
            Arc::new(RpcLedger::new(self.rpc_url.clone()))
        };

        let house_address = match &house {
            Some(h) => {
                h.connect(true).await?;
                h.address()
            }
            None => Pubkey::from_str(&self.house_address).context("parsing house address")?,
        };

        Ok(SlotMachine::new(
            ledger,
            player.map(|w| Arc::new(w) as Arc<dyn WalletProvider>),
            house.map(|w| Arc::new(w) as Arc<dyn WalletProvider>),
            house_address,
            db,
            settings,
        ))
    }
}
