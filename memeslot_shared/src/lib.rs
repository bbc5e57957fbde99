use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinRequest {
    /// Bet as typed by the player; clamped server-side.
    pub bet: String,
    #[serde(default = "default_token")]
    pub token: String,
    #[serde(default)]
    pub client_seed: Option<String>,
}

fn default_token() -> String {
    "SOL".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinResponse {
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub reels: Vec<String>, // symbol names on the payline
    pub bet: f64,
    pub payout: f64,
    pub bet_signature: String,
    pub payout_signature: Option<String>,
    pub balance: f64,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WalletInfo {
    pub connected: bool,
    pub address: Option<String>,
    pub balance: f64,
    pub provider: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionState {
    pub wallet: WalletInfo,
    pub reels: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConnectResponse {
    pub wallet: WalletInfo,
    pub notification: Notification,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameConfig {
    pub symbols: Vec<String>,
    pub tokens: Vec<String>,
    pub initial_reels: Vec<String>,
    pub min_bet: f64,
    pub max_bet: f64,
    pub bet_step: f64,
    pub cooldown_ms: u64,
    pub house_address: String,
    pub win_multiplier: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VerifyResponse {
    pub server_seed_hash: String,
    pub nonce: u64,
    pub revealed_seeds: Vec<RevealedSeed>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RevealedSeed {
    pub server_seed: String,
    pub server_seed_hash: String,
    pub retired_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VerifyRequest {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
    pub reels: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VerifyResult {
    pub valid: bool,
    pub server_seed_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminSetParamsRequest {
    pub paytable: Vec<PaytableEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaytableEntry {
    pub symbol: u8,
    pub count: u8,
    pub payout_multiplier: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinLogEntry {
    pub id: i64,
    pub ts: DateTime<Utc>,
    pub wallet: String,
    pub client_seed: String,
    pub nonce: i64,
    pub server_seed_hash: String,
    pub result_reels: Vec<Vec<u8>>,
    pub bet: f64,
    pub payout: f64,
    pub bet_signature: String,
    pub payout_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

/// Toast shown to the player.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub variant: Variant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == Variant::Destructive
    }
}
