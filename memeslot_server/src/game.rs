use std::sync::Arc;
use std::time::{Duration, Instant};

use memeslot_chain::{
    lamports_to_sol, refresh_balance, send_transfer, sol_to_lamports, ChainError, Ledger,
    PollPolicy, Pubkey, Signature, WalletProvider,
};
use memeslot_core::{
    generate_seed, spin_with_seeds, BetAmount, BetLimits, Cooldown, EngineParams, Paytable,
    PaytableEntry, ReelsConfig, Symbol, Token, INITIAL_REELS,
};
use memeslot_shared::{
    ConnectResponse, GameConfig, Notification, SessionState, SpinRequest, SpinResponse,
    WalletInfo,
};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::db::{self, NewSpin};
use crate::error::GameError;

#[derive(Debug, Clone)]
pub struct GameSettings {
    pub limits: BetLimits,
    pub cooldown: Duration,
    pub poll: PollPolicy,
    pub reels: ReelsConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            limits: BetLimits::default(),
            cooldown: memeslot_core::DEFAULT_COOLDOWN,
            poll: PollPolicy::default(),
            reels: ReelsConfig::default(),
        }
    }
}

struct Session {
    address: Option<Pubkey>,
    balance: f64,
    reels: Vec<Symbol>,
    cooldown: Cooldown,
}

/// One player's table. Every operation holds the session lock for its whole
/// duration, so wallet calls and spins never interleave.
pub struct SlotMachine {
    ledger: Arc<dyn Ledger>,
    player: Option<Arc<dyn WalletProvider>>,
    house: Option<Arc<dyn WalletProvider>>,
    house_address: Pubkey,
    db: SqlitePool,
    settings: GameSettings,
    session: Mutex<Session>,
}

impl SlotMachine {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        player: Option<Arc<dyn WalletProvider>>,
        house: Option<Arc<dyn WalletProvider>>,
        house_address: Pubkey,
        db: SqlitePool,
        settings: GameSettings,
    ) -> Self {
        let session = Session {
            address: None,
            balance: 0.0,
            reels: INITIAL_REELS.to_vec(),
            cooldown: Cooldown::new(settings.cooldown),
        };
        Self {
            ledger,
            player,
            house,
            house_address,
            db,
            settings,
            session: Mutex::new(session),
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    /// Limits and symbols for the front-end. The win multiplier comes from the
    /// stored paytable, so it follows admin changes.
    pub async fn config(&self) -> Result<GameConfig, GameError> {
        let params = db::get_params(&self.db).await?;
        let paytable = self.engine_params(&params.paytable_json).paytable;
        Ok(GameConfig {
            symbols: Symbol::ALL.iter().map(|s| s.name().to_string()).collect(),
            tokens: Token::ALL.iter().map(|t| t.symbol().to_string()).collect(),
            initial_reels: INITIAL_REELS.iter().map(|s| s.name().to_string()).collect(),
            min_bet: self.settings.limits.min,
            max_bet: self.settings.limits.max,
            bet_step: self.settings.limits.step,
            cooldown_ms: self.settings.cooldown.as_millis() as u64,
            house_address: self.house_address.to_string(),
            win_multiplier: paytable.max_multiplier(),
        })
    }

    fn wallet_info(&self, session: &Session) -> WalletInfo {
        WalletInfo {
            connected: session.address.is_some(),
            address: session.address.map(|a| a.to_string()),
            balance: session.balance,
            provider: self.player.as_ref().map(|p| p.name().to_string()),
        }
    }

    pub async fn wallet(&self) -> WalletInfo {
        let session = self.session.lock().await;
        self.wallet_info(&session)
    }

    pub async fn state(&self) -> SessionState {
        let session = self.session.lock().await;
        SessionState {
            wallet: self.wallet_info(&session),
            reels: session.reels.iter().map(|s| s.name().to_string()).collect(),
        }
    }

    /// A failed read shows as zero, the same as an empty account.
    async fn read_balance(&self, address: &Pubkey) -> f64 {
        match self.ledger.balance(address).await {
            Ok(lamports) => lamports_to_sol(lamports),
            Err(e) => {
                warn!(%address, error = %e, "balance read failed");
                0.0
            }
        }
    }

    /// Silent start-up connect; only succeeds for a wallet that already
    /// trusts this app.
    pub async fn auto_connect(&self) -> bool {
        let Some(player) = &self.player else {
            return false;
        };
        let mut session = self.session.lock().await;
        match player.connect(true).await {
            Ok(address) => {
                session.balance = self.read_balance(&address).await;
                session.address = Some(address);
                info!(%address, balance = session.balance, "wallet auto-connected");
                true
            }
            Err(e) => {
                debug!(error = %e, "wallet not connected");
                false
            }
        }
    }

    pub async fn connect(&self) -> Result<ConnectResponse, GameError> {
        let player = self.player.as_ref().ok_or(GameError::NoProvider)?;
        let mut session = self.session.lock().await;
        let address = player.connect(false).await.map_err(|e| {
            error!(error = %e, "error connecting wallet");
            GameError::Connect(e)
        })?;
        let balance = self.read_balance(&address).await;
        session.address = Some(address);
        session.balance = balance;
        Ok(ConnectResponse {
            wallet: self.wallet_info(&session),
            notification: Notification::info(
                "Wallet Connected",
                format!("Successfully connected with balance: {balance:.4} SOL"),
            ),
        })
    }

    pub async fn disconnect(&self) -> Result<WalletInfo, GameError> {
        let mut session = self.session.lock().await;
        if let Some(player) = &self.player {
            player.disconnect().await.map_err(GameError::Connect)?;
        }
        session.address = None;
        session.balance = 0.0;
        Ok(self.wallet_info(&session))
    }

    async fn pay_out(&self, to: &Pubkey, amount: f64) -> Result<Signature, ChainError> {
        let house = self.house.as_ref().ok_or(ChainError::WalletNotConnected)?;
        send_transfer(self.ledger.as_ref(), house.as_ref(), to, amount, &self.settings.poll).await
    }

    fn engine_params(&self, paytable_json: &str) -> EngineParams {
        let paytable: Vec<PaytableEntry> = serde_json::from_str(paytable_json)
            .unwrap_or_else(|e| {
                warn!(error = %e, "stored paytable unreadable, using default");
                Paytable::default().0
            });
        EngineParams {
            reels: self.settings.reels.clone(),
            paytable: Paytable(paytable),
        }
    }

    pub async fn spin(&self, req: SpinRequest) -> Result<SpinResponse, GameError> {
        let mut session = self.session.lock().await;

        let player = self.player.as_ref().ok_or(GameError::NotConnected)?;
        let address = session
            .address
            .filter(|_| player.is_connected())
            .ok_or(GameError::NotConnected)?;

        let token: Token = req.token.parse()?;
        let bet = BetAmount::parse(&req.bet, &self.settings.limits)?;
        if bet.value() > session.balance {
            return Err(GameError::InsufficientBalance {
                bet: bet.value(),
                balance: session.balance,
            });
        }
        session
            .cooldown
            .try_start(Instant::now())
            .map_err(GameError::CoolingDown)?;

        let params = match db::advance_nonce(&self.db).await {
            Ok(p) => p,
            Err(e) => {
                session.cooldown.reset();
                return Err(e.into());
            }
        };

        let bet_signature = match send_transfer(
            self.ledger.as_ref(),
            player.as_ref(),
            &self.house_address,
            bet.value(),
            &self.settings.poll,
        )
        .await
        {
            Ok(sig) => sig,
            Err(e) => {
                error!(error = %e, "error during spin");
                session.cooldown.reset();
                return Err(GameError::BetTransfer(e));
            }
        };

        let client_seed = req
            .client_seed
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(generate_seed);
        let nonce = params.nonce as u64;
        let engine = self.engine_params(&params.paytable_json);
        let outcome = spin_with_seeds(&params.server_seed, &client_seed, nonce, &engine, bet.value());
        session.reels = outcome.center_line().to_vec();

        let mut notifications = Vec::new();
        let mut payout_signature = None;
        if outcome.is_win() {
            match self.pay_out(&address, outcome.payout).await {
                Ok(sig) => {
                    let sig_text = sig.to_string();
                    notifications.push(Notification::info(
                        "Payout Successful!",
                        format!(
                            "You won {} {token}! Transaction: {}...",
                            outcome.payout,
                            &sig_text[..8.min(sig_text.len())]
                        ),
                    ));
                    payout_signature = Some(sig);
                }
                Err(e) => {
                    error!(error = %e, payout = outcome.payout, "payout failed");
                    notifications.push(Notification::error(
                        "Payout Failed",
                        "Unable to process payout. Please try again.",
                    ));
                }
            }
        } else {
            notifications.push(Notification::info(
                "Better luck next time!",
                "Try again for a chance to win big!",
            ));
        }

        let bet_sig_text = bet_signature.to_string();
        let payout_sig_text = payout_signature.map(|s| s.to_string());
        let indices = outcome.indices();
        if let Err(e) = db::record_spin(
            &self.db,
            &NewSpin {
                wallet: &address.to_string(),
                client_seed: &client_seed,
                nonce: params.nonce,
                server_seed_hash: &params.server_seed_hash,
                reels: &indices,
                bet: bet.value(),
                payout: outcome.payout,
                bet_signature: &bet_sig_text,
                payout_signature: payout_sig_text.as_deref(),
            },
        )
        .await
        {
            error!(error = %e, nonce, "failed to record spin");
        }

        let previous = sol_to_lamports(session.balance).ok();
        if let Some(lamports) =
            refresh_balance(self.ledger.as_ref(), &address, previous, &self.settings.poll).await
        {
            session.balance = lamports_to_sol(lamports);
        }

        info!(
            %address,
            nonce,
            bet = bet.value(),
            payout = outcome.payout,
            reels = ?session.reels,
            "spin settled"
        );

        Ok(SpinResponse {
            server_seed_hash: params.server_seed_hash,
            client_seed,
            nonce,
            reels: session.reels.iter().map(|s| s.name().to_string()).collect(),
            bet: bet.value(),
            payout: outcome.payout,
            bet_signature: bet_sig_text,
            payout_signature: payout_sig_text,
            balance: session.balance,
            notifications,
        })
    }
}
