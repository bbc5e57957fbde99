use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
    transaction::Transaction,
};
use tracing::info;

use crate::error::{ChainError, ChainResult};

/// The browser-wallet surface: connect, disconnect, sign.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &str;

    /// With `only_if_trusted` the wallet connects silently or refuses; it
    /// never prompts.
    async fn connect(&self, only_if_trusted: bool) -> ChainResult<Pubkey>;

    async fn disconnect(&self) -> ChainResult<()>;

    /// Address of the connected account, `None` while disconnected.
    fn public_key(&self) -> Option<Pubkey>;

    fn is_connected(&self) -> bool {
        self.public_key().is_some()
    }

    async fn sign_transaction(&self, tx: Transaction) -> ChainResult<Transaction>;
}

/// Wallet backed by a local keypair, as written by `solana-keygen`.
pub struct KeypairWallet {
    name: String,
    keypair: Keypair,
    trusted: bool,
    connected: AtomicBool,
}

impl KeypairWallet {
    pub fn new(name: impl Into<String>, keypair: Keypair, trusted: bool) -> Self {
        Self {
            name: name.into(),
            keypair,
            trusted,
            connected: AtomicBool::new(false),
        }
    }

    pub fn from_file(name: impl Into<String>, path: impl AsRef<Path>, trusted: bool) -> ChainResult<Self> {
        let path = path.as_ref();
        let keypair = read_keypair_file(path)
            .map_err(|e| ChainError::Keypair(format!("{}: {e}", path.display())))?;
        Ok(Self::new(name, keypair, trusted))
    }

    /// Address regardless of connection state.
    pub fn address(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, only_if_trusted: bool) -> ChainResult<Pubkey> {
        if only_if_trusted && !self.trusted {
            return Err(ChainError::NotTrusted);
        }
        if !self.connected.swap(true, Ordering::AcqRel) {
            info!(wallet = %self.name, address = %self.address(), "wallet connected");
        }
        Ok(self.address())
    }

    async fn disconnect(&self) -> ChainResult<()> {
        if self.connected.swap(false, Ordering::AcqRel) {
            info!(wallet = %self.name, "wallet disconnected");
        }
        Ok(())
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.is_connected().then(|| self.address())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> ChainResult<Transaction> {
        if !self.is_connected() {
            return Err(ChainError::WalletNotConnected);
        }
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| ChainError::Rejected(e.to_string()))?;
        Ok(tx)
    }
}
