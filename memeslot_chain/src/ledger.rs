use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};

use crate::error::ChainResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    Pending,
    Confirmed,
    Failed(String),
}

/// The slice of a JSON-RPC node the game needs.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Balance in lamports.
    async fn balance(&self, owner: &Pubkey) -> ChainResult<u64>;

    async fn latest_blockhash(&self) -> ChainResult<Hash>;

    /// Submits a signed transaction without waiting for it to land.
    async fn submit(&self, tx: &Transaction) -> ChainResult<Signature>;

    async fn signature_status(&self, signature: &Signature) -> ChainResult<SignatureStatus>;
}
