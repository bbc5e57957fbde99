use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use tracing::debug;

use crate::error::{ChainError, ChainResult};
use crate::ledger::{Ledger, SignatureStatus};

pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// A real cluster reached through `solana-client`.
pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_commitment(url, CommitmentConfig::confirmed())
    }

    pub fn with_commitment(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

fn rpc_err(e: solana_client::client_error::ClientError) -> ChainError {
    ChainError::Rpc(e.to_string())
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn balance(&self, owner: &Pubkey) -> ChainResult<u64> {
        self.client.get_balance(owner).await.map_err(rpc_err)
    }

    async fn latest_blockhash(&self) -> ChainResult<Hash> {
        self.client.get_latest_blockhash().await.map_err(rpc_err)
    }

    async fn submit(&self, tx: &Transaction) -> ChainResult<Signature> {
        let signature = self.client.send_transaction(tx).await.map_err(rpc_err)?;
        debug!(%signature, "transaction sent");
        Ok(signature)
    }

    async fn signature_status(&self, signature: &Signature) -> ChainResult<SignatureStatus> {
        let status = self
            .client
            .get_signature_status(signature)
            .await
            .map_err(rpc_err)?;
        Ok(match status {
            None => SignatureStatus::Pending,
            Some(Ok(())) => SignatureStatus::Confirmed,
            Some(Err(e)) => SignatureStatus::Failed(e.to_string()),
        })
    }
}
