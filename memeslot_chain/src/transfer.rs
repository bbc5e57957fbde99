use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature, system_instruction, transaction::Transaction,
};
use tracing::{debug, info};

use crate::error::{ChainError, ChainResult};
use crate::ledger::{Ledger, SignatureStatus};
use crate::poll::PollPolicy;
use crate::units::sol_to_lamports;
use crate::wallet::WalletProvider;

/// Unsigned single-transfer transaction paid for by the sender.
pub fn transfer_transaction(from: &Pubkey, to: &Pubkey, lamports: u64, blockhash: Hash) -> Transaction {
    let ix = system_instruction::transfer(from, to, lamports);
    let mut tx = Transaction::new_with_payer(&[ix], Some(from));
    tx.message.recent_blockhash = blockhash;
    tx
}

/// Moves `amount` SOL out of the wallet's account and waits for the cluster
/// to confirm it.
pub async fn send_transfer(
    ledger: &dyn Ledger,
    wallet: &dyn WalletProvider,
    to: &Pubkey,
    amount: f64,
    policy: &PollPolicy,
) -> ChainResult<Signature> {
    let from = wallet.public_key().ok_or(ChainError::WalletNotConnected)?;
    let lamports = sol_to_lamports(amount)?;
    let blockhash = ledger.latest_blockhash().await?;

    let tx = wallet
        .sign_transaction(transfer_transaction(&from, to, lamports, blockhash))
        .await?;
    let signature = ledger.submit(&tx).await?;
    debug!(%signature, %from, %to, lamports, "transfer submitted");

    confirm(ledger, &signature, policy).await?;
    info!(%signature, %from, %to, lamports, "transfer confirmed");
    Ok(signature)
}

/// Polls the signature status a fixed number of times.
pub async fn confirm(ledger: &dyn Ledger, signature: &Signature, policy: &PollPolicy) -> ChainResult<()> {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match ledger.signature_status(signature).await? {
            SignatureStatus::Confirmed => return Ok(()),
            SignatureStatus::Failed(reason) => return Err(ChainError::TransactionFailed(reason)),
            SignatureStatus::Pending => {
                if attempt < attempts {
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }
    }
    Err(ChainError::Unconfirmed {
        signature: signature.to_string(),
        attempts,
    })
}
