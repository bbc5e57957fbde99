use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash, pubkey::Pubkey, signature::Signature, system_instruction::SystemInstruction,
    system_program, transaction::Transaction,
};
use tracing::{debug, warn};

use crate::error::{ChainError, ChainResult};
use crate::ledger::{Ledger, SignatureStatus};

/// How many blockhashes stay valid for new transactions.
const RECENT_BLOCKHASHES: usize = 150;

struct Landed {
    slot: u64,
    pending_reads: u32,
    status: SignatureStatus,
}

#[derive(Default)]
struct State {
    slot: u64,
    balances: HashMap<Pubkey, u64>,
    recent: VecDeque<Hash>,
    statuses: HashMap<Signature, Landed>,
}

impl State {
    /// Starts a new slot. Statuses older than the blockhash window are
    /// forgotten, the way a node only answers for recent signatures.
    fn advance_blockhash(&mut self) -> Hash {
        self.slot += 1;
        let hash = Hash::new_unique();
        self.recent.push_back(hash);
        if self.recent.len() > RECENT_BLOCKHASHES {
            self.recent.pop_front();
        }
        let oldest = self.slot.saturating_sub(RECENT_BLOCKHASHES as u64);
        self.statuses.retain(|_, landed| landed.slot >= oldest);
        hash
    }
}

/// In-process cluster for offline play and tests. Transactions are checked
/// and applied the moment they are submitted; `confirm_after` delays how soon
/// their status reads back as confirmed.
pub struct MemoryLedger {
    state: Mutex<State>,
    fee_per_signature: u64,
    confirm_after: u32,
}

impl MemoryLedger {
    pub fn new() -> Self {
        let mut state = State::default();
        state.advance_blockhash();
        Self {
            state: Mutex::new(state),
            fee_per_signature: 0,
            confirm_after: 0,
        }
    }

    pub fn with_fee(mut self, lamports: u64) -> Self {
        self.fee_per_signature = lamports;
        self
    }

    /// Status reads answered `Pending` before a landed transaction confirms.
    pub fn with_confirm_after(mut self, polls: u32) -> Self {
        self.confirm_after = polls;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // a poisoned map is still consistent: every mutation is a single insert
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn airdrop(&self, to: &Pubkey, lamports: u64) {
        let mut state = self.state();
        let balance = state.balances.entry(*to).or_default();
        *balance = balance.saturating_add(lamports);
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.state().balances.get(owner).copied().unwrap_or(0)
    }

    /// Applies every instruction against a scratch copy so a failing
    /// transaction leaves balances untouched.
    fn execute(
        &self,
        tx: &Transaction,
        balances: &HashMap<Pubkey, u64>,
    ) -> Result<HashMap<Pubkey, u64>, String> {
        let keys = &tx.message.account_keys;
        let mut next = balances.clone();

        let payer = keys.first().ok_or("transaction has no fee payer")?;
        let fee = self.fee_per_signature * tx.signatures.len() as u64;
        let payer_balance = next.entry(*payer).or_default();
        *payer_balance = payer_balance
            .checked_sub(fee)
            .ok_or("insufficient funds for fee")?;

        for ix in &tx.message.instructions {
            let program = keys
                .get(usize::from(ix.program_id_index))
                .ok_or("program index out of range")?;
            if *program != system_program::id() {
                return Err(format!("unsupported program {program}"));
            }
            let instruction: SystemInstruction =
                bincode::deserialize(&ix.data).map_err(|e| format!("invalid instruction: {e}"))?;
            let SystemInstruction::Transfer { lamports } = instruction else {
                return Err("only system transfers are supported".into());
            };
            let account = |pos: usize| -> Result<Pubkey, String> {
                ix.accounts
                    .get(pos)
                    .and_then(|i| keys.get(usize::from(*i)))
                    .copied()
                    .ok_or_else(|| "missing transfer account".to_string())
            };
            let (from, to) = (account(0)?, account(1)?);
            if !tx.message.is_signer(ix.accounts[0].into()) {
                return Err(format!("{from} did not sign"));
            }

            let from_balance = next.entry(from).or_default();
            *from_balance = from_balance
                .checked_sub(lamports)
                .ok_or("insufficient lamports")?;
            let to_balance = next.entry(to).or_default();
            *to_balance = to_balance.saturating_add(lamports);
        }
        Ok(next)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn balance(&self, owner: &Pubkey) -> ChainResult<u64> {
        Ok(self.balance_of(owner))
    }

    async fn latest_blockhash(&self) -> ChainResult<Hash> {
        self.state()
            .recent
            .back()
            .copied()
            .ok_or(ChainError::BlockhashNotFound)
    }

    async fn submit(&self, tx: &Transaction) -> ChainResult<Signature> {
        if tx.verify().is_err() {
            return Err(ChainError::InvalidSignature);
        }
        let signature = *tx.signatures.first().ok_or(ChainError::InvalidSignature)?;

        let mut state = self.state();
        if !state.recent.contains(&tx.message.recent_blockhash) {
            return Err(ChainError::BlockhashNotFound);
        }
        if state.statuses.contains_key(&signature) {
            return Err(ChainError::Rpc("transaction already processed".into()));
        }

        let status = match self.execute(tx, &state.balances) {
            Ok(balances) => {
                state.balances = balances;
                SignatureStatus::Confirmed
            }
            Err(reason) => {
                warn!(%signature, %reason, "transaction failed");
                SignatureStatus::Failed(reason)
            }
        };
        let slot = state.slot;
        state.statuses.insert(
            signature,
            Landed {
                slot,
                pending_reads: self.confirm_after,
                status,
            },
        );
        state.advance_blockhash();
        debug!(%signature, "transaction landed");
        Ok(signature)
    }

    async fn signature_status(&self, signature: &Signature) -> ChainResult<SignatureStatus> {
        let mut state = self.state();
        let Some(landed) = state.statuses.get_mut(signature) else {
            return Ok(SignatureStatus::Pending);
        };
        if landed.pending_reads > 0 {
            landed.pending_reads -= 1;
            return Ok(SignatureStatus::Pending);
        }
        Ok(landed.status.clone())
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::signature::{Keypair, Signer};

    use super::*;
    use crate::transfer::transfer_transaction;

    fn signed_transfer(ledger: &MemoryLedger, from: &Keypair, to: &Pubkey, lamports: u64) -> Transaction {
        let blockhash = ledger.state().recent.back().copied().unwrap();
        let mut tx = transfer_transaction(&from.pubkey(), to, lamports, blockhash);
        tx.sign(&[from], blockhash);
        tx
    }

    #[tokio::test]
    async fn transfer_moves_lamports() {
        let ledger = MemoryLedger::new();
        let alice = Keypair::new();
        let bob = Pubkey::new_unique();
        ledger.airdrop(&alice.pubkey(), 1_000);

        let tx = signed_transfer(&ledger, &alice, &bob, 400);
        let sig = ledger.submit(&tx).await.unwrap();
        assert_eq!(ledger.signature_status(&sig).await.unwrap(), SignatureStatus::Confirmed);
        assert_eq!(ledger.balance(&alice.pubkey()).await.unwrap(), 600);
        assert_eq!(ledger.balance(&bob).await.unwrap(), 400);
    }

    #[tokio::test]
    async fn overdraft_fails_without_side_effects() {
        let ledger = MemoryLedger::new().with_fee(5);
        let alice = Keypair::new();
        ledger.airdrop(&alice.pubkey(), 100);

        let tx = signed_transfer(&ledger, &alice, &Pubkey::new_unique(), 500);
        let sig = ledger.submit(&tx).await.unwrap();
        assert!(matches!(
            ledger.signature_status(&sig).await.unwrap(),
            SignatureStatus::Failed(_)
        ));
        assert_eq!(ledger.balance_of(&alice.pubkey()), 100);
    }

    #[tokio::test]
    async fn fee_is_charged_to_payer() {
        let ledger = MemoryLedger::new().with_fee(5_000);
        let alice = Keypair::new();
        let bob = Pubkey::new_unique();
        ledger.airdrop(&alice.pubkey(), 1_000_000);
        ledger
            .submit(&signed_transfer(&ledger, &alice, &bob, 10_000))
            .await
            .unwrap();
        assert_eq!(ledger.balance_of(&alice.pubkey()), 985_000);
    }

    #[tokio::test]
    async fn rejects_unsigned_and_stale() {
        let ledger = MemoryLedger::new();
        let alice = Keypair::new();
        ledger.airdrop(&alice.pubkey(), 1_000);
        let blockhash = ledger.latest_blockhash().await.unwrap();

        let unsigned = transfer_transaction(&alice.pubkey(), &Pubkey::new_unique(), 1, blockhash);
        assert!(matches!(
            ledger.submit(&unsigned).await,
            Err(ChainError::InvalidSignature)
        ));

        let stale = Hash::new_unique();
        let mut tx = transfer_transaction(&alice.pubkey(), &Pubkey::new_unique(), 1, stale);
        tx.sign(&[&alice], stale);
        assert!(matches!(
            ledger.submit(&tx).await,
            Err(ChainError::BlockhashNotFound)
        ));
    }

    #[tokio::test]
    async fn old_statuses_are_pruned() {
        let ledger = MemoryLedger::new();
        let alice = Keypair::new();
        ledger.airdrop(&alice.pubkey(), 1_000_000);
        let first = ledger
            .submit(&signed_transfer(&ledger, &alice, &Pubkey::new_unique(), 1))
            .await
            .unwrap();
        for _ in 0..RECENT_BLOCKHASHES {
            ledger
                .submit(&signed_transfer(&ledger, &alice, &Pubkey::new_unique(), 1))
                .await
                .unwrap();
        }
        assert_eq!(ledger.state().statuses.len(), RECENT_BLOCKHASHES);
        assert!(!ledger.state().statuses.contains_key(&first));
        assert_eq!(ledger.signature_status(&first).await.unwrap(), SignatureStatus::Pending);
    }

    #[tokio::test]
    async fn confirmation_can_lag() {
        let ledger = MemoryLedger::new().with_confirm_after(2);
        let alice = Keypair::new();
        ledger.airdrop(&alice.pubkey(), 10);
        let sig = ledger
            .submit(&signed_transfer(&ledger, &alice, &Pubkey::new_unique(), 1))
            .await
            .unwrap();
        assert_eq!(ledger.signature_status(&sig).await.unwrap(), SignatureStatus::Pending);
        assert_eq!(ledger.signature_status(&sig).await.unwrap(), SignatureStatus::Pending);
        assert_eq!(ledger.signature_status(&sig).await.unwrap(), SignatureStatus::Confirmed);
    }
}
