//! Solana plumbing for the slot machine: the RPC node behind [`Ledger`], the
//! player's wallet behind [`WalletProvider`], and the transfer/poll helpers
//! the game drives them with.

pub mod error;
pub mod ledger;
pub mod memory;
pub mod poll;
pub mod rpc;
pub mod transfer;
pub mod units;
pub mod wallet;

pub use crate::error::ChainError;
pub use crate::ledger::{Ledger, SignatureStatus};
pub use crate::memory::MemoryLedger;
pub use crate::poll::{refresh_balance, PollPolicy};
pub use crate::rpc::{RpcLedger, DEVNET_URL};
pub use crate::transfer::{confirm, send_transfer, transfer_transaction};
pub use crate::units::{lamports_to_sol, sol_to_lamports, LAMPORTS_PER_SOL};
pub use crate::wallet::{KeypairWallet, WalletProvider};

pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
