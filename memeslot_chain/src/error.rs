#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("rpc request failed: {0}")]
    Rpc(String),
    #[error("wallet is not connected")]
    WalletNotConnected,
    #[error("wallet has not trusted this app yet")]
    NotTrusted,
    #[error("wallet rejected the request: {0}")]
    Rejected(String),
    #[error("keypair unavailable: {0}")]
    Keypair(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("blockhash not found")]
    BlockhashNotFound,
    #[error("transaction signature verification failed")]
    InvalidSignature,
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
    #[error("transaction {signature} unconfirmed after {attempts} status checks")]
    Unconfirmed { signature: String, attempts: u32 },
}

pub type ChainResult<T> = Result<T, ChainError>;
