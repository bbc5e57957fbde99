use crate::error::ChainError;

pub use solana_sdk::native_token::LAMPORTS_PER_SOL;

/// Whole SOL to lamports, rounded to the nearest lamport.
pub fn sol_to_lamports(sol: f64) -> Result<u64, ChainError> {
    if !sol.is_finite() || sol < 0.0 {
        return Err(ChainError::InvalidAmount(sol));
    }
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports > u64::MAX as f64 {
        return Err(ChainError::InvalidAmount(sol));
    }
    Ok(lamports as u64)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
