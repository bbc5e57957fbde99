use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use memeslot_chain::ChainError;
use memeslot_core::BetError;
use memeslot_shared::Notification;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("no wallet provider configured")]
    NoProvider,
    #[error("spin cooling down for another {0:?}")]
    CoolingDown(Duration),
    #[error(transparent)]
    Bet(#[from] BetError),
    #[error("bet {bet} exceeds balance {balance}")]
    InsufficientBalance { bet: f64, balance: f64 },
    #[error("wallet connection failed: {0}")]
    Connect(#[source] ChainError),
    #[error("bet transfer failed: {0}")]
    BetTransfer(#[source] ChainError),
    #[error("storage: {0}")]
    Storage(#[from] sqlx::Error),
}

impl GameError {
    pub fn notification(&self) -> Notification {
        match self {
            GameError::NotConnected => {
                Notification::error("Connect Wallet", "Please connect your wallet to play")
            }
            GameError::NoProvider => Notification::error(
                "Wallet not found",
                "Configure a wallet keypair (PLAYER_KEYPAIR) to play",
            ),
            GameError::CoolingDown(left) => Notification::error(
                "Slow down",
                format!("Reels are still spinning, try again in {:.1}s", left.as_secs_f64()),
            ),
            GameError::Bet(e) => Notification::error("Invalid Bet", e.to_string()),
            GameError::InsufficientBalance { .. } => Notification::error(
                "Insufficient Balance",
                "You do not have enough SOL to place this bet",
            ),
            GameError::Connect(_) => Notification::error(
                "Connection Failed",
                "Failed to connect to wallet. Please try again.",
            ),
            GameError::BetTransfer(_) => Notification::error(
                "Transaction Failed",
                "Unable to process bet. Please try again.",
            ),
            GameError::Storage(_) => {
                Notification::error("Server Error", "Something went wrong. Please try again.")
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GameError::NotConnected | GameError::NoProvider => StatusCode::PRECONDITION_FAILED,
            GameError::CoolingDown(_) => StatusCode::TOO_MANY_REQUESTS,
            GameError::Bet(_) => StatusCode::BAD_REQUEST,
            GameError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            GameError::Connect(_) | GameError::BetTransfer(_) => StatusCode::BAD_GATEWAY,
            GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.notification())).into_response()
    }
}
