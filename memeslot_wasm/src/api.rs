//! Thin client for the game server's JSON API.

use memeslot_shared::{ConnectResponse, GameConfig, Notification, SessionState, SpinRequest, SpinResponse, WalletInfo};
use serde::de::DeserializeOwned;

pub fn backend_url() -> &'static str {
    option_env!("BACKEND_URL").unwrap_or("http://127.0.0.1:8080")
}

/// Every failure surfaces as the toast to show.
pub type ApiResult<T> = Result<T, Notification>;

#[derive(Clone, PartialEq)]
pub struct Api {
    base: String,
}

impl Default for Api {
    fn default() -> Self {
        Self::new(backend_url())
    }
}

impl Api {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Result<reqwest::Response>) -> ApiResult<T> {
        let resp = resp.map_err(|_| unreachable_server())?;
        if resp.status().is_success() {
            resp.json::<T>().await.map_err(|_| unreachable_server())
        } else {
            // the server answers failures with the toast itself
            Err(resp
                .json::<Notification>()
                .await
                .unwrap_or_else(|_| unreachable_server()))
        }
    }

    pub async fn config(&self) -> ApiResult<GameConfig> {
        Self::read(reqwest::get(self.url("/config")).await).await
    }

    pub async fn state(&self) -> ApiResult<SessionState> {
        Self::read(reqwest::get(self.url("/state")).await).await
    }

    pub async fn connect(&self) -> ApiResult<ConnectResponse> {
        let client = reqwest::Client::new();
        Self::read(client.post(self.url("/wallet/connect")).send().await).await
    }

    pub async fn disconnect(&self) -> ApiResult<WalletInfo> {
        let client = reqwest::Client::new();
        Self::read(client.post(self.url("/wallet/disconnect")).send().await).await
    }

    pub async fn spin(&self, req: &SpinRequest) -> ApiResult<SpinResponse> {
        let client = reqwest::Client::new();
        Self::read(client.post(self.url("/spin")).json(req).send().await).await
    }
}

fn unreachable_server() -> Notification {
    Notification::error("Server Unreachable", "Could not reach the game server.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slash() {
        let api = Api::new("http://localhost:8080/");
        assert_eq!(api.url("/spin"), "http://localhost:8080/spin");
    }
}
