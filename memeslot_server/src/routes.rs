use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use memeslot_core::{derive_hash_hex, verify_reels, PaytableEntry, ReelsConfig};
use memeslot_shared::{
    AdminSetParamsRequest, ConnectResponse, GameConfig, SessionState, SpinLogEntry, SpinRequest,
    SpinResponse, VerifyRequest, VerifyResponse, VerifyResult, WalletInfo,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::db;
use crate::error::GameError;
use crate::game::SlotMachine;

pub struct AppState {
    pub game: SlotMachine,
    pub api_key: String,
}

type Shared = State<Arc<AppState>>;

const MAX_LOG_LIMIT: i64 = 500;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/config", get(route_config))
        .route("/state", get(route_state))
        .route("/wallet", get(route_wallet))
        .route("/wallet/connect", post(route_connect))
        .route("/wallet/disconnect", post(route_disconnect))
        .route("/spin", post(route_spin))
        .route("/spins", get(route_spins))
        .route("/verify", get(route_verify_info).post(route_verify))
        .route("/admin/set-params", post(route_admin_set_params))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

fn internal(e: impl std::fmt::Display) -> StatusCode {
    error!(error = %e, "request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn route_config(State(state): Shared) -> Result<Json<GameConfig>, GameError> {
    state.game.config().await.map(Json)
}

async fn route_state(State(state): Shared) -> Json<SessionState> {
    Json(state.game.state().await)
}

async fn route_wallet(State(state): Shared) -> Json<WalletInfo> {
    Json(state.game.wallet().await)
}

async fn route_connect(State(state): Shared) -> Result<Json<ConnectResponse>, GameError> {
    state.game.connect().await.map(Json)
}

async fn route_disconnect(State(state): Shared) -> Result<Json<WalletInfo>, GameError> {
    state.game.disconnect().await.map(Json)
}

async fn route_spin(
    State(state): Shared,
    Json(req): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, GameError> {
    state.game.spin(req).await.map(Json)
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    20
}

async fn route_spins(
    State(state): Shared,
    Query(q): Query<LogQuery>,
) -> Result<Json<Vec<SpinLogEntry>>, StatusCode> {
    let limit = q.limit.clamp(1, MAX_LOG_LIMIT);
    db::recent_spins(state.game.db(), limit)
        .await
        .map(Json)
        .map_err(internal)
}

async fn route_verify_info(State(state): Shared) -> Result<Json<VerifyResponse>, StatusCode> {
    let p = db::get_params(state.game.db()).await.map_err(internal)?;
    let revealed_seeds = db::revealed_seeds(state.game.db()).await.map_err(internal)?;
    Ok(Json(VerifyResponse {
        server_seed_hash: p.server_seed_hash,
        nonce: p.nonce as u64,
        revealed_seeds,
    }))
}

async fn route_verify(Json(req): Json<VerifyRequest>) -> Json<VerifyResult> {
    let valid = verify_reels(
        &req.server_seed,
        &req.client_seed,
        req.nonce,
        &ReelsConfig::default(),
        &req.reels,
    );
    Json(VerifyResult {
        valid,
        server_seed_hash: derive_hash_hex(req.server_seed.as_bytes()),
    })
}

async fn route_admin_set_params(
    State(state): Shared,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    Json(req): Json<AdminSetParamsRequest>,
) -> Result<StatusCode, StatusCode> {
    if bearer.token() != state.api_key {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if req.paytable.is_empty()
        || req
            .paytable
            .iter()
            .any(|e| !e.payout_multiplier.is_finite() || e.payout_multiplier < 0.0)
    {
        return Err(StatusCode::BAD_REQUEST);
    }
    let entries: Vec<PaytableEntry> = req
        .paytable
        .into_iter()
        .map(|e| PaytableEntry {
            symbol: e.symbol,
            count: e.count,
            payout_multiplier: e.payout_multiplier,
        })
        .collect();
    let json = serde_json::to_string(&entries).map_err(internal)?;
    db::set_paytable(state.game.db(), &json).await.map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::game::tests::{fast_settings, losing, table};
    use crate::game::GameSettings;

    async fn app_state() -> Arc<AppState> {
        let settings = GameSettings {
            reels: losing(),
            ..fast_settings()
        };
        let t = table(settings, 2, 10).await;
        Arc::new(AppState {
            game: t.game,
            api_key: "secret".into(),
        })
    }

    async fn app() -> Router {
        router(app_state().await)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn spin_without_wallet_is_a_toast() {
        let resp = app()
            .await
            .oneshot(json_request("POST", "/spin", serde_json::json!({ "bet": "0.1" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
        let body = body_json(resp).await;
        assert_eq!(body["title"], "Connect Wallet");
        assert_eq!(body["variant"], "destructive");
    }

    #[tokio::test]
    async fn config_lists_symbols_and_limits() {
        let resp = app()
            .await
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["symbols"].as_array().unwrap().len(), 6);
        assert_eq!(body["tokens"], serde_json::json!(["SOL"]));
        assert_eq!(body["min_bet"], 0.1);
        assert_eq!(body["max_bet"], 1.0);
        assert_eq!(body["win_multiplier"], 3.0);
    }

    #[tokio::test]
    async fn verify_checks_reels() {
        let resp = app()
            .await
            .oneshot(json_request(
                "POST",
                "/verify",
                serde_json::json!({
                    "server_seed": "s",
                    "client_seed": "c",
                    "nonce": 1,
                    "reels": [[9, 9, 9]],
                }),
            ))
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["valid"], false);
        assert_eq!(body["server_seed_hash"], derive_hash_hex(b"s"));
    }

    #[tokio::test]
    async fn admin_requires_key() {
        let req = Request::builder()
            .method("POST")
            .uri("/admin/set-params")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::from(r#"{"paytable":[{"symbol":0,"count":3,"payout_multiplier":5.0}]}"#))
            .unwrap();
        let resp = app().await.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_updates_paytable() {
        let req = Request::builder()
            .method("POST")
            .uri("/admin/set-params")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::from(r#"{"paytable":[{"symbol":0,"count":3,"payout_multiplier":5.0}]}"#))
            .unwrap();
        let state = app_state().await;
        let resp = router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let stored = db::get_params(state.game.db()).await.unwrap();
        let table: Vec<PaytableEntry> = serde_json::from_str(&stored.paytable_json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].payout_multiplier, 5.0);
    }

    #[tokio::test]
    async fn config_follows_admin_paytable() {
        let state = app_state().await;
        let app = router(state.clone());
        let req = Request::builder()
            .method("POST")
            .uri("/admin/set-params")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::from(
                r#"{"paytable":[{"symbol":0,"count":3,"payout_multiplier":5.0}]}"#,
            ))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["win_multiplier"], 5.0);
    }

    #[tokio::test]
    async fn spin_log_after_connect_and_spin() {
        let state = app_state().await;
        let app = router(state.clone());
        let resp = app
            .clone()
            .oneshot(Request::post("/wallet/connect").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["notification"]["title"], "Wallet Connected");

        let resp = app
            .clone()
            .oneshot(json_request("POST", "/spin", serde_json::json!({ "bet": "0.2" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let spin = body_json(resp).await;
        assert_eq!(spin["reels"], serde_json::json!(["doge", "shib", "pepe"]));

        let resp = app
            .oneshot(Request::get("/spins?limit=5").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let log = body_json(resp).await;
        assert_eq!(log.as_array().unwrap().len(), 1);
        assert_eq!(log[0]["nonce"], spin["nonce"]);
    }
}
