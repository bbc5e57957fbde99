use chrono::{DateTime, Utc};
use memeslot_core::{derive_hash_hex, generate_seed, Paytable};
use memeslot_shared::{RevealedSeed, SpinLogEntry};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use tracing::info;

// Schema lives in migrations/

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredParams {
    pub server_seed: String,
    pub server_seed_hash: String,
    pub paytable_json: String,
    pub nonce: i64,
}

pub struct NewSpin<'a> {
    pub wallet: &'a str,
    pub client_seed: &'a str,
    pub nonce: i64,
    pub server_seed_hash: &'a str,
    pub reels: &'a [Vec<u8>],
    pub bet: f64,
    pub payout: f64,
    pub bet_signature: &'a str,
    pub payout_signature: Option<&'a str>,
}

pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    Ok(pool)
}

pub async fn init_db(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(db).await?;

    let seed = generate_seed();
    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO params (id, server_seed, server_seed_hash, paytable_json, nonce) VALUES (1, ?, ?, ?, 0)",
    )
    .bind(&seed)
    .bind(derive_hash_hex(seed.as_bytes()))
    .bind(serde_json::to_string(&Paytable::default().0)?)
    .execute(db)
    .await?;
    if inserted.rows_affected() > 0 {
        info!("generated initial server seed");
    }

    // keep the published hash in step with the secret
    let p = get_params(db).await?;
    let hash = derive_hash_hex(p.server_seed.as_bytes());
    if p.server_seed_hash != hash {
        sqlx::query("UPDATE params SET server_seed_hash = ? WHERE id = 1")
            .bind(hash)
            .execute(db)
            .await?;
    }
    Ok(())
}

pub async fn get_params(pool: &SqlitePool) -> Result<StoredParams, sqlx::Error> {
    sqlx::query_as::<_, StoredParams>(
        "SELECT server_seed, server_seed_hash, paytable_json, nonce FROM params WHERE id = 1",
    )
    .fetch_one(pool)
    .await
}

/// Bumps the nonce and returns the params the next spin must use.
pub async fn advance_nonce(pool: &SqlitePool) -> Result<StoredParams, sqlx::Error> {
    sqlx::query_as::<_, StoredParams>(
        "UPDATE params SET nonce = nonce + 1 WHERE id = 1 RETURNING server_seed, server_seed_hash, paytable_json, nonce",
    )
    .fetch_one(pool)
    .await
}

pub async fn set_paytable(pool: &SqlitePool, paytable_json: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE params SET paytable_json = ? WHERE id = 1")
        .bind(paytable_json)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn record_spin(pool: &SqlitePool, spin: &NewSpin<'_>) -> anyhow::Result<i64> {
    let reels_json = serde_json::to_string(spin.reels)?;
    let result = sqlx::query(
        "INSERT INTO spins (ts, wallet, client_seed, nonce, server_seed_hash, result_reels_json, bet, payout, bet_signature, payout_signature) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Utc::now().to_rfc3339())
    .bind(spin.wallet)
    .bind(spin.client_seed)
    .bind(spin.nonce)
    .bind(spin.server_seed_hash)
    .bind(reels_json)
    .bind(spin.bet)
    .bind(spin.payout)
    .bind(spin.bet_signature)
    .bind(spin.payout_signature)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

fn parse_ts(ts: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(ts)?.with_timezone(&Utc))
}

pub async fn recent_spins(pool: &SqlitePool, limit: i64) -> anyhow::Result<Vec<SpinLogEntry>> {
    let rows = sqlx::query(
        "SELECT id, ts, wallet, client_seed, nonce, server_seed_hash, result_reels_json, bet, payout, bet_signature, payout_signature FROM spins ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> anyhow::Result<SpinLogEntry> {
            Ok(SpinLogEntry {
                id: r.get("id"),
                ts: parse_ts(&r.get::<String, _>("ts"))?,
                wallet: r.get("wallet"),
                client_seed: r.get("client_seed"),
                nonce: r.get("nonce"),
                server_seed_hash: r.get("server_seed_hash"),
                result_reels: serde_json::from_str(&r.get::<String, _>("result_reels_json"))?,
                bet: r.get("bet"),
                payout: r.get("payout"),
                bet_signature: r.get("bet_signature"),
                payout_signature: r.get("payout_signature"),
            })
        })
        .collect()
}

pub async fn revealed_seeds(pool: &SqlitePool) -> anyhow::Result<Vec<RevealedSeed>> {
    let rows = sqlx::query(
        "SELECT server_seed, server_seed_hash, retired_at FROM revealed_seeds ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;
    rows.iter()
        .map(|r| -> anyhow::Result<RevealedSeed> {
            Ok(RevealedSeed {
                server_seed: r.get("server_seed"),
                server_seed_hash: r.get("server_seed_hash"),
                retired_at: parse_ts(&r.get::<String, _>("retired_at"))?,
            })
        })
        .collect()
}

#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    // one connection: every connection to :memory: is its own database
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    init_db(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_is_idempotent_and_seeds_params() {
        let pool = memory_pool().await;
        let first = get_params(&pool).await.unwrap();
        init_db(&pool).await.unwrap();
        let second = get_params(&pool).await.unwrap();
        assert_eq!(first.server_seed, second.server_seed);
        assert_eq!(first.server_seed_hash, derive_hash_hex(first.server_seed.as_bytes()));
        assert_eq!(first.nonce, 0);
    }

    #[tokio::test]
    async fn nonce_advances_monotonically() {
        let pool = memory_pool().await;
        assert_eq!(advance_nonce(&pool).await.unwrap().nonce, 1);
        assert_eq!(advance_nonce(&pool).await.unwrap().nonce, 2);
        assert_eq!(get_params(&pool).await.unwrap().nonce, 2);
    }

    #[tokio::test]
    async fn spins_roundtrip_newest_first() {
        let pool = memory_pool().await;
        for nonce in 1..=3 {
            record_spin(
                &pool,
                &NewSpin {
                    wallet: "player",
                    client_seed: "seed",
                    nonce,
                    server_seed_hash: "hash",
                    reels: &[vec![0, 1, 2]],
                    bet: 0.1,
                    payout: 0.0,
                    bet_signature: "sig",
                    payout_signature: None,
                },
            )
            .await
            .unwrap();
        }
        let spins = recent_spins(&pool, 2).await.unwrap();
        assert_eq!(spins.len(), 2);
        assert_eq!(spins[0].nonce, 3);
        assert_eq!(spins[0].result_reels, vec![vec![0, 1, 2]]);
        assert_eq!(spins[1].payout_signature, None);
    }
}
