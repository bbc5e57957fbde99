use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use memeslot_chain::{lamports_to_sol, Ledger, Pubkey, RpcLedger, DEVNET_URL};
use memeslot_core::{derive_hash_hex, generate_seed, verify_reels, ReelsConfig, Symbol};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memeslot-cli", about = "Admin CLI for the memeslot server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Database URL, default sqlite://memeslot.db
    #[arg(long, value_parser, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long, env = "RPC_URL", default_value = DEVNET_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Retire the server seed (publishing it) and start a new one
    RotateSeed {
        /// New secret; random when omitted
        new_seed: Option<String>,
    },
    /// View last N spins
    ViewLogs {
        #[arg(default_value_t = 20)]
        n: i64,
    },
    /// Export spins to CSV path
    ExportCsv { path: String },
    /// Recompute a logged spin from its seeds
    Verify { spin_id: i64 },
    /// SOL balance of an address
    Balance { address: String },
}

async fn get_pool(url: Option<String>) -> anyhow::Result<SqlitePool> {
    let url = url.unwrap_or_else(|| "sqlite://memeslot.db".into());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .with_context(|| format!("opening {url}"))?;
    Ok(pool)
}

fn reels_display(json: &str) -> String {
    let rows: Vec<Vec<u8>> = serde_json::from_str(json).unwrap_or_default();
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|i| Symbol::from_index(*i).name())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

async fn rotate_seed(pool: &SqlitePool, new_seed: Option<String>) -> anyhow::Result<()> {
    let new_seed = new_seed.unwrap_or_else(generate_seed);
    let hash = derive_hash_hex(new_seed.as_bytes());

    let mut tx = pool.begin().await?;
    let row = sqlx::query("SELECT server_seed, server_seed_hash FROM params WHERE id = 1")
        .fetch_one(&mut *tx)
        .await
        .context("params missing; start the server once to initialise the database")?;
    let old_seed: String = row.get("server_seed");
    let old_hash: String = row.get("server_seed_hash");
    sqlx::query("INSERT INTO revealed_seeds (server_seed, server_seed_hash, retired_at) VALUES (?, ?, ?)")
        .bind(&old_seed)
        .bind(&old_hash)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE params SET server_seed = ?, server_seed_hash = ?, nonce = 0 WHERE id = 1")
        .bind(&new_seed)
        .bind(&hash)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    println!("Revealed previous seed {} (hash {})", old_seed, old_hash);
    println!("Rotated server seed. New hash: {}", hash);
    Ok(())
}

async fn verify_spin(pool: &SqlitePool, spin_id: i64) -> anyhow::Result<()> {
    let spin = sqlx::query(
        "SELECT client_seed, nonce, server_seed_hash, result_reels_json FROM spins WHERE id = ?",
    )
    .bind(spin_id)
    .fetch_optional(pool)
    .await?
    .with_context(|| format!("no spin #{spin_id}"))?;
    let hash: String = spin.get("server_seed_hash");

    // the secret is either retired and published, or still live in params
    let seed: Option<String> = sqlx::query_scalar(
        "SELECT server_seed FROM revealed_seeds WHERE server_seed_hash = ?1 \
         UNION SELECT server_seed FROM params WHERE server_seed_hash = ?1 LIMIT 1",
    )
    .bind(&hash)
    .fetch_optional(pool)
    .await?;
    let Some(seed) = seed else {
        bail!("server seed for hash {hash} not found");
    };

    let reels: Vec<Vec<u8>> = serde_json::from_str(&spin.get::<String, _>("result_reels_json"))?;
    let nonce: i64 = spin.get("nonce");
    let ok = verify_reels(
        &seed,
        &spin.get::<String, _>("client_seed"),
        nonce as u64,
        &ReelsConfig::default(),
        &reels,
    );
    debug!(spin_id, nonce, "verified against seed hash {hash}");
    println!("spin #{spin_id}: {}", if ok { "VALID" } else { "MISMATCH" });
    if !ok {
        bail!("spin #{spin_id} does not match its seeds");
    }
    Ok(())
}

async fn view_logs(pool: &SqlitePool, n: i64) -> anyhow::Result<()> {
    let rows = sqlx::query("SELECT id, ts, wallet, nonce, server_seed_hash, result_reels_json, bet, payout FROM spins ORDER BY id DESC LIMIT ?")
        .bind(n)
        .fetch_all(pool)
        .await?;
    for r in rows {
        let id: i64 = r.get("id");
        let ts: String = r.get("ts");
        let wallet: String = r.get("wallet");
        let nonce: i64 = r.get("nonce");
        let server_seed_hash: String = r.get("server_seed_hash");
        let reels: String = r.get("result_reels_json");
        let bet: f64 = r.get("bet");
        let payout: f64 = r.get("payout");
        println!(
            "#{:>6} {} wallet={} nonce={} hash={} reels={} bet={} payout={}",
            id,
            ts,
            wallet,
            nonce,
            &server_seed_hash[..12.min(server_seed_hash.len())],
            reels_display(&reels),
            bet,
            payout
        );
    }
    Ok(())
}

async fn export_csv(pool: &SqlitePool, path: &str) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "id",
        "ts",
        "wallet",
        "client_seed",
        "nonce",
        "server_seed_hash",
        "result_reels_json",
        "bet",
        "payout",
        "bet_signature",
        "payout_signature",
    ])?;
    let rows = sqlx::query("SELECT id, ts, wallet, client_seed, nonce, server_seed_hash, result_reels_json, bet, payout, bet_signature, payout_signature FROM spins ORDER BY id ASC")
        .fetch_all(pool)
        .await?;
    for r in &rows {
        wtr.write_record(&[
            r.get::<i64, _>("id").to_string(),
            r.get::<String, _>("ts"),
            r.get::<String, _>("wallet"),
            r.get::<String, _>("client_seed"),
            r.get::<i64, _>("nonce").to_string(),
            r.get::<String, _>("server_seed_hash"),
            r.get::<String, _>("result_reels_json"),
            r.get::<f64, _>("bet").to_string(),
            r.get::<f64, _>("payout").to_string(),
            r.get::<String, _>("bet_signature"),
            r.get::<Option<String>, _>("payout_signature").unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    println!("Exported {} rows to {}", rows.len(), path);
    Ok(())
}

async fn balance(rpc_url: String, address: &str) -> anyhow::Result<()> {
    let owner = Pubkey::from_str(address).context("invalid address")?;
    let lamports = RpcLedger::new(rpc_url).balance(&owner).await?;
    println!("{} SOL", lamports_to_sol(lamports));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let cli = Cli::parse();
    let db = cli.database_url;

    match cli.command {
        Commands::RotateSeed { new_seed } => rotate_seed(&get_pool(db).await?, new_seed).await?,
        Commands::ViewLogs { n } => view_logs(&get_pool(db).await?, n).await?,
        Commands::ExportCsv { path } => export_csv(&get_pool(db).await?, &path).await?,
        Commands::Verify { spin_id } => verify_spin(&get_pool(db).await?, spin_id).await?,
        Commands::Balance { address } => balance(cli.rpc_url, &address).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use memeslot_core::{spin_with_seeds, EngineParams};

    async fn memory_db(seed: &str) -> SqlitePool {
        // one connection: every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("../memeslot_server/migrations").run(&pool).await.unwrap();
        sqlx::query("INSERT INTO params (id, server_seed, server_seed_hash, paytable_json, nonce) VALUES (1, ?, ?, '[]', 7)")
            .bind(seed)
            .bind(derive_hash_hex(seed.as_bytes()))
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    async fn log_spin(pool: &SqlitePool, seed: &str, nonce: i64) -> i64 {
        let outcome = spin_with_seeds(seed, "player-seed", nonce as u64, &EngineParams::default(), 0.1);
        sqlx::query("INSERT INTO spins (ts, wallet, client_seed, nonce, server_seed_hash, result_reels_json, bet, payout, bet_signature) VALUES ('2026-01-01T00:00:00Z', 'w', 'player-seed', ?, ?, ?, 0.1, ?, 'sig')")
            .bind(nonce)
            .bind(derive_hash_hex(seed.as_bytes()))
            .bind(serde_json::to_string(&outcome.indices()).unwrap())
            .bind(outcome.payout)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn rotate_reveals_old_seed_and_resets_nonce() {
        let pool = memory_db("old-secret").await;
        rotate_seed(&pool, Some("new-secret".into())).await.unwrap();

        let revealed: (String, String) =
            sqlx::query_as("SELECT server_seed, server_seed_hash FROM revealed_seeds")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(revealed.0, "old-secret");
        assert_eq!(revealed.1, derive_hash_hex(b"old-secret"));

        let (seed, hash, nonce): (String, String, i64) =
            sqlx::query_as("SELECT server_seed, server_seed_hash, nonce FROM params WHERE id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(seed, "new-secret");
        assert_eq!(hash, derive_hash_hex(b"new-secret"));
        assert_eq!(nonce, 0);
    }

    #[tokio::test]
    async fn rotate_generates_a_seed_when_none_given() {
        let pool = memory_db("old-secret").await;
        rotate_seed(&pool, None).await.unwrap();
        let seed: String = sqlx::query_scalar("SELECT server_seed FROM params WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(seed.len(), 64);
    }

    #[tokio::test]
    async fn verifies_spins_from_live_and_revealed_seeds() {
        let pool = memory_db("old-secret").await;
        let live = log_spin(&pool, "old-secret", 1).await;
        verify_spin(&pool, live).await.unwrap();

        rotate_seed(&pool, Some("new-secret".into())).await.unwrap();
        // the old seed now only exists in revealed_seeds
        verify_spin(&pool, live).await.unwrap();
        let fresh = log_spin(&pool, "new-secret", 1).await;
        verify_spin(&pool, fresh).await.unwrap();
    }

    #[tokio::test]
    async fn tampered_reels_fail_verification() {
        let pool = memory_db("secret").await;
        let id = log_spin(&pool, "secret", 3).await;
        let reels: String = sqlx::query_scalar("SELECT result_reels_json FROM spins WHERE id = ?")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        let mut rows: Vec<Vec<u8>> = serde_json::from_str(&reels).unwrap();
        rows[0][0] = (rows[0][0] + 1) % 6;
        sqlx::query("UPDATE spins SET result_reels_json = ? WHERE id = ?")
            .bind(serde_json::to_string(&rows).unwrap())
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(verify_spin(&pool, id).await.is_err());
    }

    #[tokio::test]
    async fn unknown_seed_or_spin_is_an_error() {
        let pool = memory_db("secret").await;
        assert!(verify_spin(&pool, 42).await.is_err());
        let id = log_spin(&pool, "someone-else", 1).await;
        assert!(verify_spin(&pool, id).await.is_err());
    }

    #[test]
    fn reels_render_by_name() {
        assert_eq!(reels_display("[[0,4,5]]"), "doge,rocket,diamond");
        assert_eq!(reels_display("garbage"), "");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["memeslot-cli", "view-logs", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::ViewLogs { n: 5 }));
        let cli = Cli::try_parse_from(["memeslot-cli", "rotate-seed"]).unwrap();
        assert!(matches!(cli.command, Commands::RotateSeed { new_seed: None }));
        let cli = Cli::try_parse_from(["memeslot-cli", "balance", "abc"]).unwrap();
        assert!(matches!(cli.command, Commands::Balance { .. }));
    }
}
