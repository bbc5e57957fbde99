use memeslot_core::{generate_seed, spin_once, EngineParams, ProvablyFairRng};

fn main() {
    // Example end-to-end spin with a fresh server seed
    let server_seed = generate_seed();
    let client_seed = "example-client-seed";
    let rng = ProvablyFairRng::new(server_seed, client_seed, 1);
    let outcome = spin_once(&rng, &EngineParams::default(), 0.1);
    let line: Vec<&str> = outcome.center_line().iter().map(|s| s.emoji()).collect();
    println!(
        "server_seed_hash={} reels={} payout={}",
        rng.server_seed_hash_hex(),
        line.join(" "),
        outcome.payout
    );
}
