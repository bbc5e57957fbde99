use memeslot_core::{
    spin_once, spin_with_seeds, verify_reels, EngineParams, ProvablyFairRng, ReelsConfig, Symbol,
};

#[test]
fn rng_repeatable() {
    let rng1 = ProvablyFairRng::new("s", "c", 42);
    let rng2 = ProvablyFairRng::new("s", "c", 42);
    assert_eq!(rng1.next_floats(10), rng2.next_floats(10));
}

#[test]
fn payout_is_zero_or_triple() {
    let params = EngineParams::default();
    for nonce in 0..200u64 {
        let rng = ProvablyFairRng::new("server", "client", nonce);
        let out = spin_once(&rng, &params, 1.0);
        let line = out.center_line();
        if line.iter().all(|s| *s == line[0]) {
            assert_eq!(out.payout, 3.0);
        } else {
            assert_eq!(out.payout, 0.0);
        }
    }
}

#[test]
fn symbols_land_roughly_uniformly() {
    let params = EngineParams::default();
    let mut counts = [0u32; 6];
    for nonce in 0..6000u64 {
        let out = spin_with_seeds("server", "client", nonce, &params, 1.0);
        for sym in out.center_line() {
            counts[sym.to_index() as usize] += 1;
        }
    }
    // 18000 draws, 3000 expected per symbol
    for c in counts {
        assert!((2600..=3400).contains(&c), "skewed counts: {counts:?}");
    }
}

#[test]
fn rtp_simulation_smoke() {
    let params = EngineParams::default();
    let mut total_payout = 0.0;
    let spins = 20_000u64;
    for n in 0..spins {
        let rng = ProvablyFairRng::new("server", "client", n);
        total_payout += spin_once(&rng, &params, 1.0).payout;
    }
    // 6 winning lines out of 216 at 3x -> 1/12
    let rtp = total_payout / spins as f64;
    assert!(rtp > 0.04 && rtp < 0.13, "rtp {rtp}");
}

#[test]
fn verify_accepts_published_and_rejects_tampered() {
    let reels = ReelsConfig::default();
    let out = spin_with_seeds("secret", "mine", 3, &EngineParams::default(), 0.1);
    let published = out.indices();
    assert!(verify_reels("secret", "mine", 3, &reels, &published));

    let mut tampered = published.clone();
    tampered[0][0] = (tampered[0][0] + 1) % Symbol::ALL.len() as u8;
    assert!(!verify_reels("secret", "mine", 3, &reels, &tampered));
    assert!(!verify_reels("other", "mine", 3, &reels, &published));
}
