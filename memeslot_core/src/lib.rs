pub mod bet;
pub mod cooldown;
pub mod engine;
pub mod paytable;
pub mod rng;
pub mod symbols;
pub mod world;

pub use crate::bet::{BetAmount, BetError, BetLimits, Token};
pub use crate::cooldown::{Cooldown, DEFAULT_COOLDOWN};
pub use crate::engine::{
    compute_reel_window, spin_once, spin_with_seeds, verify_reels, window_indices, EngineParams,
    SpinOutcome,
};
pub use crate::paytable::{Paytable, PaytableEntry};
pub use crate::rng::{derive_floats, derive_hash_hex, generate_seed, ProvablyFairRng};
pub use crate::symbols::{ReelsConfig, Symbol, INITIAL_REELS};
pub use crate::world::{Booth, Direction, HeldKeys, Key, Player, World};
