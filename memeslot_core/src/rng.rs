//! Provably-fair randomness. A spin is fully determined by the secret server
//! seed, the player's client seed and the nonce:
//! `HMAC-SHA256(server_seed, "client_seed:nonce")`, read as a stream of
//! floats in `[0, 1)`.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

pub type HmacSha256 = Hmac<Sha256>;

const CHUNK: usize = 4;
const SCALE: f64 = 4_294_967_296.0; // 2^32

/// Lowercase hex SHA-256; the published commitment to a server seed.
pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

/// Big-endian `u32` chunks of a digest mapped onto `[0, 1)`. Once the block
/// runs out it is replaced by its own SHA-256, so the stream never ends.
#[derive(Debug, Clone)]
pub struct Floats {
    block: Vec<u8>,
    pos: usize,
}

impl Floats {
    pub fn new(digest: &[u8]) -> Self {
        Self {
            block: digest.to_vec(),
            pos: 0,
        }
    }
}

impl Iterator for Floats {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.pos + CHUNK > self.block.len() {
            self.block = Sha256::digest(&self.block).to_vec();
            self.pos = 0;
        }
        let mut word = [0u8; CHUNK];
        word.copy_from_slice(&self.block[self.pos..self.pos + CHUNK]);
        self.pos += CHUNK;
        Some(f64::from(u32::from_be_bytes(word)) / SCALE)
    }
}

pub fn derive_floats(digest: &[u8], count: usize) -> Vec<f64> {
    Floats::new(digest).take(count).collect()
}

/// Fresh 32-byte hex seed from the OS RNG.
pub fn generate_seed() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, Clone)]
pub struct ProvablyFairRng {
    /// Kept private to the house until it is rotated out and revealed.
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(self.server_seed.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(self.client_seed.as_bytes());
        mac.update(b":");
        mac.update(self.nonce.to_string().as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    pub fn floats(&self) -> Floats {
        Floats::new(&self.hmac_bytes())
    }

    pub fn next_floats(&self, count: usize) -> Vec<f64> {
        self.floats().take(count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let rng1 = ProvablyFairRng::new("server", "client", 1);
        let rng2 = ProvablyFairRng::new("server", "client", 1);
        assert_eq!(rng1.server_seed_hash_hex(), rng2.server_seed_hash_hex());
        assert_eq!(rng1.hmac_bytes(), rng2.hmac_bytes());
        assert_eq!(rng1.next_floats(5), rng2.next_floats(5));
    }

    #[test]
    fn nonce_changes_stream() {
        let a = ProvablyFairRng::new("server", "client", 1).next_floats(3);
        let b = ProvablyFairRng::new("server", "client", 2).next_floats(3);
        assert_ne!(a, b);
    }

    #[test]
    fn floats_extend_past_one_block() {
        let floats = ProvablyFairRng::new("s", "c", 0).next_floats(20);
        assert_eq!(floats.len(), 20);
        assert!(floats.iter().all(|f| (0.0..1.0).contains(f)));
    }

    #[test]
    fn stream_starts_with_the_digest_words() {
        let digest = [0x80, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(derive_floats(&digest, 2), vec![0.5, 0.0]);
        // third word comes from the re-hashed block
        let rehashed = Sha256::digest(digest);
        let word = u32::from_be_bytes([rehashed[0], rehashed[1], rehashed[2], rehashed[3]]);
        assert_eq!(derive_floats(&digest, 3)[2], f64::from(word) / SCALE);
    }

    #[test]
    fn hmac_keys_on_the_server_seed() {
        let a = ProvablyFairRng::new("server-a", "client", 7).hmac_bytes();
        let b = ProvablyFairRng::new("server-b", "client", 7).hmac_bytes();
        assert_ne!(a, b);
    }

    #[test]
    fn sha256_hash_is_hex() {
        assert_eq!(
            derive_hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn generated_seeds_differ() {
        let a = generate_seed();
        assert_eq!(a.len(), 64);
        assert_ne!(a, generate_seed());
    }
}
