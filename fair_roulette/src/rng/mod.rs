//! Provably fair outcome generation.
//!
//! Each draw hashes `"{server_seed}-{client_seed}-{nonce}"` with SHA-256,
//! reads the first four digest bytes as a big-endian `u32` and reduces it
//! modulo 37. The nonce then advances by one.
//!
//! Before play the operator publishes [`ProvablyFairRng::server_seed_hash`].
//! On [`ProvablyFairRng::reset`] the retired seed is revealed so that anyone
//! can recompute past outcomes with [`verify_draw`]. The modulo reduction
//! carries a small bias toward 0..=6 (2^32 mod 37 = 7), which is accepted.
//!
//! ## Example
//!
//! ```
//! use fair_roulette::rng::{ProvablyFairRng, verify_draw};
//!
//! let mut rng = ProvablyFairRng::new();
//! let commitment = rng.server_seed_hash();
//!
//! let outcome = rng.draw("my-seed");
//! let reveal = rng.reset();
//!
//! assert_eq!(reveal.server_seed_hash, commitment);
//! assert_eq!(verify_draw(&reveal.server_seed, "my-seed", 0), outcome);
//! ```

use crate::game::entities::Number;
use crate::game::wheel::POCKETS;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Client seed used when the player does not supply one.
pub const DEFAULT_CLIENT_SEED: &str = "default";

/// Length in bytes of a freshly generated server seed.
pub const SEED_BYTES: usize = 32;

/// Generate a fresh, hex-encoded server seed from the thread-local CSPRNG.
pub fn generate_seed() -> String {
    let bytes: [u8; SEED_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Hex-encoded SHA-256 of a server seed, the public commitment.
pub fn hash_seed(server_seed: &str) -> String {
    hex::encode(Sha256::digest(server_seed.as_bytes()))
}

/// Recompute the outcome for a `(server_seed, client_seed, nonce)` triple.
pub fn verify_draw(server_seed: &str, client_seed: &str, nonce: u64) -> Number {
    let message = format!("{server_seed}-{client_seed}-{nonce}");
    let digest = Sha256::digest(message.as_bytes());
    let value = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    // Always below 37.
    (value % POCKETS) as Number
}

/// Everything a player needs to check one draw once the seed is revealed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawProof {
    pub outcome: Number,
    pub client_seed: String,
    pub nonce: u64,
    pub server_seed_hash: String,
}

impl DrawProof {
    /// Check this proof against a revealed server seed.
    pub fn verify(&self, server_seed: &str) -> bool {
        hash_seed(server_seed) == self.server_seed_hash
            && verify_draw(server_seed, &self.client_seed, self.nonce) == self.outcome
    }
}

/// A retired server seed, disclosed on reset.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReveal {
    pub server_seed: String,
    pub server_seed_hash: String,
    /// Nonce the seed had reached, i.e. the number of draws made with it.
    pub final_nonce: u64,
}

/// Seeded, nonce-driven outcome generator.
///
/// Not internally synchronized; the owner decides how draws are serialized.
pub struct ProvablyFairRng {
    server_seed: String,
    server_seed_hash: String,
    nonce: u64,
}

impl ProvablyFairRng {
    /// Create a generator with a fresh random seed and nonce 0.
    pub fn new() -> Self {
        Self::with_seed(generate_seed())
    }

    /// Create a generator with a known seed, for replay and tests.
    pub fn with_seed(server_seed: impl Into<String>) -> Self {
        let server_seed = server_seed.into();
        Self {
            server_seed_hash: hash_seed(&server_seed),
            server_seed,
            nonce: 0,
        }
    }

    /// Draw the next outcome and advance the nonce.
    pub fn draw(&mut self, client_seed: &str) -> Number {
        self.draw_with_proof(client_seed).outcome
    }

    /// Draw the next outcome, returning the inputs that produced it.
    pub fn draw_with_proof(&mut self, client_seed: &str) -> DrawProof {
        let nonce = self.nonce;
        let outcome = verify_draw(&self.server_seed, client_seed, nonce);
        self.nonce += 1;

        DrawProof {
            outcome,
            client_seed: client_seed.to_string(),
            nonce,
            server_seed_hash: self.server_seed_hash.clone(),
        }
    }

    /// Nonce the next draw will use.
    pub fn current_nonce(&self) -> u64 {
        self.nonce
    }

    /// Public commitment to the current seed.
    pub fn server_seed_hash(&self) -> String {
        self.server_seed_hash.clone()
    }

    /// Retire the current seed for a fresh random one.
    pub fn reset(&mut self) -> SeedReveal {
        self.reseed(generate_seed())
    }

    /// Retire the current seed for `server_seed`.
    pub fn reseed(&mut self, server_seed: impl Into<String>) -> SeedReveal {
        let retired = std::mem::replace(self, Self::with_seed(server_seed));
        SeedReveal {
            server_seed: retired.server_seed,
            server_seed_hash: retired.server_seed_hash,
            final_nonce: retired.nonce,
        }
    }
}

impl Default for ProvablyFairRng {
    fn default() -> Self {
        Self::new()
    }
}

// The seed stays out of Debug output so it cannot leak through logs.
impl fmt::Debug for ProvablyFairRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvablyFairRng")
            .field("server_seed_hash", &self.server_seed_hash)
            .field("nonce", &self.nonce)
            .finish_non_exhaustive()
    }
}
