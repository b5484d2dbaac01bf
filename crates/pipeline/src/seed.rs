//! Seed generation
//!
//! Callers that want reproducible output draw a seed here and pass it back
//! in the request. Independent of any request state.

use rand::Rng;

/// Smallest seed handed out
pub const SEED_MIN: i64 = 1;

/// Largest seed handed out
pub const SEED_MAX: i64 = 100_000_000;

/// Fresh uniformly random seed in [SEED_MIN, SEED_MAX]
pub fn generate_seed() -> i64 {
    rand::thread_rng().gen_range(SEED_MIN..=SEED_MAX)
}
