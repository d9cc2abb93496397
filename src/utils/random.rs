//! Random test data.
//!
//! [`Randomizer`] owns one generator behind a mutex so a seed reset never
//! interleaves with a draw on another thread.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ALPHA_LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const ALPHA_UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const NUMERIC: &str = "0123456789";

#[derive(Debug)]
pub struct Randomizer {
    rng: Mutex<StdRng>,
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic generator, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset_seed(&self) {
        *self.rng() = StdRng::from_os_rng();
    }

    /// Uniform integer in `min..=max`. The bounds are swapped when reversed.
    pub fn number_in_range(&self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.rng().random_range(low..=high)
    }

    /// `length` characters drawn from `charset`. Empty when `charset` is.
    pub fn string(&self, length: usize, charset: &str) -> String {
        let chars: Vec<char> = charset.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        let mut rng = self.rng();
        (0..length)
            .map(|_| chars[rng.random_range(0..chars.len())])
            .collect()
    }

    /// Digits only, `length` long.
    pub fn digits(&self, length: usize) -> String {
        self.string(length, NUMERIC)
    }

    /// Uppercase name of 6 to 11 letters.
    pub fn name(&self) -> String {
        let length = self.rng().random_range(6..12);
        self.string(length, ALPHA_UPPERCASE)
    }
}

/// 32 hex characters, unique per call.
pub fn random_user_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
