//! # Provider Rand
//!
//! [`EntropySource`] implementations for **Totem**, backed by [`rand`].

#![deny(rust_2018_idioms, clippy::all, clippy::pedantic)]

use std::sync::Mutex;

use rand::{
    rngs::{OsRng, StdRng},
    RngCore, SeedableRng,
};
use totem_core::provider::{EntropyError, EntropySource};

/// Randomness straight from the operating system. This is the source to use for real secrets.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn random_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        let mut bytes = vec![0; count];
        OsRng.try_fill_bytes(&mut bytes).map_err(EntropyError::new)?;
        Ok(bytes)
    }

    fn is_cryptographically_secure(&self) -> bool {
        true
    }
}

/// Deterministic randomness from a fixed seed, for reproducible output in tests and demos.
///
/// Reports itself as insecure, as anyone knowing the seed can reproduce every secret.
#[derive(Debug)]
pub struct SeededEntropy(Mutex<StdRng>);

impl SeededEntropy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl EntropySource for SeededEntropy {
    fn random_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        let mut rng = self
            .0
            .lock()
            .map_err(|_| EntropyError::new("seeded generator is poisoned"))?;

        let mut bytes = vec![0; count];
        rng.fill_bytes(&mut bytes);
        Ok(bytes)
    }

    fn is_cryptographically_secure(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy() {
        let bytes = OsEntropy.random_bytes(32).unwrap();

        assert_eq!(32, bytes.len());
        assert!(OsEntropy.is_cryptographically_secure());
    }

    #[test]
    fn seeded_is_reproducible() {
        let first = SeededEntropy::new(42).random_bytes(16).unwrap();
        let second = SeededEntropy::new(42).random_bytes(16).unwrap();
        let other = SeededEntropy::new(43).random_bytes(16).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(!SeededEntropy::new(42).is_cryptographically_secure());
    }

    #[test]
    fn seeded_advances() {
        let entropy = SeededEntropy::new(42);
        assert_ne!(
            entropy.random_bytes(16).unwrap(),
            entropy.random_bytes(16).unwrap()
        );
    }
}
