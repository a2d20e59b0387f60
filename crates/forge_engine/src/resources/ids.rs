//! Resource identifiers and id generation

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Stable 64-bit identifier of a resource
///
/// Consumers hold ids, never pointers: a component stores the id of its mesh
/// and resolves it through the registry on demand, so resource reload or
/// eviction can never leave a dangling reference behind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl ResourceId {
    /// Raw numeric value
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Random 64-bit id generator
///
/// Candidates equal to zero or already known to the caller are rerolled, so
/// a freshly generated id is guaranteed unique against the current meta
/// store at the moment of generation.
pub struct IdGenerator {
    rng: StdRng,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a generator seeded from OS entropy
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator (test support)
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate an id for which `in_use` returns false
    pub fn generate<F: Fn(ResourceId) -> bool>(&mut self, in_use: F) -> ResourceId {
        loop {
            let candidate = ResourceId(self.rng.gen());
            if candidate.0 != 0 && !in_use(candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_never_returns_zero() {
        let mut generator = IdGenerator::from_seed(7);
        for _ in 0..64 {
            assert_ne!(generator.generate(|_| false).raw(), 0);
        }
    }

    #[test]
    fn test_generate_rerolls_on_collision() {
        let mut generator = IdGenerator::from_seed(7);
        let first = generator.generate(|_| false);

        // A generator replaying the same sequence must skip the taken id.
        let mut replay = IdGenerator::from_seed(7);
        let second = replay.generate(|id| id == first);
        assert_ne!(second, first);
    }

    #[test]
    fn test_display_is_decimal() {
        assert_eq!(ResourceId(42).to_string(), "42");
    }
}
