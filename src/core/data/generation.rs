//! Render generations.
//!
//! Every viewport or parameter change starts a new generation. Jobs and
//! results carry the generation that produced them, and anything older than
//! the counter's current value is stale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Monotonic generation counter shared between the coordinating thread and
/// the workers. It can only move forward.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    value: AtomicU64,
}

impl GenerationCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Generation {
        Generation(self.value.load(Ordering::Acquire))
    }

    /// Starts a new generation and returns it.
    pub fn advance(&self) -> Generation {
        Generation(self.value.fetch_add(1, Ordering::AcqRel) + 1)
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }
}
