use crate::core::data::generation::{Generation, GenerationCounter};
use thiserror::Error;

pub const CANCEL_CHECK_INTERVAL_PIXELS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> CancelToken for F
where
    F: Fn() -> bool + Send + Sync,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Cancelled as soon as the shared counter moves past the job's generation.
#[derive(Debug, Clone, Copy)]
pub struct SupersededGeneration<'a> {
    counter: &'a GenerationCounter,
    generation: Generation,
}

impl<'a> SupersededGeneration<'a> {
    #[must_use]
    pub fn new(counter: &'a GenerationCounter, generation: Generation) -> Self {
        Self {
            counter,
            generation,
        }
    }
}

impl CancelToken for SupersededGeneration<'_> {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.counter.current() > self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn never_cancel_always_returns_false() {
        let token = NeverCancel;
        assert!(!token.is_cancelled());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn closure_token_reflects_atomic_state() {
        let flag = AtomicBool::new(false);
        let token = || flag.load(Ordering::Relaxed);

        assert!(!token.is_cancelled());

        flag.store(true, Ordering::Relaxed);
        assert!(token.is_cancelled());
    }

    #[test]
    fn superseded_generation_cancels_after_advance() {
        let counter = GenerationCounter::new();
        let generation = counter.advance();
        let token = SupersededGeneration::new(&counter, generation);

        assert!(!token.is_cancelled());

        counter.advance();
        assert!(token.is_cancelled());
    }
}
