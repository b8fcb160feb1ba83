use std::num::NonZeroUsize;

/// Worker count matching the machine's parallel execution units, at least one.
#[must_use]
pub fn available_workers() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}
