use crate::core::data::generation::{Generation, GenerationCounter};
use crate::core::data::viewport::Viewport;
use log::info;
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ViewportChange {
    pub viewport: Viewport,
    pub generation: Generation,
}

/// Remembers the last observed surface size and starts a new generation
/// whenever it changes.
#[derive(Debug)]
pub struct ViewportTracker {
    viewport: Viewport,
    counter: Arc<GenerationCounter>,
}

impl ViewportTracker {
    /// Starts at 0x0, so the first real size always counts as a change.
    #[must_use]
    pub fn new(counter: Arc<GenerationCounter>) -> Self {
        Self {
            viewport: Viewport::default(),
            counter,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn on_resize(&mut self, width: u32, height: u32) -> Option<ViewportChange> {
        let viewport = Viewport::new(width, height);

        if viewport == self.viewport {
            return None;
        }

        self.viewport = viewport;
        let generation = self.counter.advance();

        info!("viewport is now {width}x{height}, {generation}");

        Some(ViewportChange {
            viewport,
            generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_advances_generation() {
        let counter = Arc::new(GenerationCounter::new());
        let mut tracker = ViewportTracker::new(Arc::clone(&counter));

        let change = tracker.on_resize(800, 600).unwrap();

        assert_eq!(change.viewport, Viewport::new(800, 600));
        assert_eq!(change.generation, Generation(1));
        assert_eq!(counter.current(), Generation(1));
        assert_eq!(tracker.viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn test_same_size_is_noop() {
        let counter = Arc::new(GenerationCounter::new());
        let mut tracker = ViewportTracker::new(Arc::clone(&counter));
        tracker.on_resize(800, 600);

        assert_eq!(tracker.on_resize(800, 600), None);
        assert_eq!(counter.current(), Generation(1));
    }

    #[test]
    fn test_each_change_gets_a_newer_generation() {
        let mut tracker = ViewportTracker::new(Arc::new(GenerationCounter::new()));

        let first = tracker.on_resize(800, 600).unwrap().generation;
        let second = tracker.on_resize(1024, 600).unwrap().generation;
        let third = tracker.on_resize(0, 600).unwrap().generation;

        assert!(first < second && second < third);
    }
}
