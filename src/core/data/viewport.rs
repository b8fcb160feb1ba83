use serde::{Deserialize, Serialize};

/// Size of the drawing surface in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_does_not_overflow_u32() {
        let viewport = Viewport::new(100_000, 100_000);

        assert_eq!(viewport.area(), 10_000_000_000);
    }

    #[test]
    fn test_zero_dimension_is_empty() {
        assert!(Viewport::new(0, 600).is_empty());
        assert!(Viewport::new(800, 0).is_empty());
        assert!(!Viewport::new(1, 1).is_empty());
    }
}
