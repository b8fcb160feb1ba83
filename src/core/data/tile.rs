use crate::core::data::generation::Generation;
use serde::{Deserialize, Serialize};

/// A rectangular region of the surface, computed as one unit of work.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub origin_x: u32,
    pub origin_y: u32,
    pub width: u32,
    pub height: u32,
    pub generation: Generation,
}

impl Tile {
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Distance squared from the tile centre to `(x, y)`, used for centre-out ordering.
    #[must_use]
    pub fn centre_distance_squared(&self, x: f64, y: f64) -> f64 {
        let centre_x = self.origin_x as f64 + self.width as f64 / 2.0;
        let centre_y = self.origin_y as f64 + self.height as f64 / 2.0;

        (centre_x - x).powi(2) + (centre_y - y).powi(2)
    }
}
