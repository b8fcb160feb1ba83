//! Splits a viewport into disjoint tiles.

use crate::core::data::generation::Generation;
use crate::core::data::tile::Tile;
use crate::core::data::viewport::Viewport;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSizePolicy {
    /// Square tiles with this edge length. Right and bottom edge tiles may be smaller.
    FixedEdge(NonZeroU32),
    /// Full-width horizontal bands, at most this many and at most one per row.
    Bands(NonZeroU32),
}

impl Default for TileSizePolicy {
    fn default() -> Self {
        Self::FixedEdge(NonZeroU32::new(128).unwrap_or(NonZeroU32::MIN))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileOrder {
    #[default]
    RowMajor,
    /// Nearest to the surface centre first, so the middle of the image lands first.
    CenterOut,
}

/// Tiles covering `viewport` exactly once. Deterministic for equal inputs.
///
/// A zero-area viewport yields no tiles.
#[must_use]
pub fn partition(
    viewport: Viewport,
    policy: TileSizePolicy,
    order: TileOrder,
    generation: Generation,
) -> Vec<Tile> {
    if viewport.is_empty() {
        return Vec::new();
    }

    let mut tiles = match policy {
        TileSizePolicy::FixedEdge(edge) => grid(viewport, edge.get(), generation),
        TileSizePolicy::Bands(count) => bands(viewport, count, generation),
    };

    if order == TileOrder::CenterOut {
        let centre_x = viewport.width as f64 / 2.0;
        let centre_y = viewport.height as f64 / 2.0;

        // Stable sort keeps row-major order between equidistant tiles.
        tiles.sort_by(|a, b| {
            a.centre_distance_squared(centre_x, centre_y)
                .total_cmp(&b.centre_distance_squared(centre_x, centre_y))
        });
    }

    tiles
}

fn grid(viewport: Viewport, edge: u32, generation: Generation) -> Vec<Tile> {
    let columns = viewport.width.div_ceil(edge);
    let rows = viewport.height.div_ceil(edge);
    let mut tiles = Vec::with_capacity(columns as usize * rows as usize);

    for row in 0..rows {
        let origin_y = row * edge;

        for column in 0..columns {
            let origin_x = column * edge;

            tiles.push(Tile {
                origin_x,
                origin_y,
                width: edge.min(viewport.width - origin_x),
                height: edge.min(viewport.height - origin_y),
                generation,
            });
        }
    }

    tiles
}

/// Number of bands for a raster of `height` rows, never more than one per row.
#[must_use]
pub fn calculate_bands(max_bands: NonZeroU32, height: u32) -> u32 {
    max_bands.get().min(height)
}

fn bands(viewport: Viewport, max_bands: NonZeroU32, generation: Generation) -> Vec<Tile> {
    let count = calculate_bands(max_bands, viewport.height);
    let base = viewport.height / count;
    let remainder = viewport.height % count;
    let mut origin_y = 0;

    (0..count)
        .map(|band| {
            // Spread leftover rows over the first bands.
            let height = base + u32::from(band < remainder);
            let tile = Tile {
                origin_x: 0,
                origin_y,
                width: viewport.width,
                height,
                generation,
            };
            origin_y += height;
            tile
        })
        .collect()
}
