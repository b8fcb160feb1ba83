use crate::core::data::colour::Rgba;
use crate::core::data::generation::Generation;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer, PixelBufferError};
use crate::core::data::tile::Tile;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::mandelbrot::params::FractalParams;
use serde::{Deserialize, Serialize};

/// One tile of one generation, handed to exactly one worker per attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub tile: Tile,
    pub viewport: Viewport,
    pub generation: Generation,
    pub fractal_params: FractalParams,
}

impl Job {
    #[must_use]
    pub fn new(tile: Tile, viewport: Viewport, fractal_params: FractalParams) -> Self {
        Self {
            tile,
            viewport,
            generation: tile.generation,
            fractal_params,
        }
    }
}

/// Pixels computed for one tile, `width × height × 4` RGBA bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileResult {
    pub tile: Tile,
    pub generation: Generation,
    pub pixels: Vec<u8>,
    /// Placeholder substituted after the tile failed to compute.
    #[serde(default)]
    pub degraded: bool,
}

impl TileResult {
    pub fn from_buffer(tile: Tile, buffer: PixelBuffer) -> Result<Self, PixelBufferError> {
        if buffer.width() != tile.width || buffer.height() != tile.height {
            return Err(PixelBufferError::SizeMismatch {
                width: tile.width,
                height: tile.height,
                expected: tile.pixel_count() * BYTES_PER_PIXEL,
                actual: buffer.buffer().len(),
            });
        }

        Ok(Self {
            tile,
            generation: tile.generation,
            pixels: buffer.into_data(),
            degraded: false,
        })
    }

    #[must_use]
    pub fn placeholder(tile: Tile, colour: Rgba) -> Self {
        Self {
            tile,
            generation: tile.generation,
            pixels: PixelBuffer::filled(tile.width, tile.height, colour).into_data(),
            degraded: true,
        }
    }
}
