use crate::controllers::ports::surface::{Surface, SurfaceError, check_block};
use crate::core::data::colour::Rgba;
use crate::core::data::pixel_buffer::BYTES_PER_PIXEL;
use rayon::prelude::*;

/// Blocks with fewer rows than this are copied on the calling thread.
const PARALLEL_BLIT_MIN_ROWS: u32 = 64;

/// In-memory surface holding row-major RGBA bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaSurface {
    /// Opaque black surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: Rgba::BLACK
                .to_bytes()
                .repeat(width as usize * height as usize),
        }
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let index = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let p = &self.pixels[index..index + BYTES_PER_PIXEL];

        Some(Rgba {
            r: p[0],
            g: p[1],
            b: p[2],
            a: p[3],
        })
    }
}

impl Default for RgbaSurface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Surface for RgbaSurface {
    fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn write_block(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), SurfaceError> {
        check_block(self.width, self.height, x, y, width, height, rgba)?;

        if width == 0 || height == 0 {
            return Ok(());
        }

        let surface_row = self.width as usize * BYTES_PER_PIXEL;
        let block_row = width as usize * BYTES_PER_PIXEL;
        let offset = x as usize * BYTES_PER_PIXEL;

        let copy_row = |(dst, src): (&mut [u8], &[u8])| {
            dst[offset..offset + block_row].copy_from_slice(src);
        };

        if height < PARALLEL_BLIT_MIN_ROWS {
            self.pixels
                .chunks_exact_mut(surface_row)
                .skip(y as usize)
                .take(height as usize)
                .zip(rgba.chunks_exact(block_row))
                .for_each(copy_row);
        } else {
            self.pixels
                .par_chunks_exact_mut(surface_row)
                .skip(y as usize)
                .take(height as usize)
                .zip(rgba.par_chunks_exact(block_row))
                .for_each(copy_row);
        }

        Ok(())
    }
}
