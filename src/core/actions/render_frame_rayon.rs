use rayon::prelude::*;

use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer};
use crate::core::data::point::Point;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::mandelbrot::algorithm::evaluate;
use crate::core::fractals::mandelbrot::params::FractalParams;

/// Renders the whole viewport in one pass on rayon's pool, without tiles.
///
/// Serves as the reference image the tiled pipeline must reproduce, and as
/// the baseline in benchmarks.
#[must_use]
pub fn render_frame_rayon(viewport: Viewport, params: &FractalParams) -> PixelBuffer {
    let row_bytes = viewport.width as usize * BYTES_PER_PIXEL;
    let mut buffer = PixelBuffer::new(viewport.width, viewport.height);

    if row_bytes == 0 {
        return buffer;
    }

    buffer
        .data_mut()
        .par_chunks_exact_mut(row_bytes)
        .zip(0..viewport.height)
        .for_each(|(row, y)| {
            for (x, pixel) in (0..viewport.width).zip(row.chunks_exact_mut(BYTES_PER_PIXEL)) {
                let point = Point { x, y };
                pixel.copy_from_slice(&evaluate(point, viewport, params).to_bytes());
            }
        });

    buffer
}
