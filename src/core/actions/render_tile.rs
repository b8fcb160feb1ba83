use crate::core::actions::cancellation::{CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, Cancelled};
use crate::core::actions::ports::tile_renderer::{RenderTileError, TileRenderer};
use crate::core::data::job::Job;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer};
use crate::core::data::point::Point;
use crate::core::fractals::mandelbrot::algorithm::evaluate;

/// Runs the evaluator over every pixel of the job's tile.
///
/// Polls `cancel` at the start of each row and every
/// [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels within a row, returning
/// [`Cancelled`] as soon as the job is no longer wanted.
pub fn render_tile_cancelable<C>(job: &Job, cancel: &C) -> Result<PixelBuffer, Cancelled>
where
    C: CancelToken + ?Sized,
{
    let tile = job.tile;
    let mut buffer = PixelBuffer::new(tile.width, tile.height);

    if tile.width == 0 {
        return Ok(buffer);
    }

    let row_bytes = tile.width as usize * BYTES_PER_PIXEL;

    for (row_data, y) in buffer.data_mut().chunks_exact_mut(row_bytes).zip(tile.origin_y..) {
        let pixels = row_data.chunks_exact_mut(BYTES_PER_PIXEL).zip(tile.origin_x..);

        for (column, (pixel, x)) in pixels.enumerate() {
            if column % CANCEL_CHECK_INTERVAL_PIXELS == 0 && cancel.is_cancelled() {
                return Err(Cancelled);
            }

            let point = Point { x, y };
            let colour = evaluate(point, job.viewport, &job.fractal_params);
            pixel.copy_from_slice(&colour.to_bytes());
        }
    }

    Ok(buffer)
}

/// Escape-time Mandelbrot renderer used by the worker pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandelbrotTileRenderer;

impl TileRenderer for MandelbrotTileRenderer {
    fn render(&self, job: &Job, cancel: &dyn CancelToken) -> Result<PixelBuffer, RenderTileError> {
        Ok(render_tile_cancelable(job, cancel)?)
    }
}
