use crate::core::data::colour::Rgba;
use crate::core::data::complex::Complex;
use crate::core::data::point::Point;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::mandelbrot::params::FractalParams;
use crate::core::util::pixel_to_complex_coords::pixel_to_complex_coords;

/// First iteration at which the orbit is sampled for cycle detection.
const FIRST_ORBIT_CHECKPOINT: u32 = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Escape {
    /// `|z|` exceeded 2 after this many iterations.
    Escaped(u32),
    /// Never escaped within the budget, or fell into a cycle.
    Bounded,
}

/// Escape-time iteration of `z ← z² + c` starting from zero.
///
/// The orbit is saved at checkpoints 8, 16, 32, … and a return to the saved
/// point ends iteration early, since a periodic orbit never escapes.
#[must_use]
pub fn escape_time(c: Complex, max_iterations: u32) -> Escape {
    let mut z = Complex::ZERO;
    let mut saved = z;
    let mut checkpoint = FIRST_ORBIT_CHECKPOINT;

    for iteration in 0..max_iterations {
        if z.magnitude_squared() > 4.0 {
            return Escape::Escaped(iteration);
        }

        z = z.square_add(c);

        if z == saved {
            return Escape::Bounded;
        }

        if iteration + 1 == checkpoint {
            saved = z;
            checkpoint = checkpoint.saturating_mul(2);
        }
    }

    if z.magnitude_squared() > 4.0 {
        Escape::Escaped(max_iterations)
    } else {
        Escape::Bounded
    }
}

/// Colour of one surface pixel. Pure and safe to call from any thread.
#[must_use]
pub fn evaluate(pixel: Point, viewport: Viewport, params: &FractalParams) -> Rgba {
    let c = pixel_to_complex_coords(pixel, viewport, params);
    let escape = escape_time(c, params.max_iterations());

    params.palette().colour(escape, params.max_iterations())
}
