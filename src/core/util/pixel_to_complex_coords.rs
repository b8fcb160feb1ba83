use crate::core::data::complex::Complex;
use crate::core::data::point::Point;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::mandelbrot::params::FractalParams;

/// Maps the centre of a pixel to the complex plane.
///
/// The surface centre lands on `params.center()`, one pixel spans
/// `params.scale()`, and the imaginary axis points up so rows grow downward.
#[must_use]
pub fn pixel_to_complex_coords(pixel: Point, viewport: Viewport, params: &FractalParams) -> Complex {
    let center = params.center();
    let scale = params.scale();

    let offset_x = f64::from(pixel.x) + 0.5 - f64::from(viewport.width) / 2.0;
    let offset_y = f64::from(pixel.y) + 0.5 - f64::from(viewport.height) / 2.0;

    Complex {
        real: center.real + offset_x * scale,
        imag: center.imag - offset_y * scale,
    }
}
