use crate::core::data::complex::Complex;
use crate::core::fractals::mandelbrot::palette::Palette;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_ITERATIONS: u32 = 256;

/// Classic full view of the set on an 800 pixel wide surface.
pub const DEFAULT_CENTER: Complex = Complex::new(-0.75, 0.0);
pub const DEFAULT_SCALE: f64 = 3.5 / 800.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FractalParamsError {
    #[error("maximum iterations must be greater than zero")]
    ZeroMaxIterations,
    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f64),
    #[error("center must be finite, got {real} + {imag}i")]
    InvalidCenter { real: f64, imag: f64 },
}

/// Where the surface looks in the complex plane and how hard to iterate.
///
/// `scale` is the distance in the complex plane covered by one pixel, so the
/// visible region grows with the surface instead of stretching.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FractalParams {
    center: Complex,
    scale: f64,
    max_iterations: u32,
    palette: Palette,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            scale: DEFAULT_SCALE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            palette: Palette::default(),
        }
    }
}

impl FractalParams {
    pub fn new(
        center: Complex,
        scale: f64,
        max_iterations: u32,
        palette: Palette,
    ) -> Result<Self, FractalParamsError> {
        if max_iterations == 0 {
            return Err(FractalParamsError::ZeroMaxIterations);
        }

        if !scale.is_finite() || scale <= 0.0 {
            return Err(FractalParamsError::InvalidScale(scale));
        }

        if !center.is_finite() {
            return Err(FractalParamsError::InvalidCenter {
                real: center.real,
                imag: center.imag,
            });
        }

        Ok(Self {
            center,
            scale,
            max_iterations,
            palette,
        })
    }

    #[must_use]
    pub fn center(&self) -> Complex {
        self.center
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Same view moved so that `center` sits in the middle of the surface.
    pub fn panned_to(&self, center: Complex) -> Result<Self, FractalParamsError> {
        Self::new(center, self.scale, self.max_iterations, self.palette)
    }

    /// Same centre, each pixel covering `1 / factor` of its previous span.
    pub fn zoomed(&self, factor: f64) -> Result<Self, FractalParamsError> {
        Self::new(
            self.center,
            self.scale / factor,
            self.max_iterations,
            self.palette,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_iterations_is_rejected() {
        let result = FractalParams::new(DEFAULT_CENTER, DEFAULT_SCALE, 0, Palette::default());

        assert_eq!(result, Err(FractalParamsError::ZeroMaxIterations));
    }

    #[test]
    fn test_non_positive_scale_is_rejected() {
        for scale in [0.0, -1.0, f64::INFINITY] {
            let result = FractalParams::new(DEFAULT_CENTER, scale, 10, Palette::Fire);

            assert!(matches!(result, Err(FractalParamsError::InvalidScale(_))));
        }
    }

    #[test]
    fn test_nan_center_is_rejected() {
        let result = FractalParams::new(Complex::new(f64::NAN, 0.0), 0.01, 10, Palette::Fire);

        assert!(matches!(
            result,
            Err(FractalParamsError::InvalidCenter { .. })
        ));
    }

    #[test]
    fn test_zoom_divides_scale() {
        let params = FractalParams::default().zoomed(2.0).unwrap();

        assert_eq!(params.scale(), DEFAULT_SCALE / 2.0);
        assert_eq!(params.center(), DEFAULT_CENTER);
    }

    #[test]
    fn test_zoom_by_zero_is_rejected() {
        assert!(FractalParams::default().zoomed(0.0).is_err());
    }

    #[test]
    fn test_pan_keeps_scale_and_iterations() {
        let target = Complex::new(0.25, 0.5);
        let params = FractalParams::default().panned_to(target).unwrap();

        assert_eq!(params.center(), target);
        assert_eq!(params.scale(), DEFAULT_SCALE);
        assert_eq!(params.max_iterations(), DEFAULT_MAX_ITERATIONS);
    }
}
