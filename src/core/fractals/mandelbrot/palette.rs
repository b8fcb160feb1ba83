use crate::core::data::colour::Rgba;
use crate::core::fractals::mandelbrot::algorithm::Escape;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

pub const DEFAULT_COLOUR_DISTANCE: f64 = 16.0;

/// Maps an escape outcome to a colour.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Palette {
    /// Three phase-shifted `sin²` waves over the escape iteration.
    #[serde(rename_all = "camelCase")]
    Sinusoidal { colour_distance: f64 },
    /// Black → red → orange → yellow → white over the iteration budget.
    Fire,
}

impl Default for Palette {
    fn default() -> Self {
        Self::Sinusoidal {
            colour_distance: DEFAULT_COLOUR_DISTANCE,
        }
    }
}

impl Palette {
    #[must_use]
    pub fn colour(&self, escape: Escape, max_iterations: u32) -> Rgba {
        let Escape::Escaped(iterations) = escape else {
            return Rgba::BLACK;
        };

        match *self {
            Self::Sinusoidal { colour_distance } => sinusoidal(iterations, colour_distance),
            Self::Fire => fire(iterations, max_iterations),
        }
    }
}

fn sin_squared_channel(phase: f64) -> u8 {
    let s = phase.sin();

    (s * s * 255.0) as u8
}

fn sinusoidal(iterations: u32, colour_distance: f64) -> Rgba {
    let t = iterations as f64 / colour_distance;

    Rgba::opaque(
        sin_squared_channel(t),
        sin_squared_channel(t + FRAC_PI_4),
        sin_squared_channel(t + FRAC_PI_2),
    )
}

fn fire(iterations: u32, max_iterations: u32) -> Rgba {
    if iterations >= max_iterations {
        return Rgba::BLACK;
    }

    let t = iterations as f64 / max_iterations as f64;

    let (r, g, b) = if t < 0.25 {
        let local_t = t / 0.25;
        ((local_t * 255.0) as u8, 0, 0)
    } else if t < 0.5 {
        let local_t = (t - 0.25) / 0.25;
        (255, (local_t * 165.0) as u8, 0)
    } else if t < 0.75 {
        let local_t = (t - 0.5) / 0.25;
        (255, (165.0 + local_t * 90.0) as u8, 0)
    } else {
        let local_t = (t - 0.75) / 0.25;
        (255, 255, (local_t * 255.0) as u8)
    };

    Rgba::opaque(r, g, b)
}
