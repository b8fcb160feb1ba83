//! Render settings loaded from TOML, with every field optional.

use crate::controllers::session::SessionConfig;
use crate::controllers::worker_pool::coordinator::PoolConfig;
use crate::core::data::colour::{ParseRgbaError, Rgba};
use crate::core::data::complex::Complex;
use crate::core::fractals::mandelbrot::palette::{DEFAULT_COLOUR_DISTANCE, Palette};
use crate::core::fractals::mandelbrot::params::{
    DEFAULT_CENTER, DEFAULT_MAX_ITERATIONS, DEFAULT_SCALE, FractalParams, FractalParamsError,
};
use crate::core::util::available_parallelism::available_workers;
use crate::core::util::partition::{TileOrder, TileSizePolicy};
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("colour_distance must be a positive finite number, got {0}")]
    ColourDistance(f64),
    #[error(transparent)]
    Params(#[from] FractalParamsError),
    #[error("invalid placeholder colour: {0}")]
    Placeholder(#[from] ParseRgbaError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    #[default]
    Sinusoidal,
    Fire,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub tile_edge: u32,
    /// Render in full-width bands instead of square tiles.
    pub bands: Option<u32>,
    pub center_out: bool,
    /// Defaults to the machine's available parallelism.
    pub workers: Option<usize>,
    pub max_iterations: u32,
    pub center_re: f64,
    pub center_im: f64,
    /// Complex-plane distance covered by one pixel.
    pub scale: f64,
    pub palette: PaletteKind,
    pub colour_distance: f64,
    pub placeholder: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            tile_edge: 128,
            bands: None,
            center_out: false,
            workers: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            center_re: DEFAULT_CENTER.real,
            center_im: DEFAULT_CENTER.imag,
            scale: DEFAULT_SCALE,
            palette: PaletteKind::default(),
            colour_distance: DEFAULT_COLOUR_DISTANCE,
            placeholder: "#404040ff".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    pub fn palette(&self) -> Result<Palette, ConfigError> {
        match self.palette {
            PaletteKind::Fire => Ok(Palette::Fire),
            PaletteKind::Sinusoidal => {
                if !self.colour_distance.is_finite() || self.colour_distance <= 0.0 {
                    return Err(ConfigError::ColourDistance(self.colour_distance));
                }

                Ok(Palette::Sinusoidal {
                    colour_distance: self.colour_distance,
                })
            }
        }
    }

    pub fn fractal_params(&self) -> Result<FractalParams, ConfigError> {
        Ok(FractalParams::new(
            Complex::new(self.center_re, self.center_im),
            self.scale,
            self.max_iterations,
            self.palette()?,
        )?)
    }

    pub fn tile_policy(&self) -> Result<TileSizePolicy, ConfigError> {
        match self.bands {
            Some(bands) => NonZeroU32::new(bands)
                .map(TileSizePolicy::Bands)
                .ok_or(ConfigError::Zero("bands")),
            None => NonZeroU32::new(self.tile_edge)
                .map(TileSizePolicy::FixedEdge)
                .ok_or(ConfigError::Zero("tile_edge")),
        }
    }

    pub fn pool_config(&self) -> Result<PoolConfig, ConfigError> {
        let pool_size = match self.workers {
            Some(workers) => NonZeroUsize::new(workers).ok_or(ConfigError::Zero("workers"))?,
            None => available_workers(),
        };

        Ok(PoolConfig {
            pool_size,
            placeholder: self.placeholder.parse::<Rgba>()?,
        })
    }

    /// Validates everything and assembles the session settings.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        Ok(SessionConfig {
            policy: self.tile_policy()?,
            order: if self.center_out {
                TileOrder::CenterOut
            } else {
                TileOrder::RowMajor
            },
            pool: self.pool_config()?,
            params: self.fractal_params()?,
        })
    }
}
