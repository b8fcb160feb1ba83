pub mod adapters;
pub mod config;
pub mod controllers;
pub mod core;
#[cfg(feature = "gui")]
pub mod input;
pub mod presenters;

pub use config::{ConfigError, PaletteKind, RenderConfig};
pub use controllers::compositor::{ApplyOutcome, FrameCompositor};
pub use controllers::ports::surface::{Surface, SurfaceError};
pub use controllers::ports::tile_sink::TileSink;
pub use controllers::session::{RenderProgress, RenderSession, SessionConfig};
pub use controllers::viewport_tracker::{ViewportChange, ViewportTracker};
pub use controllers::worker_pool::coordinator::{PoolConfig, WorkerPoolCoordinator};
pub use controllers::worker_pool::errors::WorkerPoolError;
pub use controllers::worker_pool::messages::{MainToWorker, WorkerToMain};
pub use crate::core::actions::render_tile::MandelbrotTileRenderer;
#[cfg(feature = "gui")]
pub use input::gui::run_gui;
pub use presenters::file::ppm::write_ppm;
pub use presenters::rgba_surface::RgbaSurface;
