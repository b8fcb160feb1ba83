use crate::core::actions::cancellation::{CancelToken, Cancelled};
use crate::core::data::job::Job;
use crate::core::data::pixel_buffer::PixelBuffer;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderTileError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("tile computation failed: {0}")]
    Failed(String),
}

/// Computes the pixels of one tile. Runs on worker threads.
pub trait TileRenderer: Send + Sync {
    fn render(&self, job: &Job, cancel: &dyn CancelToken) -> Result<PixelBuffer, RenderTileError>;
}
