//! Main-thread wiring of the render pipeline.
//!
//! resize or new params -> partition -> dispatch -> composite as results land.

use crate::controllers::compositor::FrameCompositor;
use crate::controllers::ports::surface::Surface;
use crate::controllers::viewport_tracker::ViewportTracker;
use crate::controllers::worker_pool::coordinator::{PoolConfig, WorkerPoolCoordinator};
use crate::controllers::worker_pool::errors::WorkerPoolError;
use crate::core::actions::ports::tile_renderer::TileRenderer;
use crate::core::data::generation::{Generation, GenerationCounter};
use crate::core::data::job::Job;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::mandelbrot::params::FractalParams;
use crate::core::util::partition::{TileOrder, TileSizePolicy, partition};
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest single wait inside [`RenderSession::wait_until_complete`].
const WAIT_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionConfig {
    pub policy: TileSizePolicy,
    pub order: TileOrder,
    pub pool: PoolConfig,
    pub params: FractalParams,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderProgress {
    pub generation: Generation,
    pub total: usize,
    pub applied: usize,
    pub degraded: usize,
}

impl RenderProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.applied == self.total
    }
}

pub struct RenderSession<S: Surface> {
    tracker: ViewportTracker,
    counter: Arc<GenerationCounter>,
    policy: TileSizePolicy,
    order: TileOrder,
    params: FractalParams,
    coordinator: WorkerPoolCoordinator,
    compositor: FrameCompositor<S>,
    total_tiles: usize,
}

impl<S: Surface> RenderSession<S> {
    /// Starts the worker pool. Nothing renders until the first [`resize`](Self::resize).
    pub fn new(
        config: SessionConfig,
        surface: S,
        renderer: Arc<dyn TileRenderer>,
    ) -> Result<Self, WorkerPoolError> {
        let counter = Arc::new(GenerationCounter::new());
        let coordinator = WorkerPoolCoordinator::new(config.pool, renderer, Arc::clone(&counter))?;

        Ok(Self {
            tracker: ViewportTracker::new(Arc::clone(&counter)),
            counter,
            policy: config.policy,
            order: config.order,
            params: config.params,
            coordinator,
            compositor: FrameCompositor::new(surface),
            total_tiles: 0,
        })
    }

    /// Re-renders at the new size. Returns `None` if the size did not change.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Option<Generation>, WorkerPoolError> {
        let Some(change) = self.tracker.on_resize(width, height) else {
            return Ok(None);
        };

        self.start(change.viewport, change.generation)?;

        Ok(Some(change.generation))
    }

    /// Re-renders the current viewport with new parameters, e.g. after a pan or zoom.
    pub fn set_params(&mut self, params: FractalParams) -> Result<Generation, WorkerPoolError> {
        self.params = params;
        let generation = self.counter.advance();

        self.start(self.tracker.viewport(), generation)?;

        Ok(generation)
    }

    fn start(&mut self, viewport: Viewport, generation: Generation) -> Result<(), WorkerPoolError> {
        self.coordinator.cancel_stale(generation);
        self.compositor.begin_generation(viewport, generation);

        let tiles = partition(viewport, self.policy, self.order, generation);
        self.total_tiles = tiles.len();

        info!(
            "rendering {}x{} as {} tiles, {generation}",
            viewport.width, viewport.height, self.total_tiles
        );

        let params = self.params;
        self.coordinator
            .dispatch(tiles.into_iter().map(|tile| Job::new(tile, viewport, params)))
    }

    /// Composites every result already received. Never blocks.
    pub fn pump(&mut self) -> Result<usize, WorkerPoolError> {
        self.coordinator.pump(&mut self.compositor)
    }

    pub fn pump_timeout(&mut self, timeout: Duration) -> Result<usize, WorkerPoolError> {
        self.coordinator.pump_timeout(&mut self.compositor, timeout)
    }

    /// Pumps until every tile of the current generation is on the surface.
    /// Returns `false` if `timeout` ran out first.
    pub fn wait_until_complete(&mut self, timeout: Duration) -> Result<bool, WorkerPoolError> {
        let deadline = Instant::now() + timeout;

        while !self.coordinator.is_idle() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }

            self.pump_timeout(remaining.min(WAIT_SLICE))?;
        }

        Ok(true)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.coordinator.is_idle()
    }

    #[must_use]
    pub fn progress(&self) -> RenderProgress {
        RenderProgress {
            generation: self.compositor.generation(),
            total: self.total_tiles,
            applied: self.compositor.applied_tiles(),
            degraded: self.compositor.degraded_tiles(),
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.tracker.viewport()
    }

    #[must_use]
    pub fn params(&self) -> FractalParams {
        self.params
    }

    #[must_use]
    pub fn compositor(&self) -> &FrameCompositor<S> {
        &self.compositor
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.compositor.into_surface()
    }
}
