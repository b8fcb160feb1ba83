use crate::controllers::ports::surface::{Surface, SurfaceError};
use crate::controllers::ports::tile_sink::TileSink;
use crate::core::data::generation::Generation;
use crate::core::data::job::TileResult;
use crate::core::data::tile::Tile;
use crate::core::data::viewport::Viewport;
use log::{trace, warn};
use std::collections::HashSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The tile was already written, nothing changed.
    Duplicate,
    /// The result belongs to an older generation and was dropped.
    Stale,
}

/// Owns the surface and writes finished tiles into it.
///
/// Only results of the generation passed to the last
/// [`begin_generation`](Self::begin_generation) are written, each at most once.
pub struct FrameCompositor<S: Surface> {
    surface: S,
    generation: Generation,
    applied: HashSet<Tile>,
    degraded: usize,
}

impl<S: Surface> FrameCompositor<S> {
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            generation: Generation::default(),
            applied: HashSet::new(),
            degraded: 0,
        }
    }

    /// Switches to `generation`, resizing the surface if the viewport changed.
    pub fn begin_generation(&mut self, viewport: Viewport, generation: Generation) {
        if self.surface.width() != viewport.width || self.surface.height() != viewport.height {
            self.surface.resize(viewport.width, viewport.height);
        }

        self.generation = generation;
        self.applied.clear();
        self.degraded = 0;
    }

    pub fn apply_tile(&mut self, result: &TileResult) -> Result<ApplyOutcome, SurfaceError> {
        if result.generation != self.generation {
            return Ok(ApplyOutcome::Stale);
        }

        if self.applied.contains(&result.tile) {
            return Ok(ApplyOutcome::Duplicate);
        }

        let tile = result.tile;
        self.surface.write_block(
            tile.origin_x,
            tile.origin_y,
            tile.width,
            tile.height,
            &result.pixels,
        )?;

        self.applied.insert(tile);
        if result.degraded {
            self.degraded += 1;
        }

        Ok(ApplyOutcome::Applied)
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn applied_tiles(&self) -> usize {
        self.applied.len()
    }

    #[must_use]
    pub fn degraded_tiles(&self) -> usize {
        self.degraded
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl<S: Surface> TileSink for FrameCompositor<S> {
    fn accept(&mut self, result: TileResult) {
        match self.apply_tile(&result) {
            Ok(ApplyOutcome::Applied) => {}
            Ok(outcome) => trace!("{:?} tile {:?} of {}", outcome, result.tile, result.generation),
            Err(err) => warn!("could not draw tile {:?}: {err}", result.tile),
        }
    }
}
