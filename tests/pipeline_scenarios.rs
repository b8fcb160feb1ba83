//! End-to-end scenarios: session, worker pool and compositor together.

use crossbeam_channel::{Receiver, bounded};
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tile_fractal::core::actions::cancellation::CancelToken;
use tile_fractal::core::actions::ports::tile_renderer::{RenderTileError, TileRenderer};
use tile_fractal::core::actions::render_frame_rayon::render_frame_rayon;
use tile_fractal::core::data::colour::Rgba;
use tile_fractal::core::data::generation::Generation;
use tile_fractal::core::data::job::Job;
use tile_fractal::core::data::pixel_buffer::PixelBuffer;
use tile_fractal::core::data::viewport::Viewport;
use tile_fractal::core::fractals::mandelbrot::params::FractalParams;
use tile_fractal::core::util::partition::{TileOrder, TileSizePolicy};
use tile_fractal::{
    MandelbrotTileRenderer, PoolConfig, RenderSession, RgbaSurface, SessionConfig, Surface,
};

const PLACEHOLDER: Rgba = Rgba::opaque(0x40, 0x40, 0x40);
const TIMEOUT: Duration = Duration::from_secs(60);

fn config(edge: u32, workers: usize) -> SessionConfig {
    SessionConfig {
        policy: TileSizePolicy::FixedEdge(NonZeroU32::new(edge).unwrap()),
        order: TileOrder::RowMajor,
        pool: PoolConfig {
            pool_size: NonZeroUsize::new(workers).unwrap(),
            placeholder: PLACEHOLDER,
        },
        params: FractalParams::default(),
    }
}

fn generation_colour(generation: Generation) -> Rgba {
    Rgba::opaque(generation.get() as u8, 100, 200)
}

/// Paints every tile in a colour derived from its generation. Renders of
/// `held` wait until the gate sender is dropped.
struct GenerationRenderer {
    held: Generation,
    gate: Receiver<()>,
    started: AtomicUsize,
}

impl TileRenderer for GenerationRenderer {
    fn render(&self, job: &Job, _: &dyn CancelToken) -> Result<PixelBuffer, RenderTileError> {
        if job.generation == self.held {
            self.started.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.recv();
        }

        Ok(PixelBuffer::filled(
            job.tile.width,
            job.tile.height,
            generation_colour(job.generation),
        ))
    }
}

/// Real fractal, except for the tile at `origin`, which always fails.
struct BrokenTileRenderer {
    origin: (u32, u32),
    panics: bool,
    attempts: AtomicUsize,
}

impl TileRenderer for BrokenTileRenderer {
    fn render(&self, job: &Job, cancel: &dyn CancelToken) -> Result<PixelBuffer, RenderTileError> {
        if (job.tile.origin_x, job.tile.origin_y) != self.origin {
            return MandelbrotTileRenderer.render(job, cancel);
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.panics {
            panic!("renderer blew up on tile {:?}", self.origin);
        }

        Err(RenderTileError::Failed("worker failure".to_string()))
    }
}

fn wait_for(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + TIMEOUT;

    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_resize_mid_render_keeps_only_new_generation() {
    let (release, gate) = bounded::<()>(0);
    let renderer = Arc::new(GenerationRenderer {
        held: Generation(1),
        gate,
        started: AtomicUsize::new(0),
    });
    let mut session = RenderSession::new(
        config(200, 5),
        RgbaSurface::default(),
        Arc::clone(&renderer) as Arc<dyn TileRenderer>,
    )
    .unwrap();

    let first = session.resize(800, 600).unwrap().unwrap();
    assert_eq!(first, Generation(1));
    assert_eq!(session.progress().total, 12);

    // Five of twelve tiles are now held by the workers, seven are queued.
    wait_for(|| renderer.started.load(Ordering::SeqCst) == 5);

    let second = session.resize(1000, 800).unwrap().unwrap();
    assert!(second > first);

    drop(release);
    assert!(session.wait_until_complete(TIMEOUT).unwrap());

    assert_eq!(renderer.started.load(Ordering::SeqCst), 5);

    let progress = session.progress();
    assert_eq!(progress.generation, second);
    assert_eq!(progress.total, 20);
    assert_eq!(progress.applied, 20);
    assert_eq!(progress.degraded, 0);

    let surface = session.into_surface();
    assert_eq!((surface.width(), surface.height()), (1000, 800));
    let expected = generation_colour(second).to_bytes();
    assert!(surface.pixels().chunks_exact(4).all(|p| p == expected));
}

fn assert_placeholder_only_at_origin_tile(surface: &RgbaSurface, reference: &PixelBuffer) {
    for y in 0..surface.height() {
        for x in 0..surface.width() {
            let expected = if x < 200 && y < 200 {
                Some(PLACEHOLDER)
            } else {
                reference.pixel(x, y)
            };
            assert_eq!(surface.pixel(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn test_tile_failing_twice_becomes_placeholder() {
    let renderer = Arc::new(BrokenTileRenderer {
        origin: (0, 0),
        panics: false,
        attempts: AtomicUsize::new(0),
    });
    let mut session = RenderSession::new(
        config(200, 3),
        RgbaSurface::default(),
        Arc::clone(&renderer) as Arc<dyn TileRenderer>,
    )
    .unwrap();

    session.resize(800, 600).unwrap();
    assert!(session.wait_until_complete(TIMEOUT).unwrap());

    assert_eq!(renderer.attempts.load(Ordering::SeqCst), 2);

    let progress = session.progress();
    assert!(progress.is_complete());
    assert_eq!(progress.applied, 12);
    assert_eq!(progress.degraded, 1);

    let reference = render_frame_rayon(Viewport::new(800, 600), &FractalParams::default());
    assert_placeholder_only_at_origin_tile(session.compositor().surface(), &reference);
}

#[test]
fn test_panicking_renderer_is_isolated_to_its_tile() {
    let renderer = Arc::new(BrokenTileRenderer {
        origin: (0, 0),
        panics: true,
        attempts: AtomicUsize::new(0),
    });
    let mut session = RenderSession::new(
        config(200, 2),
        RgbaSurface::default(),
        Arc::clone(&renderer) as Arc<dyn TileRenderer>,
    )
    .unwrap();

    session.resize(800, 600).unwrap();
    assert!(session.wait_until_complete(TIMEOUT).unwrap());

    assert_eq!(renderer.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(session.progress().degraded, 1);

    let reference = render_frame_rayon(Viewport::new(800, 600), &FractalParams::default());
    assert_placeholder_only_at_origin_tile(session.compositor().surface(), &reference);
}

#[test]
fn test_pool_output_matches_reference_render() {
    let layouts = [
        (TileSizePolicy::FixedEdge(NonZeroU32::new(37).unwrap()), TileOrder::RowMajor),
        (TileSizePolicy::FixedEdge(NonZeroU32::new(64).unwrap()), TileOrder::CenterOut),
        (TileSizePolicy::Bands(NonZeroU32::new(7).unwrap()), TileOrder::RowMajor),
    ];
    let params = FractalParams::default().zoomed(2.0).unwrap();

    for (policy, order) in layouts {
        let session_config = SessionConfig {
            policy,
            order,
            params,
            ..config(1, 4)
        };
        let mut session = RenderSession::new(
            session_config,
            RgbaSurface::default(),
            Arc::new(MandelbrotTileRenderer),
        )
        .unwrap();

        session.resize(203, 151).unwrap();
        assert!(session.wait_until_complete(TIMEOUT).unwrap());

        let reference = render_frame_rayon(Viewport::new(203, 151), &params);
        assert_eq!(
            session.into_surface().pixels(),
            reference.buffer(),
            "{policy:?} {order:?}"
        );
    }
}

#[test]
fn test_repeated_resizes_settle_on_last_size() {
    let mut session = RenderSession::new(
        config(64, 3),
        RgbaSurface::default(),
        Arc::new(MandelbrotTileRenderer),
    )
    .unwrap();

    for (width, height) in [(300, 200), (310, 200), (0, 0), (120, 90), (160, 90)] {
        session.resize(width, height).unwrap();
        session.pump().unwrap();
    }

    assert!(session.wait_until_complete(TIMEOUT).unwrap());

    let reference = render_frame_rayon(Viewport::new(160, 90), &FractalParams::default());
    assert_eq!(session.into_surface().pixels(), reference.buffer());
}
