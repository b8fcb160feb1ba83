use crate::controllers::worker_pool::errors::WorkerPoolError;
use crate::controllers::worker_pool::messages::{MainToWorker, WorkerToMain};
use crate::core::actions::cancellation::SupersededGeneration;
use crate::core::actions::ports::tile_renderer::{RenderTileError, TileRenderer};
use crate::core::data::generation::GenerationCounter;
use crate::core::data::job::{Job, TileResult};
use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, trace};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Coordinator side of one worker thread.
pub(crate) struct WorkerHandle {
    pub(crate) jobs: Sender<MainToWorker>,
    pub(crate) thread: Option<JoinHandle<()>>,
}

pub(crate) fn spawn_worker(
    index: usize,
    renderer: Arc<dyn TileRenderer>,
    counter: Arc<GenerationCounter>,
    results: Sender<WorkerToMain>,
) -> Result<WorkerHandle, WorkerPoolError> {
    let (jobs, inbox) = bounded(1);

    let thread = thread::Builder::new()
        .name(format!("tile-worker-{index}"))
        .spawn(move || worker_loop(index, &inbox, renderer.as_ref(), &counter, &results))
        .map_err(|source| WorkerPoolError::Spawn { index, source })?;

    Ok(WorkerHandle {
        jobs,
        thread: Some(thread),
    })
}

fn worker_loop(
    index: usize,
    inbox: &Receiver<MainToWorker>,
    renderer: &dyn TileRenderer,
    counter: &GenerationCounter,
    results: &Sender<WorkerToMain>,
) {
    while let Ok(message) = inbox.recv() {
        let job = match message {
            MainToWorker::Job(job) => job,
            MainToWorker::Shutdown => break,
        };

        trace!("worker {index} took {:?} of {}", job.tile, job.generation);

        if results.send(run_job(&job, renderer, counter)).is_err() {
            break;
        }
    }

    debug!("worker {index} stopped");
}

/// Renders one job and turns every outcome, panics included, into a reply.
pub(crate) fn run_job(
    job: &Job,
    renderer: &dyn TileRenderer,
    counter: &GenerationCounter,
) -> WorkerToMain {
    let tile = job.tile;
    let generation = job.generation;
    let cancel = SupersededGeneration::new(counter, generation);

    let failed = |message: String| WorkerToMain::Error {
        tile,
        generation,
        message,
    };

    match panic::catch_unwind(AssertUnwindSafe(|| renderer.render(job, &cancel))) {
        Ok(Ok(buffer)) => match TileResult::from_buffer(tile, buffer) {
            Ok(result) => WorkerToMain::Result(result),
            Err(err) => failed(err.to_string()),
        },
        Ok(Err(RenderTileError::Cancelled(_))) => WorkerToMain::Cancelled { tile, generation },
        Ok(Err(RenderTileError::Failed(message))) => failed(message),
        Err(payload) => failed(format!("renderer panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::cancellation::CancelToken;
    use crate::core::actions::render_tile::MandelbrotTileRenderer;
    use crate::core::data::generation::Generation;
    use crate::core::data::pixel_buffer::PixelBuffer;
    use crate::core::data::tile::Tile;
    use crate::core::data::viewport::Viewport;
    use crate::core::fractals::mandelbrot::params::FractalParams;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    struct PanickingRenderer;

    impl TileRenderer for PanickingRenderer {
        fn render(&self, _: &Job, _: &dyn CancelToken) -> Result<PixelBuffer, RenderTileError> {
            panic!("tile exploded");
        }
    }

    struct WrongSizeRenderer;

    impl TileRenderer for WrongSizeRenderer {
        fn render(&self, _: &Job, _: &dyn CancelToken) -> Result<PixelBuffer, RenderTileError> {
            Ok(PixelBuffer::new(1, 1))
        }
    }

    fn job(generation: u64) -> Job {
        let tile = Tile {
            origin_x: 0,
            origin_y: 0,
            width: 4,
            height: 4,
            generation: Generation(generation),
        };

        Job::new(tile, Viewport::new(16, 16), FractalParams::default())
    }

    fn counter_at(generation: u64) -> GenerationCounter {
        let counter = GenerationCounter::new();
        for _ in 0..generation {
            counter.advance();
        }
        counter
    }

    #[test]
    fn test_run_job_returns_pixels() {
        let reply = run_job(&job(1), &MandelbrotTileRenderer, &counter_at(1));

        match reply {
            WorkerToMain::Result(result) => {
                assert_eq!(result.pixels.len(), 64);
                assert!(!result.degraded);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_run_job_catches_panics() {
        let reply = run_job(&job(1), &PanickingRenderer, &counter_at(1));

        match reply {
            WorkerToMain::Error { message, .. } => assert!(message.contains("tile exploded")),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_run_job_rejects_wrong_sized_buffer() {
        let reply = run_job(&job(1), &WrongSizeRenderer, &counter_at(1));

        assert!(matches!(reply, WorkerToMain::Error { .. }));
    }

    #[test]
    fn test_superseded_job_is_cancelled() {
        let reply = run_job(&job(1), &MandelbrotTileRenderer, &counter_at(2));

        assert_eq!(
            reply,
            WorkerToMain::Cancelled {
                tile: job(1).tile,
                generation: Generation(1)
            }
        );
    }

    #[test]
    fn test_worker_thread_serves_jobs_until_shutdown() {
        let (results, replies) = unbounded();
        let counter = Arc::new(counter_at(1));
        let mut handle = spawn_worker(0, Arc::new(MandelbrotTileRenderer), counter, results).unwrap();

        handle.jobs.send(MainToWorker::Job(job(1))).unwrap();
        let reply = replies.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(reply, WorkerToMain::Result(_)));

        handle.jobs.send(MainToWorker::Shutdown).unwrap();
        handle.thread.take().unwrap().join().unwrap();
    }
}
