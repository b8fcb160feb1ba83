use crate::controllers::ports::tile_sink::TileSink;
use crate::controllers::worker_pool::errors::WorkerPoolError;
use crate::controllers::worker_pool::messages::{MainToWorker, WorkerToMain};
use crate::controllers::worker_pool::worker::{WorkerHandle, spawn_worker};
use crate::core::actions::ports::tile_renderer::TileRenderer;
use crate::core::data::colour::Rgba;
use crate::core::data::generation::{Generation, GenerationCounter};
use crate::core::data::job::{Job, TileResult};
use crate::core::data::tile::Tile;
use crate::core::util::available_parallelism::available_workers;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError, unbounded};
use log::{debug, info, trace, warn};
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// Colour of tiles that failed to compute twice.
pub const DEFAULT_PLACEHOLDER: Rgba = Rgba {
    r: 0x40,
    g: 0x40,
    b: 0x40,
    a: 0xff,
};

/// Attempts per tile before it is replaced with a placeholder.
const MAX_ATTEMPTS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub pool_size: NonZeroUsize,
    pub placeholder: Rgba,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: available_workers(),
            placeholder: DEFAULT_PLACEHOLDER,
        }
    }
}

struct Pending {
    job: Job,
    attempts: u8,
    /// Worker that already failed this job.
    avoid: Option<usize>,
}

struct Assignment {
    worker: usize,
    job: Job,
    attempts: u8,
}

/// Owns a fixed set of worker threads and feeds them tile jobs.
///
/// Lives on the coordinating thread. Workers only ever see one job at a time,
/// everything else waits in the queue, so a new generation can drop queued
/// work without touching the workers.
pub struct WorkerPoolCoordinator {
    workers: Vec<WorkerHandle>,
    busy: Vec<Option<Tile>>,
    queue: VecDeque<Pending>,
    in_flight: HashMap<Tile, Assignment>,
    results_sender: Sender<WorkerToMain>,
    results: Receiver<WorkerToMain>,
    renderer: Arc<dyn TileRenderer>,
    counter: Arc<GenerationCounter>,
    placeholder: Rgba,
}

impl WorkerPoolCoordinator {
    pub fn new(
        config: PoolConfig,
        renderer: Arc<dyn TileRenderer>,
        counter: Arc<GenerationCounter>,
    ) -> Result<Self, WorkerPoolError> {
        let (results_sender, results) = unbounded();
        let pool_size = config.pool_size.get();

        let workers = (0..pool_size)
            .map(|index| {
                spawn_worker(
                    index,
                    Arc::clone(&renderer),
                    Arc::clone(&counter),
                    results_sender.clone(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("started {pool_size} tile workers");

        Ok(Self {
            workers,
            busy: vec![None; pool_size],
            queue: VecDeque::new(),
            in_flight: HashMap::new(),
            results_sender,
            results,
            renderer,
            counter,
            placeholder: config.placeholder,
        })
    }

    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_empty()
    }

    /// Queues `jobs` and hands out as many as there are idle workers.
    ///
    /// Jobs of a generation other than the current one are dropped, both the
    /// incoming ones and any still queued. Never blocks on the workers.
    pub fn dispatch(&mut self, jobs: impl IntoIterator<Item = Job>) -> Result<(), WorkerPoolError> {
        let current = self.counter.current();
        self.cancel_stale(current);
        let before = self.queue.len();

        self.queue.extend(
            jobs.into_iter()
                .filter(|job| job.generation == current)
                .map(|job| Pending {
                    job,
                    attempts: 0,
                    avoid: None,
                }),
        );

        info!(
            "queued {} tiles for {current}, {} in flight",
            self.queue.len() - before,
            self.in_flight.len()
        );

        self.assign()
    }

    /// Drops queued jobs older than `generation`.
    ///
    /// Jobs already running are left alone; their workers notice the newer
    /// generation and abandon them.
    pub fn cancel_stale(&mut self, generation: Generation) {
        let before = self.queue.len();
        self.queue.retain(|pending| pending.job.generation >= generation);

        let dropped = before - self.queue.len();
        if dropped > 0 {
            debug!("dropped {dropped} queued tiles older than {generation}");
        }
    }

    /// Handles one reply from a worker, forwarding finished tiles to `sink`.
    pub fn on_worker_message(
        &mut self,
        message: WorkerToMain,
        sink: &mut dyn TileSink,
    ) -> Result<(), WorkerPoolError> {
        let tile = message.tile();
        let generation = message.generation();
        let assignment = self.in_flight.remove(&tile);

        if let Some(assignment) = &assignment {
            self.busy[assignment.worker] = None;
        }

        if !self.counter.is_current(generation) {
            trace!("discarding stale {:?} of {generation}", tile);
            return self.assign();
        }

        match message {
            WorkerToMain::Result(result) => {
                debug!("tile {:?} of {generation} done", tile);
                sink.accept(result);
            }
            WorkerToMain::Error { message, .. } => {
                self.retry_or_degrade(tile, assignment, &message, sink)?;
            }
            WorkerToMain::Cancelled { .. } => {
                // Only a superseded job should be abandoned.
                self.retry_or_degrade(tile, assignment, "cancelled while current", sink)?;
            }
        }

        self.assign()
    }

    /// Handles every reply already waiting, without blocking. Returns how many
    /// were handled.
    pub fn pump(&mut self, sink: &mut dyn TileSink) -> Result<usize, WorkerPoolError> {
        let mut handled = 0;

        loop {
            match self.results.try_recv() {
                Ok(message) => {
                    self.on_worker_message(message, sink)?;
                    handled += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(handled),
            }
        }
    }

    /// Waits up to `timeout` for the first reply, then drains the rest.
    ///
    /// Returns straight away when nothing is in flight.
    pub fn pump_timeout(
        &mut self,
        sink: &mut dyn TileSink,
        timeout: Duration,
    ) -> Result<usize, WorkerPoolError> {
        if self.in_flight.is_empty() {
            return self.pump(sink);
        }

        match self.results.recv_timeout(timeout) {
            Ok(message) => {
                self.on_worker_message(message, sink)?;
                Ok(1 + self.pump(sink)?)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => Ok(0),
        }
    }

    fn retry_or_degrade(
        &mut self,
        tile: Tile,
        assignment: Option<Assignment>,
        reason: &str,
        sink: &mut dyn TileSink,
    ) -> Result<(), WorkerPoolError> {
        let Some(Assignment {
            worker,
            job,
            attempts,
        }) = assignment
        else {
            warn!("failure for unknown tile {:?}: {reason}", tile);
            return Ok(());
        };

        if attempts >= MAX_ATTEMPTS {
            warn!(
                "tile {:?} of {} failed {attempts} times, using placeholder: {reason}",
                tile, job.generation
            );
            sink.accept(TileResult::placeholder(tile, self.placeholder));
            return Ok(());
        }

        warn!("worker {worker} failed tile {:?}, retrying: {reason}", tile);

        let avoid = if self.workers.len() == 1 {
            // No other worker to retry on, start over with a fresh one.
            self.respawn(worker)?;
            None
        } else {
            Some(worker)
        };

        self.queue.push_front(Pending {
            job,
            attempts,
            avoid,
        });

        Ok(())
    }

    /// Hands queued jobs to idle workers. A job whose generation has been
    /// superseded is dropped here and never reaches a worker.
    fn assign(&mut self) -> Result<(), WorkerPoolError> {
        self.cancel_stale(self.counter.current());

        for worker in 0..self.workers.len() {
            while self.busy[worker].is_none() {
                let Some(position) = self
                    .queue
                    .iter()
                    .position(|pending| pending.avoid != Some(worker))
                else {
                    break;
                };

                let Some(pending) = self.queue.remove(position) else {
                    break;
                };

                // The counter may have moved since the queue was pruned.
                if !self.counter.is_current(pending.job.generation) {
                    trace!("dropping superseded {:?} before sending", pending.job.tile);
                    continue;
                }

                if !self.send(worker, pending)? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Returns whether the worker took the job. A job it could not take goes
    /// back to the front of the queue.
    fn send(&mut self, worker: usize, pending: Pending) -> Result<bool, WorkerPoolError> {
        let message = MainToWorker::Job(pending.job.clone());

        let sent = match self.workers[worker].jobs.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(message)) => {
                warn!("worker {worker} is gone, replacing it");
                self.respawn(worker)?;
                self.workers[worker].jobs.try_send(message).is_ok()
            }
        };

        if !sent {
            self.queue.push_front(pending);
            return Ok(false);
        }

        let tile = pending.job.tile;
        self.busy[worker] = Some(tile);
        self.in_flight.insert(
            tile,
            Assignment {
                worker,
                job: pending.job,
                attempts: pending.attempts + 1,
            },
        );

        Ok(true)
    }

    fn respawn(&mut self, worker: usize) -> Result<(), WorkerPoolError> {
        let replacement = spawn_worker(
            worker,
            Arc::clone(&self.renderer),
            Arc::clone(&self.counter),
            self.results_sender.clone(),
        )?;

        let mut old = std::mem::replace(&mut self.workers[worker], replacement);
        let _ = old.jobs.try_send(MainToWorker::Shutdown);
        if let Some(handle) = old.thread.take() {
            let _ = handle.join();
        }
        self.busy[worker] = None;

        Ok(())
    }
}

impl Drop for WorkerPoolCoordinator {
    fn drop(&mut self) {
        for worker in &self.workers {
            let _ = worker.jobs.try_send(MainToWorker::Shutdown);
        }

        for worker in &mut self.workers {
            if let Some(handle) = worker.thread.take() {
                let _ = handle.join();
            }
        }
    }
}
