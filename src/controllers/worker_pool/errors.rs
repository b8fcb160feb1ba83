use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerPoolError {
    #[error("failed to spawn worker thread {index}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}
