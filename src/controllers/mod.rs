pub mod compositor;
pub mod ports;
pub mod session;
pub mod viewport_tracker;
pub mod worker_pool;
