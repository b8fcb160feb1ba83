pub mod cancellation;
pub mod ports;
pub mod render_frame_rayon;
pub mod render_tile;
