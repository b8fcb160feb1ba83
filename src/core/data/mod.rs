pub mod colour;
pub mod complex;
pub mod generation;
pub mod job;
pub mod pixel_buffer;
pub mod point;
pub mod tile;
pub mod viewport;
