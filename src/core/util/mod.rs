pub mod available_parallelism;
pub mod partition;
pub mod pixel_to_complex_coords;
