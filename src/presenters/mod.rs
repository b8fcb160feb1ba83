pub mod file;
pub mod rgba_surface;
