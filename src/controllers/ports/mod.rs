pub mod surface;
pub mod tile_sink;
