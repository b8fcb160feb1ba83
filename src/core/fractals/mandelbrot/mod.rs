pub mod algorithm;
pub mod palette;
pub mod params;
