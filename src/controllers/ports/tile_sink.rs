use crate::core::data::job::TileResult;

/// Receives finished tiles from the worker pool, on the coordinating thread.
pub trait TileSink {
    fn accept(&mut self, result: TileResult);
}

impl TileSink for Vec<TileResult> {
    fn accept(&mut self, result: TileResult) {
        self.push(result);
    }
}
