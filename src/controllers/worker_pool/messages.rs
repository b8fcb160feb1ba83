//! Messages exchanged between the coordinator and its workers.
//!
//! They travel in-process as Rust values. The serde representation is the
//! documented wire shape: internally tagged with `"type"`, camelCase fields.

use crate::core::data::generation::Generation;
use crate::core::data::job::{Job, TileResult};
use crate::core::data::tile::Tile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MainToWorker {
    Job(Job),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerToMain {
    Result(TileResult),
    Error {
        tile: Tile,
        generation: Generation,
        message: String,
    },
    /// The worker gave up on a job whose generation was superseded mid-render.
    Cancelled { tile: Tile, generation: Generation },
}

impl WorkerToMain {
    #[must_use]
    pub fn tile(&self) -> Tile {
        match self {
            Self::Result(result) => result.tile,
            Self::Error { tile, .. } | Self::Cancelled { tile, .. } => *tile,
        }
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        match self {
            Self::Result(result) => result.generation,
            Self::Error { generation, .. } | Self::Cancelled { generation, .. } => *generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::viewport::Viewport;
    use crate::core::fractals::mandelbrot::params::FractalParams;
    use serde_json::{Value, json};

    fn tile() -> Tile {
        Tile {
            origin_x: 0,
            origin_y: 200,
            width: 2,
            height: 1,
            generation: Generation(3),
        }
    }

    #[test]
    fn test_job_message_shape() {
        let message = MainToWorker::Job(Job::new(
            tile(),
            Viewport::new(800, 600),
            FractalParams::default(),
        ));

        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["type"], "job");
        assert_eq!(value["generation"], 3);
        assert_eq!(value["tile"]["originY"], 200);
        assert_eq!(value["viewport"], json!({"width": 800, "height": 600}));
        assert_eq!(value["fractalParams"]["maxIterations"], 256);
    }

    #[test]
    fn test_job_message_round_trips() {
        let message = MainToWorker::Job(Job::new(
            tile(),
            Viewport::new(8, 6),
            FractalParams::default(),
        ));

        let text = serde_json::to_string(&message).unwrap();

        assert_eq!(serde_json::from_str::<MainToWorker>(&text).unwrap(), message);
    }

    #[test]
    fn test_shutdown_message_shape() {
        assert_eq!(
            serde_json::to_value(MainToWorker::Shutdown).unwrap(),
            json!({"type": "shutdown"})
        );
    }

    #[test]
    fn test_worker_message_shapes() {
        let result = WorkerToMain::Result(TileResult {
            tile: tile(),
            generation: Generation(3),
            pixels: vec![1, 2, 3, 4, 5, 6, 7, 8],
            degraded: false,
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["pixels"].as_array().map(Vec::len), Some(8));

        let error = WorkerToMain::Error {
            tile: tile(),
            generation: Generation(3),
            message: "boom".to_string(),
        };
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "boom");

        let cancelled = WorkerToMain::Cancelled {
            tile: tile(),
            generation: Generation(3),
        };
        let value: Value = serde_json::to_value(&cancelled).unwrap();
        assert_eq!(value["type"], "cancelled");
        assert_eq!(value["generation"], 3);
    }

    #[test]
    fn test_result_without_degraded_flag_parses() {
        let text = r#"{"type":"result","tile":{"originX":0,"originY":200,"width":1,"height":1,"generation":3},"generation":3,"pixels":[0,0,0,255]}"#;

        let message: WorkerToMain = serde_json::from_str(text).unwrap();

        assert_eq!(message.tile(), Tile { width: 1, ..tile() });
        assert!(matches!(message, WorkerToMain::Result(TileResult { degraded: false, .. })));
    }
}
