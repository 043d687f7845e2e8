use thiserror::Error;

/// Panoramic seam centering
///
pub mod centering;

/// Synthetic data generators for demos, benchmarks and tests
///
pub mod examples;

/// Gaze sample to identity correlation
///
pub mod gaze;

/// Frequently used types
///
pub mod prelude;

/// Persisted per-frame track state and the correction operations
///
pub mod store;

/// Cross-frame identity trackers
///
pub mod trackers;

/// Geometry primitives
///
pub mod utils;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Errors {
    #[error("The first frame has no detections - rotation offset cannot be computed.")]
    NoDetections,
    #[error("Track store holds {stored} frames while the video has {expected} (tolerance is {tolerance}).")]
    MalformedTrackStore {
        stored: usize,
        expected: usize,
        tolerance: usize,
    },
    #[error("Gaze row at line {line} is malformed: {reason}")]
    MalformedGazeRow { line: usize, reason: String },
    #[error("Resolution must have non-zero width and height, got {0}x{1}")]
    InvalidResolution(u32, u32),
    #[error("Session was cancelled after {processed} frames.")]
    Cancelled { processed: usize },
}

pub const EPS: f64 = 0.00001;

/// Allows comparing floating point structures with a tolerance
///
pub trait EstimateClose {
    fn almost_same(&self, other: &Self, eps: f64) -> bool;
}
