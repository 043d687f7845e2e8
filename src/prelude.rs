pub use crate::centering::{Centering, PanoramicCenterer};
pub use crate::gaze::intervals::{attention_intervals, sort_by_track};
pub use crate::gaze::reader::read_gaze_csv;
pub use crate::gaze::{GazeCorrelator, GazeCorrelatorOptions, GazeEvent, GazeSample, GazeSamples};
pub use crate::store::{TrackRecord, TrackStore};
pub use crate::trackers::reid::session::{
    CancellationToken, Progress, ReIdSession, SessionOptions,
};
pub use crate::trackers::reid::simple_api::ReId;
pub use crate::trackers::reid::{ReIdOptions, ReIdOptionsBuilder};
pub use crate::utils::bbox::BoundingBox;
