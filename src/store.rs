use crate::utils::bbox::BoundingBox;
use crate::Errors;
use anyhow::Result;
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// In-place identity corrections
pub mod corrections;


/// Allowed difference between the stored frame count and the video frame count
pub const DEFAULT_FRAME_TOLERANCE: usize = 10;

/// Persisted state of one track in one frame
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    /// One-based identity
    pub id: u64,
    pub decay: u64,
    #[serde(rename = "largestOverlap")]
    pub largest_overlap: f64,
}

/// Per-frame track lists of a session together with the session rotation.
///
/// Frames are stored in video order; the position of a frame in [`TrackStore::frames`] is its
/// frame index. The serialized form is
/// `{"boxes": [[{"box": [x, y, w, h], "id": .., "decay": .., "largestOverlap": ..}, ..], ..], "rotate_amount": ..}`.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackStore {
    #[serde(default)]
    boxes: Vec<Vec<TrackRecord>>,
    #[serde(default)]
    rotate_amount: i64,
}

impl TrackStore {
    pub fn new(rotate_amount: i64) -> Self {
        Self {
            boxes: Vec::default(),
            rotate_amount,
        }
    }

    pub fn push_frame(&mut self, records: Vec<TrackRecord>) {
        self.boxes.push(records);
    }

    pub fn frames(&self) -> &[Vec<TrackRecord>] {
        &self.boxes
    }

    pub fn frame(&self, frame: usize) -> Option<&[TrackRecord]> {
        self.boxes.get(frame).map(Vec::as_slice)
    }

    /// Number of frames
    ///
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn rotate_amount(&self) -> i64 {
        self.rotate_amount
    }

    /// Distinct identities present in the store, ascending
    ///
    pub fn track_ids(&self) -> Vec<u64> {
        self.boxes
            .iter()
            .flatten()
            .map(|r| r.id)
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Record whose box contains the point (edges included), first in frame order
    ///
    pub fn find_at(&self, frame: usize, x: f64, y: f64) -> Option<&TrackRecord> {
        self.boxes
            .get(frame)?
            .iter()
            .find(|r| r.bbox.contains_inclusive(x, y))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the store as JSON indented with four spaces
    ///
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut ser)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            "Loaded {} frames from {} (rotation {})",
            store.len(),
            path.display(),
            store.rotate_amount
        );
        Ok(store)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        info!("Saved {} frames to {}", self.len(), path.display());
        Ok(())
    }

    /// Loads the store and verifies it belongs to a video of `video_frames` frames
    ///
    /// # Errors
    /// * [`Errors::MalformedTrackStore`] when the frame counts differ by more than `tolerance`
    ///
    pub fn load_checked<P: AsRef<Path>>(
        path: P,
        video_frames: usize,
        tolerance: usize,
    ) -> Result<Self> {
        let store = Self::load(path)?;
        store.check_frame_count(video_frames, tolerance)?;
        Ok(store)
    }

    pub fn check_frame_count(&self, video_frames: usize, tolerance: usize) -> Result<()> {
        if self.len().abs_diff(video_frames) > tolerance {
            return Err(Errors::MalformedTrackStore {
                stored: self.len(),
                expected: video_frames,
                tolerance,
            }
            .into());
        }
        Ok(())
    }
}
