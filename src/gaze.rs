use crate::store::TrackStore;
use crate::utils::panorama::roll_x;
use crate::Errors;
use anyhow::Result;
use itertools::Itertools;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Merging gaze events into attention intervals
pub mod intervals;

/// Gaze recordings in CSV form
pub mod reader;

/// Resolution of the headset gaze recordings
pub const DEFAULT_CAPTURE_RESOLUTION: (u32, u32) = (5760, 2880);

/// Resolution of the panoramic frames the tracks were computed on
pub const DEFAULT_TARGET_RESOLUTION: (u32, u32) = (3840, 1920);

pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Gaze point of one participant in capture resolution
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub frame: usize,
    pub x: f64,
    pub y: f64,
}

impl GazeSample {
    pub fn new(frame: usize, x: f64, y: f64) -> Self {
        Self { frame, x, y }
    }
}

/// A gaze sample fell inside the box of a track
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeEvent {
    /// Seconds since the video start
    pub time: f64,
    pub track_id: u64,
}

/// Gaze samples of one participant grouped by frame.
///
/// Within a frame samples keep their recording order; repeated identical points are kept
/// once.
///
#[derive(Debug, Clone, Default)]
pub struct GazeSamples {
    frames: HashMap<usize, Vec<GazeSample>>,
    len: usize,
}

impl GazeSamples {
    pub fn new<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = GazeSample>,
    {
        let frames = samples
            .into_iter()
            .into_group_map_by(|s| s.frame)
            .into_iter()
            .map(|(frame, samples)| {
                let unique = samples
                    .into_iter()
                    .unique_by(|s| (s.x.to_bits(), s.y.to_bits()))
                    .collect::<Vec<_>>();
                (frame, unique)
            })
            .collect::<HashMap<_, _>>();
        let len = frames.values().map(Vec::len).sum();
        Self { frames, len }
    }

    /// Samples recorded for `frame`
    ///
    pub fn at_frame(&self, frame: usize) -> &[GazeSample] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Frames having samples, ascending
    ///
    pub fn frame_indices(&self) -> Vec<usize> {
        self.frames.keys().copied().sorted_unstable().collect()
    }

    /// Number of distinct samples
    ///
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl FromIterator<GazeSample> for GazeSamples {
    fn from_iter<T: IntoIterator<Item = GazeSample>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GazeCorrelatorOptions {
    /// Resolution the gaze samples are recorded in
    pub capture_resolution: (u32, u32),
    /// Resolution of the tracked frames
    pub target_resolution: (u32, u32),
    pub frame_rate: f64,
    /// Ignore boxes of tracks unmatched for more frames than this
    pub max_decay: Option<u64>,
}

impl Default for GazeCorrelatorOptions {
    fn default() -> Self {
        Self {
            capture_resolution: DEFAULT_CAPTURE_RESOLUTION,
            target_resolution: DEFAULT_TARGET_RESOLUTION,
            frame_rate: DEFAULT_FRAME_RATE,
            max_decay: None,
        }
    }
}

/// Maps gaze samples onto the tracked identities of a session.
///
/// A sample is scaled from the capture to the target resolution (truncating to whole pixels),
/// rolled by the session rotation and tested against every box of its frame. Only points
/// strictly inside a box are hits; a sample may hit several overlapping boxes.
///
#[derive(Debug, Clone)]
pub struct GazeCorrelator {
    opts: GazeCorrelatorOptions,
    scale: (f64, f64),
}

impl GazeCorrelator {
    /// # Errors
    /// * [`Errors::InvalidResolution`] when a resolution has a zero dimension
    ///
    pub fn new(opts: GazeCorrelatorOptions) -> Result<Self> {
        for (w, h) in [opts.capture_resolution, opts.target_resolution] {
            if w == 0 || h == 0 {
                return Err(Errors::InvalidResolution(w, h).into());
            }
        }
        assert!(opts.frame_rate > 0.0, "Frame rate must be a positive number");

        let scale = (
            opts.target_resolution.0 as f64 / opts.capture_resolution.0 as f64,
            opts.target_resolution.1 as f64 / opts.capture_resolution.1 as f64,
        );
        Ok(Self { opts, scale })
    }

    pub fn options(&self) -> &GazeCorrelatorOptions {
        &self.opts
    }

    /// Sample position in the rotated track space
    ///
    pub fn project(&self, sample: &GazeSample, rotate_amount: i64) -> (f64, f64) {
        let x = (sample.x * self.scale.0).trunc();
        let y = (sample.y * self.scale.1).trunc();
        (
            roll_x(x, rotate_amount, self.opts.target_resolution.0 as f64),
            y,
        )
    }

    /// Video time of a frame in seconds
    ///
    pub fn time(&self, frame: usize) -> f64 {
        frame as f64 / self.opts.frame_rate
    }

    /// Gaze events of one participant.
    ///
    /// Events come frame by frame; within a frame every box is tested against all samples
    /// in turn.
    ///
    pub fn correlate(&self, store: &TrackStore, samples: &GazeSamples) -> Vec<GazeEvent> {
        let mut events = Vec::default();

        for (frame, records) in store.frames().iter().enumerate() {
            let points = samples
                .at_frame(frame)
                .iter()
                .map(|s| self.project(s, store.rotate_amount()))
                .collect::<Vec<_>>();
            if points.is_empty() {
                continue;
            }

            let time = self.time(frame);
            for record in records {
                if matches!(self.opts.max_decay, Some(max) if record.decay > max) {
                    continue;
                }
                for (x, y) in &points {
                    if record.bbox.contains_strict(*x, *y) {
                        events.push(GazeEvent {
                            time,
                            track_id: record.id,
                        });
                    }
                }
            }
        }

        let outside = samples
            .frame_indices()
            .into_iter()
            .filter(|f| *f >= store.len())
            .map(|f| samples.at_frame(f).len())
            .sum::<usize>();
        if outside > 0 {
            warn!(
                "{} gaze samples refer to frames past the end of the track store ({} frames)",
                outside,
                store.len()
            );
        }

        debug!(
            "{} gaze samples produced {} events",
            samples.len(),
            events.len()
        );
        events
    }

    /// Gaze events of several participants, correlated in parallel
    ///
    pub fn correlate_many(
        &self,
        store: &TrackStore,
        participants: &[GazeSamples],
    ) -> Vec<Vec<GazeEvent>> {
        participants
            .par_iter()
            .map(|samples| self.correlate(store, samples))
            .collect()
    }
}
