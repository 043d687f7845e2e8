use crate::store::TrackRecord;
use crate::utils::bbox::BoundingBox;
use crate::utils::panorama::wrapped_overlap_area;

pub use self::options::{ReIdOptions, ReIdOptionsBuilder};

/// Tracker tuning and its defaults
pub mod options;

/// Sequential session runner with progress reporting and cancellation
pub mod session;

/// Frame-by-frame tracker
pub mod simple_api;

/// Score returned by the overlap metric when the pair must not be matched
pub const NO_MATCH: f64 = -1.0;

/// Tracked identity. Tracks are never removed during a session: when a person is not
/// detected the box stays where it was last seen and `decay` grows.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrack {
    /// Zero-based identifier, equal to the creation order
    pub id: u64,
    /// Last known position
    pub bbox: BoundingBox,
    /// Frames since the track was last matched
    pub decay: u64,
    /// Score of the last overlap match (0 for distance-based continuations)
    pub largest_overlap: f64,
}

impl ActiveTrack {
    pub fn new(id: u64, bbox: BoundingBox) -> Self {
        Self {
            id,
            bbox,
            decay: 0,
            largest_overlap: 0.0,
        }
    }

    /// Persisted form. External identifiers are one-based.
    ///
    pub fn to_record(&self) -> TrackRecord {
        TrackRecord {
            bbox: self.bbox,
            id: self.id + 1,
            decay: self.decay,
            largest_overlap: self.largest_overlap,
        }
    }
}

/// Overlap score of a track against a candidate detection.
///
/// Returns [`NO_MATCH`] when
/// * the boxes do not overlap, even across the seam;
/// * the detection already carries a recorded overlap at least as large;
/// * the overlap covers less than `decay_factor` of both the track box and the detection box.
///
/// Tracks unmatched for longer than `long_occlusion_decay` frames lose
/// `occlusion_penalty * decay` from the score, so it may drop below [`NO_MATCH`].
///
pub fn overlap_score(
    track: &ActiveTrack,
    detection: &BoundingBox,
    detection_largest_overlap: f64,
    decay_factor: f64,
    opts: &ReIdOptions,
) -> f64 {
    let area = wrapped_overlap_area(
        &track.bbox,
        detection,
        opts.frame_width,
        opts.overlap_margin,
    );

    if area <= 0.0 {
        return NO_MATCH;
    }

    if detection_largest_overlap >= area {
        return NO_MATCH;
    }

    if area < decay_factor * track.bbox.area() && area < decay_factor * detection.area() {
        return NO_MATCH;
    }

    let penalty = if track.decay > opts.long_occlusion_decay {
        opts.occlusion_penalty * track.decay as f64
    } else {
        0.0
    };

    area - penalty
}

#[cfg(test)]
mod tests {
    use crate::trackers::reid::{overlap_score, ActiveTrack, ReIdOptions, NO_MATCH};
    use crate::utils::bbox::BoundingBox;

    fn opts() -> ReIdOptions {
        ReIdOptions::new(3840)
    }

    #[test]
    fn full_overlap() {
        let bb = BoundingBox::new(1000.0, 500.0, 100.0, 300.0);
        let t = ActiveTrack::new(0, bb);
        assert_eq!(overlap_score(&t, &bb, 0.0, 0.6, &opts()), 30000.0);
    }

    #[test]
    fn rejections() {
        let t = ActiveTrack::new(0, BoundingBox::new(1000.0, 500.0, 100.0, 300.0));

        let disjoint = BoundingBox::new(1200.0, 500.0, 100.0, 300.0);
        assert_eq!(overlap_score(&t, &disjoint, 0.0, 0.6, &opts()), NO_MATCH);

        // half of both boxes
        let half = BoundingBox::new(1050.0, 500.0, 100.0, 300.0);
        assert_eq!(overlap_score(&t, &half, 0.0, 0.6, &opts()), NO_MATCH);
        assert_eq!(overlap_score(&t, &half, 0.0, 0.1, &opts()), 15000.0);

        // already claimed with a better overlap
        assert_eq!(overlap_score(&t, &half, 15000.0, 0.1, &opts()), NO_MATCH);
        assert_eq!(overlap_score(&t, &half, 14999.0, 0.1, &opts()), 15000.0);
    }

    #[test]
    fn share_of_either_box() {
        // a small detection fully inside a large track box
        let t = ActiveTrack::new(0, BoundingBox::new(1000.0, 500.0, 200.0, 400.0));
        let small = BoundingBox::new(1050.0, 600.0, 50.0, 100.0);
        assert_eq!(overlap_score(&t, &small, 0.0, 0.6, &opts()), 5000.0);
    }

    #[test]
    fn long_occlusion_penalty() {
        let bb = BoundingBox::new(1000.0, 500.0, 100.0, 300.0);
        let mut t = ActiveTrack::new(0, bb);

        t.decay = 3;
        assert_eq!(overlap_score(&t, &bb, 0.0, 0.6, &opts()), 30000.0);

        t.decay = 4;
        assert_eq!(overlap_score(&t, &bb, 0.0, 0.6, &opts()), 30000.0 - 2800.0);

        t.decay = 100;
        assert!(overlap_score(&t, &bb, 0.0, 0.6, &opts()) < NO_MATCH);
    }

    #[test]
    fn across_seam() {
        let t = ActiveTrack::new(0, BoundingBox::new(3790.0, 500.0, 80.0, 300.0));
        let det = BoundingBox::new(0.0, 500.0, 40.0, 300.0);
        // 30 px of the detection lie in the track box after wrapping
        assert_eq!(overlap_score(&t, &det, 0.0, 0.6, &opts()), 9000.0);
    }

    #[test]
    fn record_ids_are_one_based() {
        let t = ActiveTrack::new(0, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        let r = t.to_record();
        assert_eq!(r.id, 1);
        assert_eq!(r.decay, 0);
        assert_eq!(r.bbox, t.bbox);
    }
}
