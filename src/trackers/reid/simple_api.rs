use crate::store::TrackRecord;
use crate::trackers::reid::{overlap_score, ActiveTrack, ReIdOptions, NO_MATCH};
use crate::utils::bbox::BoundingBox;
use crate::utils::panorama::{calculate_wrapped_distance, is_edge_jump, EdgeMargins};
use log::debug;

/// Detection ownership within the frame being processed
///
#[derive(Debug, Clone, Copy)]
struct Claim {
    track: usize,
    score: f64,
}

/// Per-frame matching state
///
struct FrameAssignment {
    /// claim per detection
    claims: Vec<Option<Claim>>,
    /// matched detection per track
    matched: Vec<Option<usize>>,
    /// detection lies in a seam zone
    excluded: Vec<bool>,
}

impl FrameAssignment {
    fn claim(&mut self, detection: usize, track: usize, score: f64) {
        if let Some(prev) = self.claims[detection] {
            self.matched[prev.track] = None;
        }
        self.claims[detection] = Some(Claim { track, score });
        self.matched[track] = Some(detection);
    }
}

/// Panoramic re-identification tracker.
///
/// Frames must be passed strictly in order: every frame is matched against the tracks left
/// by the previous one. Per frame the tracker runs
/// 1. a strict overlap pass,
/// 2. a relaxed overlap pass for what remains unmatched,
/// 3. a nearest-neighbour continuation for the leftover detections, which otherwise start
///    new tracks (or are dropped when they sit in a seam zone).
///
pub struct ReId {
    opts: ReIdOptions,
    margins: EdgeMargins,
    /// index is equal to the track id
    tracks: Vec<ActiveTrack>,
    frame: usize,
}

impl ReId {
    pub fn new(opts: ReIdOptions) -> Self {
        Self {
            margins: opts.margins(),
            opts,
            tracks: Vec::default(),
            frame: 0,
        }
    }

    pub fn options(&self) -> &ReIdOptions {
        &self.opts
    }

    /// All tracks created so far, ordered by id
    ///
    pub fn active_tracks(&self) -> &[ActiveTrack] {
        &self.tracks
    }

    /// Zero-based id the next new track receives
    ///
    pub fn next_track_id(&self) -> u64 {
        self.tracks.len() as u64
    }

    /// Number of frames processed
    ///
    pub fn current_frame(&self) -> usize {
        self.frame
    }

    /// Processes the detections of the next frame.
    ///
    /// # Parameters
    /// * `detections` - boxes of the rotated frame, as produced by the detector
    ///
    /// # Returns
    /// Every track known after the frame, in id order, with one-based ids
    ///
    pub fn predict(&mut self, detections: &[BoundingBox]) -> Vec<TrackRecord> {
        let mut assignment = FrameAssignment {
            claims: vec![None; detections.len()],
            matched: vec![None; self.tracks.len()],
            excluded: detections
                .iter()
                .map(|d| self.margins.is_in_margin(d))
                .collect(),
        };

        self.overlap_pass(
            detections,
            &mut assignment,
            self.opts.primary_decay_factor,
            true,
        );
        self.overlap_pass(
            detections,
            &mut assignment,
            self.opts.secondary_decay_factor,
            false,
        );
        self.nearest_neighbour_pass(detections, &mut assignment);

        for (track, matched) in self.tracks.iter_mut().zip(assignment.matched.iter()) {
            match matched {
                Some(detection) => {
                    track.bbox = detections[*detection];
                    track.decay = 0;
                    track.largest_overlap = assignment.claims[*detection]
                        .map(|c| c.score)
                        .unwrap_or(0.0);
                }
                None => track.decay += 1,
            }
        }

        self.frame += 1;
        self.tracks.iter().map(ActiveTrack::to_record).collect()
    }

    /// Every unmatched track outside the seam zones claims the detection with the best
    /// overlap score. The first maximum in detection order wins.
    ///
    /// With `takeover` a detection may move from its current owner to a track that scores
    /// strictly better; the previous owner is unmatched again. Without it only unclaimed
    /// detections are considered. The takeover compares the penalised score, so a stale track
    /// has to win even after its occlusion penalty.
    ///
    fn overlap_pass(
        &self,
        detections: &[BoundingBox],
        assignment: &mut FrameAssignment,
        decay_factor: f64,
        takeover: bool,
    ) {
        for (t, track) in self.tracks.iter().enumerate() {
            if assignment.matched[t].is_some() || self.margins.is_in_margin(&track.bbox) {
                continue;
            }

            let mut best_score = NO_MATCH;
            let mut best_detection = None;

            for (d, detection) in detections.iter().enumerate() {
                if assignment.excluded[d] {
                    continue;
                }

                let recorded = match assignment.claims[d] {
                    None => 0.0,
                    Some(claim) if takeover => claim.score,
                    Some(_) => continue,
                };

                let score =
                    overlap_score(track, detection, recorded, decay_factor, &self.opts);
                if assignment.claims[d].is_some() && score <= recorded {
                    continue;
                }

                if score > best_score {
                    best_score = score;
                    best_detection = Some(d);
                }
            }

            if let Some(d) = best_detection {
                if let Some(prev) = assignment.claims[d] {
                    debug!(
                        "Frame {}: track {} takes detection {} over from track {} ({} > {})",
                        self.frame, track.id, d, self.tracks[prev.track].id, best_score, prev.score
                    );
                }
                assignment.claim(d, t, best_score);
            }
        }
    }

    /// Leftover detections continue the closest track not matched in this frame, as long as
    /// it is within the gating distance and the pair does not jump across the seam.
    /// Otherwise a new track is started, unless the detection sits in a seam zone.
    ///
    fn nearest_neighbour_pass(
        &mut self,
        detections: &[BoundingBox],
        assignment: &mut FrameAssignment,
    ) {
        for (d, detection) in detections.iter().enumerate() {
            if assignment.claims[d].is_some() {
                continue;
            }

            let mut min_distance = f64::INFINITY;
            let mut closest = None;

            for (t, track) in self.tracks.iter().enumerate() {
                if assignment.matched[t].is_some() {
                    continue;
                }

                let mut distance =
                    calculate_wrapped_distance(detection, &track.bbox, self.opts.frame_width);
                if self.margins.is_in_margin(&track.bbox) {
                    distance -= self.opts.edge_distance_bias;
                }

                if distance < min_distance {
                    min_distance = distance;
                    closest = Some(t);
                }
            }

            match closest {
                Some(t)
                    if min_distance < self.opts.gating_distance
                        && !is_edge_jump(detection, &self.tracks[t].bbox, &self.margins) =>
                {
                    debug!(
                        "Frame {}: detection {} continues track {} at distance {}",
                        self.frame, d, self.tracks[t].id, min_distance
                    );
                    assignment.claim(d, t, 0.0);
                }
                _ if assignment.excluded[d] => {
                    debug!(
                        "Frame {}: detection {} at x={} dropped in the seam zone",
                        self.frame,
                        d,
                        detection.x()
                    );
                }
                _ => {
                    let id = self.next_track_id();
                    debug!("Frame {}: new track {} from detection {}", self.frame, id, d);
                    self.tracks.push(ActiveTrack::new(id, *detection));
                    assignment.matched.push(None);
                    assignment.claim(d, self.tracks.len() - 1, 0.0);
                }
            }
        }
    }
}
