use crate::utils::bbox::BoundingBox;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Person box walking along a panoramic strip.
///
/// Every step moves the box by `velocity` plus uniform jitter; `x` wraps around the seam.
///
pub struct PanoramicWalker {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    velocity: f64,
    frame_width: f64,
    dropout: f64,
    gen: StdRng,
    dist_pos: Uniform<f64>,
}

impl PanoramicWalker {
    /// # Parameters
    /// * `bbox` - starting box
    /// * `velocity` - horizontal movement per frame, px
    /// * `jitter` - maximal random displacement per frame along both axes, px
    /// * `frame_width` - strip width, px
    ///
    pub fn new(bbox: BoundingBox, velocity: f64, jitter: f64, frame_width: f64) -> Self {
        Self::with_rng(bbox, velocity, jitter, frame_width, StdRng::from_entropy())
    }

    /// Same as [`PanoramicWalker::new`] with a reproducible sequence
    ///
    pub fn seeded(
        bbox: BoundingBox,
        velocity: f64,
        jitter: f64,
        frame_width: f64,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            bbox,
            velocity,
            jitter,
            frame_width,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        bbox: BoundingBox,
        velocity: f64,
        jitter: f64,
        frame_width: f64,
        gen: StdRng,
    ) -> Self {
        assert!(jitter > 0.0, "Jitter must be a positive number");
        Self {
            x: bbox.x(),
            y: bbox.y(),
            width: bbox.width(),
            height: bbox.height(),
            velocity,
            frame_width,
            dropout: 0.0,
            gen,
            dist_pos: Uniform::new(-jitter, jitter),
        }
    }

    /// Probability that the detector misses the walker in a frame
    ///
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        assert!((0.0..=1.0).contains(&dropout), "Dropout is a probability");
        self.dropout = dropout;
        self
    }

    /// Advances one frame; `None` when the detection is missed
    ///
    pub fn next_detection(&mut self) -> Option<BoundingBox> {
        let bbox = self.next()?;
        if self.dropout > 0.0 && self.gen.gen_bool(self.dropout) {
            None
        } else {
            Some(bbox)
        }
    }
}

impl Iterator for PanoramicWalker {
    type Item = BoundingBox;

    fn next(&mut self) -> Option<Self::Item> {
        self.x = (self.x + self.velocity + self.gen.sample(self.dist_pos))
            .rem_euclid(self.frame_width);
        self.y += self.gen.sample(self.dist_pos);

        Some(BoundingBox::new(self.x, self.y, self.width, self.height))
    }
}

/// Per-frame detections of all walkers
///
pub fn synthetic_session(
    walkers: &mut [PanoramicWalker],
    frames: usize,
) -> Vec<Vec<BoundingBox>> {
    (0..frames)
        .map(|_| {
            walkers
                .iter_mut()
                .filter_map(PanoramicWalker::next_detection)
                .collect()
        })
        .collect()
}
