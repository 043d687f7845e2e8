use crate::utils::panorama::EdgeMargins;

/// Share of the frame width on the left that is treated as the seam zone
pub const DEFAULT_LEFT_MARGIN_RATIO: f64 = 1.0 / 14.0;

/// Share of the frame width after which the right seam zone begins
pub const DEFAULT_RIGHT_MARGIN_RATIO: f64 = 13.0 / 14.0;

/// Distance to a frame edge (px) at which overlaps are also computed across the seam
pub const DEFAULT_OVERLAP_MARGIN: f64 = 50.0;

/// Minimal overlap share of either box in the first matching pass
pub const DEFAULT_PRIMARY_DECAY_FACTOR: f64 = 0.6;

/// Minimal overlap share of either box in the second, relaxed matching pass
pub const DEFAULT_SECONDARY_DECAY_FACTOR: f64 = 0.1;

/// Tracks unmatched for more frames than this are penalized in overlap matching
pub const DEFAULT_LONG_OCCLUSION_DECAY: u64 = 3;

/// Penalty per decayed frame subtracted from the overlap score of long-occluded tracks
pub const DEFAULT_OCCLUSION_PENALTY: f64 = 700.0;

/// Distance bonus (px) for tracks waiting in the seam zones
pub const DEFAULT_EDGE_DISTANCE_BIAS: f64 = 100.0;

/// Maximal center distance (px) for the nearest-neighbour continuation
pub const DEFAULT_GATING_DISTANCE: f64 = 400.0;

/// Tuning of [`ReId`](crate::trackers::reid::simple_api::ReId).
///
/// The defaults were tuned on 3840x1920 equirectangular footage.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ReIdOptions {
    /// Panoramic frame width in pixels
    pub frame_width: f64,
    pub left_margin_ratio: f64,
    pub right_margin_ratio: f64,
    pub overlap_margin: f64,
    pub primary_decay_factor: f64,
    pub secondary_decay_factor: f64,
    pub long_occlusion_decay: u64,
    pub occlusion_penalty: f64,
    pub edge_distance_bias: f64,
    pub gating_distance: f64,
}

impl ReIdOptions {
    /// Default tuning for a frame of `frame_width` pixels
    ///
    pub fn new(frame_width: u32) -> Self {
        ReIdOptionsBuilder::new(frame_width).build()
    }

    pub fn margins(&self) -> EdgeMargins {
        EdgeMargins::new(
            self.frame_width,
            self.left_margin_ratio,
            self.right_margin_ratio,
        )
    }
}

/// Builder for [`ReIdOptions`]
///
pub struct ReIdOptionsBuilder {
    opts: ReIdOptions,
}

impl ReIdOptionsBuilder {
    /// Creates a new builder with default tuning
    ///
    /// # Parameters
    /// * `frame_width` - panoramic frame width in pixels, must be positive
    ///
    pub fn new(frame_width: u32) -> Self {
        assert!(frame_width > 0, "Frame width must be positive");
        Self {
            opts: ReIdOptions {
                frame_width: frame_width as f64,
                left_margin_ratio: DEFAULT_LEFT_MARGIN_RATIO,
                right_margin_ratio: DEFAULT_RIGHT_MARGIN_RATIO,
                overlap_margin: DEFAULT_OVERLAP_MARGIN,
                primary_decay_factor: DEFAULT_PRIMARY_DECAY_FACTOR,
                secondary_decay_factor: DEFAULT_SECONDARY_DECAY_FACTOR,
                long_occlusion_decay: DEFAULT_LONG_OCCLUSION_DECAY,
                occlusion_penalty: DEFAULT_OCCLUSION_PENALTY,
                edge_distance_bias: DEFAULT_EDGE_DISTANCE_BIAS,
                gating_distance: DEFAULT_GATING_DISTANCE,
            },
        }
    }

    /// Seam zones as shares of the frame width
    ///
    pub fn edge_margins(mut self, left_ratio: f64, right_ratio: f64) -> Self {
        self.opts.left_margin_ratio = left_ratio;
        self.opts.right_margin_ratio = right_ratio;
        self
    }

    pub fn overlap_margin(mut self, overlap_margin: f64) -> Self {
        self.opts.overlap_margin = overlap_margin;
        self
    }

    /// Minimal overlap shares for the first and the second matching pass
    ///
    pub fn decay_factors(mut self, primary: f64, secondary: f64) -> Self {
        self.opts.primary_decay_factor = primary;
        self.opts.secondary_decay_factor = secondary;
        self
    }

    /// Penalty applied to tracks unmatched for more than `after_decay` frames
    ///
    pub fn occlusion_penalty(mut self, after_decay: u64, penalty: f64) -> Self {
        self.opts.long_occlusion_decay = after_decay;
        self.opts.occlusion_penalty = penalty;
        self
    }

    pub fn edge_distance_bias(mut self, bias: f64) -> Self {
        self.opts.edge_distance_bias = bias;
        self
    }

    pub fn gating_distance(mut self, distance: f64) -> Self {
        self.opts.gating_distance = distance;
        self
    }

    pub fn build(self) -> ReIdOptions {
        let o = &self.opts;
        assert!(
            0.0 <= o.left_margin_ratio
                && o.left_margin_ratio < o.right_margin_ratio
                && o.right_margin_ratio <= 1.0,
            "Edge margins must satisfy 0 <= left < right <= 1"
        );
        assert!(
            o.overlap_margin >= 0.0,
            "Overlap margin must be a non-negative number"
        );
        assert!(
            o.primary_decay_factor > 0.0 && o.secondary_decay_factor > 0.0,
            "Decay factors must be positive"
        );
        assert!(
            o.occlusion_penalty >= 0.0,
            "Occlusion penalty must be a non-negative number"
        );
        assert!(
            o.gating_distance > 0.0,
            "Gating distance must be a positive number"
        );
        self.opts
    }
}

#[cfg(test)]
mod tests {
    use crate::trackers::reid::options::{
        ReIdOptions, ReIdOptionsBuilder, DEFAULT_GATING_DISTANCE, DEFAULT_OVERLAP_MARGIN,
    };
    use crate::EPS;

    #[test]
    fn defaults() {
        let opts = ReIdOptions::new(3840);
        assert_eq!(opts.frame_width, 3840.0);
        assert_eq!(opts.overlap_margin, DEFAULT_OVERLAP_MARGIN);
        assert_eq!(opts.gating_distance, DEFAULT_GATING_DISTANCE);

        let margins = opts.margins();
        assert!((margins.left - 3840.0 / 14.0).abs() < EPS);
        assert!((margins.right - 3840.0 * 13.0 / 14.0).abs() < EPS);
    }

    #[test]
    fn builder() {
        let opts = ReIdOptionsBuilder::new(1920)
            .edge_margins(0.05, 0.95)
            .overlap_margin(25.0)
            .decay_factors(0.5, 0.2)
            .occlusion_penalty(5, 100.0)
            .edge_distance_bias(50.0)
            .gating_distance(200.0)
            .build();
        assert_eq!(opts.left_margin_ratio, 0.05);
        assert_eq!(opts.right_margin_ratio, 0.95);
        assert_eq!(opts.overlap_margin, 25.0);
        assert_eq!(opts.primary_decay_factor, 0.5);
        assert_eq!(opts.secondary_decay_factor, 0.2);
        assert_eq!(opts.long_occlusion_decay, 5);
        assert_eq!(opts.occlusion_penalty, 100.0);
        assert_eq!(opts.edge_distance_bias, 50.0);
        assert_eq!(opts.gating_distance, 200.0);
    }

    #[test]
    #[should_panic]
    fn inverted_margins() {
        ReIdOptionsBuilder::new(1920).edge_margins(0.9, 0.1).build();
    }
}
