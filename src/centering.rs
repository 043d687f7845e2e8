use crate::utils::bbox::BoundingBox;
use crate::Errors;
use anyhow::Result;
use itertools::Itertools;
use log::debug;

/// The largest empty horizontal gap between first-frame detections and the rotation that
/// moves its middle onto the panoramic seam.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Centering {
    /// Right edge of the box preceding the gap
    pub gap_start: f64,
    /// Left edge of the box following the gap (`+ frame_width` when the gap crosses the seam)
    pub gap_end: f64,
    pub gap_width: f64,
    /// Middle of the gap in frame coordinates, always within `[0, frame_width]`
    pub midpoint: f64,
    /// The gap runs from the last box across the seam to the first box
    pub wraps_seam: bool,
    /// Roll applied along x to every frame of the session
    pub rotate_amount: i64,
}

/// Computes the session rotation from the detections of the first frame so that nobody is
/// split by the seam afterwards.
///
#[derive(Debug, Clone)]
pub struct PanoramicCenterer {
    frame_width: u32,
}

impl PanoramicCenterer {
    pub fn new(frame_width: u32) -> Self {
        assert!(frame_width > 0, "Frame width must be positive");
        Self { frame_width }
    }

    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    /// Rotation only
    ///
    pub fn rotate_amount(&self, first_frame: &[BoundingBox]) -> Result<i64> {
        Ok(self.center(first_frame)?.rotate_amount)
    }

    /// Applies the session rotation to the detections of a frame
    ///
    pub fn roll_frame(
        &self,
        detections: &[BoundingBox],
        rotate_amount: i64,
    ) -> Vec<BoundingBox> {
        let width = self.frame_width as f64;
        detections
            .iter()
            .map(|bb| bb.rolled(rotate_amount, width))
            .collect()
    }

    /// Finds the largest gap and the rotation.
    ///
    /// Gaps are scanned left to right with the gap across the seam last; on equal widths the
    /// earliest gap wins.
    ///
    /// # Errors
    /// * [`Errors::NoDetections`] when the first frame is empty
    ///
    pub fn center(&self, first_frame: &[BoundingBox]) -> Result<Centering> {
        if first_frame.is_empty() {
            return Err(Errors::NoDetections.into());
        }

        let width = self.frame_width as f64;
        let spans = first_frame
            .iter()
            .map(BoundingBox::horizontal_span)
            .sorted_by(|l, r| l.0.total_cmp(&r.0))
            .collect::<Vec<_>>();

        let first = spans[0];
        let last = spans[spans.len() - 1];

        let mut best = Centering {
            gap_start: last.1,
            gap_end: first.0 + width,
            gap_width: width - last.1 + first.0,
            midpoint: 0.0,
            wraps_seam: true,
            rotate_amount: 0,
        };

        for (prev, next) in spans.iter().tuple_windows() {
            let gap_width = next.0 - prev.1;
            // the seam gap comes last in scan order, so a regular gap keeps ties
            if gap_width >= best.gap_width && (best.wraps_seam || gap_width > best.gap_width) {
                best = Centering {
                    gap_start: prev.1,
                    gap_end: next.0,
                    gap_width,
                    midpoint: 0.0,
                    wraps_seam: false,
                    rotate_amount: 0,
                };
            }
        }

        best.midpoint = if best.wraps_seam {
            let midpoint = (first.0 + width + last.1) / 2.0;
            if midpoint > width {
                midpoint - width
            } else {
                midpoint
            }
        } else {
            (best.gap_start + best.gap_end) / 2.0
        };

        let half = self.frame_width as i64 / 2;
        best.rotate_amount = (width / 2.0 - best.midpoint).trunc() as i64 + half;

        debug!(
            "Largest gap [{}, {}) of width {} (seam: {}), midpoint {}, rotation {}",
            best.gap_start,
            best.gap_end,
            best.gap_width,
            best.wraps_seam,
            best.midpoint,
            best.rotate_amount
        );

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use crate::centering::PanoramicCenterer;
    use crate::utils::bbox::BoundingBox;
    use crate::utils::panorama::roll_x;
    use crate::{Errors, EPS};

    const W: u32 = 3840;

    fn spans(spans: &[(f64, f64)]) -> Vec<BoundingBox> {
        spans
            .iter()
            .map(|(l, r)| BoundingBox::new(*l, 500.0, r - l, 300.0))
            .collect()
    }

    fn lands_on_seam(x: f64, rotate_amount: i64) -> bool {
        let rolled = roll_x(x, rotate_amount, W as f64);
        rolled < EPS || (W as f64 - rolled) < EPS
    }

    #[test]
    fn largest_regular_gap() {
        let c = PanoramicCenterer::new(W)
            .center(&spans(&[(1000.0, 1200.0), (3000.0, 3200.0), (100.0, 300.0)]))
            .unwrap();
        assert!(!c.wraps_seam);
        assert_eq!(c.gap_start, 1200.0);
        assert_eq!(c.gap_end, 3000.0);
        assert_eq!(c.gap_width, 1800.0);
        assert_eq!(c.midpoint, 2100.0);

        // the first term brings the midpoint to the frame center, the half-width roll
        // then moves it to the seam
        let centered = c.midpoint + (c.rotate_amount - W as i64 / 2) as f64;
        assert_eq!(centered, (W / 2) as f64);
        assert_eq!(c.rotate_amount, 1740);
        assert!(lands_on_seam(c.midpoint, c.rotate_amount));
    }

    #[test]
    fn gap_across_seam() {
        let c = PanoramicCenterer::new(W)
            .center(&spans(&[(1000.0, 1200.0), (2000.0, 2200.0)]))
            .unwrap();
        assert!(c.wraps_seam);
        assert_eq!(c.gap_width, 2640.0);
        assert_eq!(c.midpoint, 3520.0);
        assert_eq!(c.rotate_amount, 320);
        assert!(lands_on_seam(c.midpoint, c.rotate_amount));
    }

    #[test]
    fn gap_across_seam_reduced() {
        let c = PanoramicCenterer::new(W)
            .center(&spans(&[(2000.0, 2100.0), (3000.0, 3800.0)]))
            .unwrap();
        assert!(c.wraps_seam);
        assert_eq!(c.midpoint, 980.0);
        assert_eq!(c.rotate_amount, 2860);
        assert!(lands_on_seam(c.midpoint, c.rotate_amount));
    }

    #[test]
    fn single_person() {
        let centerer = PanoramicCenterer::new(W);
        let rotate_amount = centerer
            .rotate_amount(&spans(&[(1000.0, 1200.0)]))
            .unwrap();
        assert_eq!(rotate_amount, 820);
    }

    #[test]
    fn tie_prefers_regular_gap() {
        // regular gap 300..2020 and the seam gap 2220..(3840 + 100) are both 1720 wide
        let c = PanoramicCenterer::new(W)
            .center(&spans(&[(100.0, 300.0), (2020.0, 2220.0)]))
            .unwrap();
        assert_eq!(c.gap_width, 1720.0);
        assert!(!c.wraps_seam);
        assert_eq!(c.midpoint, 1160.0);
    }

    #[test]
    fn rolled_first_frame_clears_seam() {
        let centerer = PanoramicCenterer::new(W);
        let first = spans(&[(3700.0, 3900.0), (1000.0, 1200.0)]);
        // the first box straddles the seam before rotation
        assert!(first[0].right() > W as f64);

        let rotate_amount = centerer.rotate_amount(&first).unwrap();
        let rolled = centerer.roll_frame(&first, rotate_amount);
        assert!(rolled.iter().all(|bb| bb.right() <= W as f64));
        assert_eq!(rolled[1].width(), 200.0);
    }

    #[test]
    fn empty_first_frame() {
        let err = PanoramicCenterer::new(W).center(&[]).unwrap_err();
        assert_eq!(err.downcast_ref::<Errors>(), Some(&Errors::NoDetections));
    }
}
