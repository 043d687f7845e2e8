//! Geometry on an equirectangular strip: the rightmost pixel column is adjacent to the
//! leftmost one, so overlaps and distances are measured across the seam as well.
//!
//! All helpers are total, "no match" is expressed with plain values.

use crate::utils::bbox::BoundingBox;

/// Horizontal exclusion zones near the seam.
///
/// A box is inside a margin when its left edge is left of `left` or right of `right`.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeMargins {
    pub frame_width: f64,
    pub left: f64,
    pub right: f64,
}

impl EdgeMargins {
    /// # Parameters
    /// * `frame_width` - panoramic frame width in pixels
    /// * `left_ratio` - left margin as a share of the width (1/14 by default)
    /// * `right_ratio` - right margin start as a share of the width (13/14 by default)
    ///
    pub fn new(frame_width: f64, left_ratio: f64, right_ratio: f64) -> Self {
        Self {
            frame_width,
            left: frame_width * left_ratio,
            right: frame_width * right_ratio,
        }
    }

    pub fn is_in_margin(&self, bb: &BoundingBox) -> bool {
        self.is_in_left_margin(bb) || self.is_in_right_margin(bb)
    }

    pub fn is_in_left_margin(&self, bb: &BoundingBox) -> bool {
        bb.x() < self.left
    }

    pub fn is_in_right_margin(&self, bb: &BoundingBox) -> bool {
        bb.x() > self.right
    }
}

/// Intersection area of two boxes, also taking the seam into account.
///
/// When either box lies within `overlap_margin` pixels of a frame edge, `b` is also shifted
/// by `±frame_width` and the largest of the intersections is returned. This catches a
/// person that is split across the seam.
///
pub fn wrapped_overlap_area(
    a: &BoundingBox,
    b: &BoundingBox,
    frame_width: f64,
    overlap_margin: f64,
) -> f64 {
    let near_left = |bb: &BoundingBox| bb.left() < overlap_margin;
    let near_right = |bb: &BoundingBox| bb.right() > frame_width - overlap_margin;

    let mut area = a.intersection_area(b);

    if near_left(b) || near_right(a) {
        area = area.max(a.intersection_area(&b.shifted_x(frame_width)));
    }

    if near_right(b) || near_left(a) {
        area = area.max(a.intersection_area(&b.shifted_x(-frame_width)));
    }

    area
}

/// Horizontal center distance on the strip: the shorter way around
///
pub fn wrapped_dx(x1: f64, x2: f64, frame_width: f64) -> f64 {
    let dx = (x1 - x2).abs();
    dx.min(frame_width - dx)
}

/// Euclidean distance between box centers. `x` wraps around the seam, `y` does not.
///
pub fn calculate_wrapped_distance(a: &BoundingBox, b: &BoundingBox, frame_width: f64) -> f64 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let dx = wrapped_dx(ax, bx, frame_width);
    let dy = (ay - by).abs();
    (dx * dx + dy * dy).sqrt()
}

/// Detects a candidate pair that would only be close because of the seam: one box sits in
/// the left margin while the other is centered in the right half of the frame, or the
/// mirrored situation for the right margin.
///
pub fn is_edge_jump(a: &BoundingBox, b: &BoundingBox, margins: &EdgeMargins) -> bool {
    let half = margins.frame_width / 2.0;
    let jumps = |p: &BoundingBox, q: &BoundingBox| {
        let (qx, _) = q.center();
        (margins.is_in_left_margin(p) && qx > half) || (margins.is_in_right_margin(p) && qx < half)
    };
    jumps(a, b) || jumps(b, a)
}

/// Moves an x coordinate of the unrotated frame into the rotated frame
///
pub fn roll_x(x: f64, rotate_amount: i64, frame_width: f64) -> f64 {
    (x + rotate_amount as f64).rem_euclid(frame_width)
}

/// Moves an x coordinate of the rotated frame back into the unrotated frame
///
pub fn unroll_x(x: f64, rotate_amount: i64, frame_width: f64) -> f64 {
    (x - rotate_amount as f64).rem_euclid(frame_width)
}

#[cfg(test)]
mod tests {
    use crate::utils::bbox::BoundingBox;
    use crate::utils::panorama::{
        calculate_wrapped_distance, is_edge_jump, roll_x, unroll_x, wrapped_overlap_area,
        EdgeMargins,
    };
    use crate::EPS;

    const W: f64 = 3840.0;

    #[test]
    fn overlap_across_seam() {
        let left = BoundingBox::new(0.0, 100.0, 50.0, 200.0);
        let right = BoundingBox::new(W - 30.0, 100.0, 80.0, 200.0);

        let area = wrapped_overlap_area(&left, &right, W, 50.0);
        let translated = left.intersection_area(&right.shifted_x(-W));
        assert!(area > 0.0);
        assert!((area - translated).abs() < EPS);
        assert!((area - 50.0 * 200.0).abs() < EPS);

        let reversed = wrapped_overlap_area(&right, &left, W, 50.0);
        assert!((reversed - area).abs() < EPS);
    }

    #[test]
    fn overlap_track_straddling_seam() {
        let track = BoundingBox::new(3790.0, 0.0, 80.0, 100.0);
        let det = BoundingBox::new(0.0, 0.0, 50.0, 100.0);
        let area = wrapped_overlap_area(&track, &det, W, 50.0);
        assert!((area - track.intersection_area(&det.shifted_x(W))).abs() < EPS);
        assert!((area - 30.0 * 100.0).abs() < EPS);
    }

    #[test]
    fn no_wrap_far_from_edges() {
        let a = BoundingBox::new(1000.0, 0.0, 100.0, 100.0);
        let b = BoundingBox::new(1050.0, 0.0, 100.0, 100.0);
        assert_eq!(wrapped_overlap_area(&a, &b, W, 50.0), 5000.0);

        let c = BoundingBox::new(2000.0, 0.0, 100.0, 100.0);
        assert_eq!(wrapped_overlap_area(&a, &c, W, 50.0), 0.0);
    }

    #[test]
    fn wrapped_distance() {
        let a = BoundingBox::new(0.0, 100.0, 20.0, 20.0);
        let b = BoundingBox::new(W - 20.0, 100.0, 20.0, 20.0);
        assert_eq!(a.center().0, 10.0);
        assert_eq!(b.center().0, W - 10.0);
        assert!((calculate_wrapped_distance(&a, &b, W) - 20.0).abs() < EPS);

        let c = BoundingBox::new(0.0, 130.0, 20.0, 20.0);
        assert!((calculate_wrapped_distance(&a, &c, W) - 30.0).abs() < EPS);
    }

    #[test]
    fn edge_jumps() {
        let m = EdgeMargins::new(W, 1.0 / 14.0, 13.0 / 14.0);
        let at_left = BoundingBox::new(10.0, 0.0, 50.0, 100.0);
        let at_right = BoundingBox::new(3700.0, 0.0, 50.0, 100.0);
        let mid_left = BoundingBox::new(500.0, 0.0, 50.0, 100.0);

        assert!(m.is_in_margin(&at_left));
        assert!(m.is_in_margin(&at_right));
        assert!(!m.is_in_margin(&mid_left));

        assert!(is_edge_jump(&at_left, &at_right, &m));
        assert!(is_edge_jump(&at_right, &at_left, &m));
        assert!(!is_edge_jump(&at_left, &mid_left, &m));
        assert!(!is_edge_jump(&mid_left, &at_left, &m));
    }

    #[test]
    fn roll() {
        assert_eq!(roll_x(3800.0, 100, W), 60.0);
        assert_eq!(unroll_x(60.0, 100, W), 3800.0);
        assert_eq!(roll_x(10.0, -20, W), 3830.0);
    }
}
