use crate::utils::panorama::roll_x;
use crate::EstimateClose;
use serde::{Deserialize, Serialize};

/// Bounding box in the format (x, y, width, height), in pixels of the rotated panoramic frame.
///
/// The box is persisted as the JSON array `[x, y, w, h]`.
///
#[derive(Clone, Default, Debug, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl BoundingBox {
    /// Constructor
    ///
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates the box from detector corners `(x_min, y_min, x_max, y_max)`
    ///
    pub fn from_xyxy(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self::new(x_min, y_min, x_max - x_min, y_max - y_min)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal span `(left edge, right edge)`
    ///
    pub fn horizontal_span(&self) -> (f64, f64) {
        (self.left(), self.right())
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns a copy moved horizontally by `dx` pixels
    ///
    pub fn shifted_x(&self, dx: f64) -> Self {
        Self {
            x: self.x + dx,
            ..*self
        }
    }

    /// Returns a copy with `x` moved into the frame rolled by `rotate_amount`
    ///
    pub fn rolled(&self, rotate_amount: i64, frame_width: f64) -> Self {
        Self {
            x: roll_x(self.x, rotate_amount, frame_width),
            ..*self
        }
    }

    /// Plain (non-wrapping) intersection area. Boxes that only touch have zero intersection.
    ///
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let x_left = self.left().max(other.left());
        let y_top = self.top().max(other.top());
        let x_right = self.right().min(other.right());
        let y_bottom = self.bottom().min(other.bottom());

        if x_right < x_left || y_bottom < y_top {
            return 0.0;
        }

        (x_right - x_left) * (y_bottom - y_top)
    }

    /// Point lies strictly inside, the border does not count
    ///
    pub fn contains_strict(&self, x: f64, y: f64) -> bool {
        self.left() < x && x < self.right() && self.top() < y && y < self.bottom()
    }

    /// Point lies inside or on the border
    ///
    pub fn contains_inclusive(&self, x: f64, y: f64) -> bool {
        self.left() <= x && x <= self.right() && self.top() <= y && y <= self.bottom()
    }
}

impl EstimateClose for BoundingBox {
    fn almost_same(&self, other: &Self, eps: f64) -> bool {
        (self.x - other.x).abs() < eps
            && (self.y - other.y).abs() < eps
            && (self.width - other.width).abs() < eps
            && (self.height - other.height).abs() < eps
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        BoundingBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}
