//! Control points → closed sequence of cubic segments.
//!
//! Every third control point is an anchor (on-curve); the two points
//! between anchors are handles. Segment `i` uses points `3i..=3i+3`,
//! indices taken modulo the sequence length, so the last segment ends
//! on the first anchor and the path is closed.

use kurbo::{Affine, CubicBez, ParamCurve, Point};
use log::debug;

use crate::error::RegionError;

/// Control points per segment stride.
pub const SEGMENT_STRIDE: usize = 3;

/// Fewest control points that describe a closed path (two segments).
pub const MIN_CONTROL_POINTS: usize = 6;

/// One cubic segment of a closed path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierSegment {
    index: usize,
    cubic: CubicBez,
}

impl BezierSegment {
    pub fn new(index: usize, cubic: CubicBez) -> Self {
        Self { index, cubic }
    }

    /// Position of this segment within its path.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cubic(&self) -> CubicBez {
        self.cubic
    }

    /// The four control points: anchor, handle, handle, anchor.
    pub fn control_points(&self) -> [Point; 4] {
        [self.cubic.p0, self.cubic.p1, self.cubic.p2, self.cubic.p3]
    }

    pub fn eval(&self, t: f64) -> Point {
        self.cubic.eval(t)
    }
}

/// Build the closed sequence of cubic segments for one path.
///
/// Fails with [`RegionError::MalformedInput`] unless the point count is a
/// multiple of 3 and at least 6. Degenerate segments are kept as given.
pub fn build_segments(points: &[Point]) -> Result<Vec<BezierSegment>, RegionError> {
    let n = points.len();
    if n % SEGMENT_STRIDE != 0 || n < MIN_CONTROL_POINTS {
        return Err(RegionError::MalformedInput { len: n });
    }

    let segments: Vec<BezierSegment> = (0..n / SEGMENT_STRIDE)
        .map(|i| {
            let offset = i * SEGMENT_STRIDE;
            let cubic = CubicBez::new(
                points[offset],
                points[offset + 1],
                points[offset + 2],
                points[(offset + 3) % n],
            );
            BezierSegment::new(i, cubic)
        })
        .collect();

    debug!("built {} segments from {} control points", segments.len(), n);
    Ok(segments)
}

/// Apply an affine map to every control point.
pub fn transform_points(points: &[Point], transform: Affine) -> Vec<Point> {
    points.iter().map(|&p| transform * p).collect()
}
