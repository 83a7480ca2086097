//! Closed loops of monotone subcurves and their orientation.
//!
//! Outer boundaries wind CCW and holes wind CW, so every boundary
//! entering a region is normalized to CCW first.

use kurbo::{BezPath, Point, Rect, Shape};
use log::debug;

use crate::monotone::XMonotoneSubcurve;

/// Winding direction of a closed boundary (y-up coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
}

/// A closed, head-to-tail chain of x-monotone subcurves.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvedPolygonBoundary {
    subcurves: Vec<XMonotoneSubcurve>,
}

impl CurvedPolygonBoundary {
    /// Wrap subcurves whose endpoints already chain and close exactly.
    pub(crate) fn from_closed_chain(subcurves: Vec<XMonotoneSubcurve>) -> Self {
        Self { subcurves }
    }

    pub fn subcurves(&self) -> &[XMonotoneSubcurve] {
        &self.subcurves
    }

    pub fn len(&self) -> usize {
        self.subcurves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subcurves.is_empty()
    }

    /// Exact signed area enclosed by the curves.
    ///
    /// Positive = counter-clockwise, negative = clockwise.
    pub fn signed_area(&self) -> f64 {
        self.subcurves.iter().map(XMonotoneSubcurve::signed_area).sum()
    }

    pub fn orientation(&self) -> Orientation {
        if self.signed_area() >= 0.0 {
            Orientation::CounterClockwise
        } else {
            Orientation::Clockwise
        }
    }

    /// Same loop traversed the other way.
    pub fn reversed(&self) -> Self {
        Self {
            subcurves: self.subcurves.iter().rev().map(XMonotoneSubcurve::reversed).collect(),
        }
    }

    /// This loop with counter-clockwise orientation.
    pub fn normalized(self) -> Self {
        match self.orientation() {
            Orientation::CounterClockwise => self,
            Orientation::Clockwise => {
                debug!("boundary of {} subcurves is clockwise, reversing", self.len());
                self.reversed()
            }
        }
    }

    /// The loop as a closed kurbo path.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        append_loop(&mut path, &self.subcurves);
        path
    }

    /// Nonzero-winding containment test.
    pub fn contains(&self, point: Point) -> bool {
        self.to_bez_path().winding(point) != 0
    }

    pub fn bounding_box(&self) -> Rect {
        self.to_bez_path().bounding_box()
    }
}

/// Append one closed loop of subcurves to `path`.
pub(crate) fn append_loop(path: &mut BezPath, subcurves: &[XMonotoneSubcurve]) {
    let Some(first) = subcurves.first() else {
        return;
    };
    path.move_to(first.source());
    for subcurve in subcurves {
        let cubic = subcurve.cubic();
        path.curve_to(cubic.p1, cubic.p2, cubic.p3);
    }
    path.close_path();
}
