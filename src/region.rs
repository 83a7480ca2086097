//! Curved regions and their boolean composition.
//!
//! A [`CurvedRegion`] is logically immutable: every set operation borrows
//! both operands and returns a fresh region, so neither input is
//! invalidated by a composition.

use std::fmt;

use kurbo::{BezPath, Point, Shape};
use log::debug;

use crate::arrangement::Arrangement;
use crate::boundary::{append_loop, CurvedPolygonBoundary};
use crate::error::RegionError;

/// Boolean set operation between two regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperation {
    Intersection,
    Union,
    /// First operand minus second.
    Difference,
    SymmetricDifference,
}

impl fmt::Display for SetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetOperation::Intersection => "intersection",
            SetOperation::Union => "union",
            SetOperation::Difference => "difference",
            SetOperation::SymmetricDifference => "symmetric difference",
        };
        f.write_str(name)
    }
}

/// One connected component: an outer boundary and the holes inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonWithHoles {
    outer: CurvedPolygonBoundary,
    holes: Vec<CurvedPolygonBoundary>,
    unbounded: bool,
}

impl PolygonWithHoles {
    /// `outer` must be CCW, every hole CW and nested inside `outer`.
    pub fn new(outer: CurvedPolygonBoundary, holes: Vec<CurvedPolygonBoundary>) -> Self {
        Self {
            outer,
            holes,
            unbounded: false,
        }
    }

    pub fn outer_boundary(&self) -> &CurvedPolygonBoundary {
        &self.outer
    }

    pub fn holes(&self) -> &[CurvedPolygonBoundary] {
        &self.holes
    }

    pub fn number_of_holes(&self) -> usize {
        self.holes.len()
    }

    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    /// Outer area minus hole areas.
    pub fn area(&self) -> f64 {
        self.outer.signed_area() + self.holes.iter().map(|h| h.signed_area()).sum::<f64>()
    }
}

/// A set of non-overlapping curved components.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurvedRegion {
    components: Vec<PolygonWithHoles>,
}

impl CurvedRegion {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A region with exactly one component and no holes.
    pub fn from_boundary(boundary: CurvedPolygonBoundary) -> Self {
        Self {
            components: vec![PolygonWithHoles::new(boundary.normalized(), Vec::new())],
        }
    }

    pub fn from_components(components: Vec<PolygonWithHoles>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[PolygonWithHoles] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Every boundary loop: outer boundaries and holes.
    pub fn boundaries(&self) -> impl Iterator<Item = &CurvedPolygonBoundary> {
        self.components
            .iter()
            .flat_map(|c| std::iter::once(&c.outer).chain(c.holes.iter()))
    }

    pub fn area(&self) -> f64 {
        self.components.iter().map(PolygonWithHoles::area).sum()
    }

    /// All loops as one kurbo path (nonzero fill gives the region).
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for boundary in self.boundaries() {
            append_loop(&mut path, boundary.subcurves());
        }
        path
    }

    pub fn contains(&self, point: Point) -> bool {
        self.to_bez_path().winding(point) != 0
    }

    /// Apply `op` to `self` and `other` with `engine`.
    pub fn compose<A: Arrangement + ?Sized>(
        &self,
        op: SetOperation,
        other: &CurvedRegion,
        engine: &A,
    ) -> Result<CurvedRegion, RegionError> {
        let result = engine
            .compose(op, self, other)
            .map_err(|source| RegionError::in_operation(op, source))?;
        debug!(
            "{}: {} + {} components \u{2192} {} components",
            op,
            self.components.len(),
            other.components.len(),
            result.components.len()
        );
        Ok(result)
    }

    pub fn intersect<A: Arrangement + ?Sized>(&self, other: &CurvedRegion, engine: &A) -> Result<CurvedRegion, RegionError> {
        self.compose(SetOperation::Intersection, other, engine)
    }

    pub fn union<A: Arrangement + ?Sized>(&self, other: &CurvedRegion, engine: &A) -> Result<CurvedRegion, RegionError> {
        self.compose(SetOperation::Union, other, engine)
    }

    pub fn difference<A: Arrangement + ?Sized>(&self, other: &CurvedRegion, engine: &A) -> Result<CurvedRegion, RegionError> {
        self.compose(SetOperation::Difference, other, engine)
    }

    pub fn symmetric_difference<A: Arrangement + ?Sized>(
        &self,
        other: &CurvedRegion,
        engine: &A,
    ) -> Result<CurvedRegion, RegionError> {
        self.compose(SetOperation::SymmetricDifference, other, engine)
    }
}

/// Intersection of two regions. Neither operand is modified.
pub fn intersect<A: Arrangement + ?Sized>(a: &CurvedRegion, b: &CurvedRegion, engine: &A) -> Result<CurvedRegion, RegionError> {
    a.intersect(b, engine)
}

/// Intersection of all `regions`, folded left to right.
///
/// An empty slice gives [`RegionError::EmptyInput`].
pub fn intersect_all<A: Arrangement + ?Sized>(regions: &[CurvedRegion], engine: &A) -> Result<CurvedRegion, RegionError> {
    let (first, rest) = regions.split_first().ok_or(RegionError::EmptyInput)?;
    rest.iter()
        .try_fold(first.clone(), |acc, region| acc.intersect(region, engine))
}
