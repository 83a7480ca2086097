//! Read-only views of a region and their serialized form.
//!
//! Coordinates are plain f64 only here, at the serialization boundary.
//! Hole geometry is not exported: a component reports how many holes it
//! has, and its outer boundary.

use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

use crate::boundary::{append_loop, CurvedPolygonBoundary};
use crate::monotone::XMonotoneSubcurve;
use crate::region::CurvedRegion;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for PointRecord {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointRecord> for Point {
    fn from(p: PointRecord) -> Self {
        Point::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingCurveRecord {
    pub control_points: [PointRecord; 4],
}

/// One subcurve of an outer boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    pub source: PointRecord,
    pub target: PointRecord,
    pub supporting_curve: SupportingCurveRecord,
}

impl From<&XMonotoneSubcurve> for CurveRecord {
    fn from(c: &XMonotoneSubcurve) -> Self {
        let control_points = c.supporting_curve().control_points().map(PointRecord::from);
        Self {
            source: c.source().into(),
            target: c.target().into(),
            supporting_curve: SupportingCurveRecord { control_points },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonRecord {
    pub unbounded: bool,
    pub number_of_holes: usize,
    pub outer_boundary: Vec<CurveRecord>,
}

/// Top-level output document: `{"polygons": [...]}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonsDocument {
    pub polygons: Vec<PolygonRecord>,
}

/// One component of a result.
#[derive(Debug, Clone, Copy)]
pub struct ComponentView<'a> {
    unbounded: bool,
    number_of_holes: usize,
    outer: &'a CurvedPolygonBoundary,
}

impl<'a> ComponentView<'a> {
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    pub fn number_of_holes(&self) -> usize {
        self.number_of_holes
    }

    /// Outer boundary subcurves, in boundary order.
    pub fn outer_boundary(&self) -> &'a [XMonotoneSubcurve] {
        self.outer.subcurves()
    }

    pub fn outer_path(&self) -> BezPath {
        let mut path = BezPath::new();
        append_loop(&mut path, self.outer.subcurves());
        path
    }

    /// SVG path data (`d` attribute) of the outer boundary.
    pub fn svg_path(&self) -> String {
        self.outer_path().to_svg()
    }

    pub fn to_record(&self) -> PolygonRecord {
        PolygonRecord {
            unbounded: self.unbounded,
            number_of_holes: self.number_of_holes,
            outer_boundary: self.outer.subcurves().iter().map(CurveRecord::from).collect(),
        }
    }
}

/// The components of a region, in the engine's enumeration order.
///
/// The order is not stable across engines or operand order.
#[derive(Debug, Clone)]
pub struct BooleanResult<'a> {
    components: Vec<ComponentView<'a>>,
}

impl<'a> BooleanResult<'a> {
    pub fn components(&self) -> &[ComponentView<'a>] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn to_document(&self) -> PolygonsDocument {
        PolygonsDocument {
            polygons: self.components.iter().map(ComponentView::to_record).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }
}

/// Enumerate the components of `region`.
pub fn extract(region: &CurvedRegion) -> BooleanResult<'_> {
    let components = region
        .components()
        .iter()
        .map(|c| ComponentView {
            unbounded: c.is_unbounded(),
            number_of_holes: c.number_of_holes(),
            outer: c.outer_boundary(),
        })
        .collect();
    BooleanResult { components }
}
