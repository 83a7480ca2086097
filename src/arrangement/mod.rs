//! Planar arrangement engine: monotone decomposition and boolean
//! composition of curved regions.
//!
//! The pipeline talks to the engine only through [`Arrangement`], so an
//! exact-arithmetic engine can replace [`BezierArrangement`].
//!
//! `BezierArrangement` composes two regions in three stages:
//!
//! 1. **Overlay**: cut both operands' subcurves at every overlap and
//!    crossing between them (`intersect`, `overlay::split_edges`).
//! 2. **Selection**: place each piece inside, outside or on the other
//!    operand and keep it per the operation (`overlay::classify`).
//! 3. **Tracing**: chain kept pieces into loops and nest holes into
//!    outer boundaries (`trace::assemble`).

mod intersect;
mod overlay;
mod trace;

use log::{debug, warn};

use crate::boundary::CurvedPolygonBoundary;
use crate::config::ArrangementConfig;
use crate::curve::BezierSegment;
use crate::error::EngineError;
use crate::geom::{boxes_overlap, control_polygon_length, points_close};
use crate::monotone::{monotone_split_params, MonotonePiece, XMonotoneSubcurve};
use crate::region::{CurvedRegion, SetOperation};

use intersect::{find_contacts, Contact};
use overlay::{classify, selection, EdgeSet, Keep, Operand};

/// Capabilities the pipeline needs from a planar arrangement engine.
pub trait Arrangement {
    /// Gap under which two points are the same vertex.
    fn point_tolerance(&self) -> f64;

    /// Cut one cubic segment into x-monotone pieces, in parameter order.
    fn make_x_monotone(&self, segment: &BezierSegment) -> Vec<MonotonePiece>;

    /// Validate a CCW boundary and wrap it into a one-component region.
    fn insert_boundary(&self, boundary: CurvedPolygonBoundary) -> Result<CurvedRegion, EngineError>;

    /// Apply `op` to `a` and `b`, returning a fresh region.
    fn compose(&self, op: SetOperation, a: &CurvedRegion, b: &CurvedRegion) -> Result<CurvedRegion, EngineError>;
}

/// Floating-point arrangement engine built on kurbo curves.
#[derive(Debug, Clone, Default)]
pub struct BezierArrangement {
    config: ArrangementConfig,
}

impl BezierArrangement {
    pub fn new(config: ArrangementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArrangementConfig {
        &self.config
    }

    /// Reject boundaries whose subcurves meet anywhere but at shared vertices.
    fn check_simple(&self, boundary: &CurvedPolygonBoundary) -> Result<(), EngineError> {
        let edges = EdgeSet::new(boundary.subcurves().to_vec(), boundary.to_bez_path());
        let tolerance = self.config.point_tolerance;

        for i in 0..edges.curves.len() {
            for j in i + 1..edges.curves.len() {
                if !boxes_overlap(edges.boxes[i], edges.boxes[j], tolerance) {
                    continue;
                }
                let (a, b) = (&edges.curves[i], &edges.curves[j]);
                match find_contacts(a, b, &self.config) {
                    Contact::Overlap { .. } => {
                        let p = a.point_at(0.5);
                        return Err(EngineError::SelfIntersection { x: p.x, y: p.y });
                    }
                    Contact::Crossings(hits) => {
                        if let Some(hit) = hits.iter().find(|h| !at_shared_vertex(h.point, a, b, tolerance)) {
                            return Err(EngineError::SelfIntersection {
                                x: hit.point.x,
                                y: hit.point.y,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Whether `point` is a vertex where `a` and `b` join.
fn at_shared_vertex(point: kurbo::Point, a: &XMonotoneSubcurve, b: &XMonotoneSubcurve, tolerance: f64) -> bool {
    [a.source(), a.target()].iter().any(|&end_a| {
        points_close(point, end_a, tolerance)
            && [b.source(), b.target()]
                .iter()
                .any(|&end_b| points_close(end_a, end_b, tolerance))
    })
}

impl Arrangement for BezierArrangement {
    fn point_tolerance(&self) -> f64 {
        self.config.point_tolerance
    }

    fn make_x_monotone(&self, segment: &BezierSegment) -> Vec<MonotonePiece> {
        let splits = monotone_split_params(
            &segment.cubic(),
            self.config.param_tolerance,
            self.config.point_tolerance,
        );
        let mut bounds = Vec::with_capacity(splits.len() + 2);
        bounds.push(0.0);
        bounds.extend(splits);
        bounds.push(1.0);

        bounds
            .windows(2)
            .map(|w| {
                let piece = XMonotoneSubcurve::new(*segment, w[0], w[1]);
                if control_polygon_length(&piece.cubic()) < self.config.min_piece_length {
                    MonotonePiece::Degenerate(piece.source())
                } else {
                    MonotonePiece::Curve(piece)
                }
            })
            .collect()
    }

    fn insert_boundary(&self, boundary: CurvedPolygonBoundary) -> Result<CurvedRegion, EngineError> {
        let subcurves = boundary.subcurves();
        if subcurves.is_empty() {
            return Err(EngineError::EmptyBoundary);
        }
        let n = subcurves.len();
        for i in 0..n {
            let gap = (subcurves[i].target() - subcurves[(i + 1) % n].source()).hypot();
            if gap > self.config.point_tolerance {
                return Err(EngineError::OpenBoundary { index: i, gap });
            }
        }
        if boundary.signed_area().abs() <= self.config.min_loop_area {
            return Err(EngineError::ZeroArea);
        }
        if let Err(err) = self.check_simple(&boundary) {
            warn!("rejecting boundary of {} subcurves: {}", n, err);
            return Err(err);
        }
        Ok(CurvedRegion::from_boundary(boundary))
    }

    fn compose(&self, op: SetOperation, a: &CurvedRegion, b: &CurvedRegion) -> Result<CurvedRegion, EngineError> {
        let edge_set = |region: &CurvedRegion| {
            let curves = region
                .boundaries()
                .flat_map(|boundary| boundary.subcurves().iter().copied())
                .collect();
            EdgeSet::new(curves, region.to_bez_path())
        };
        let first = edge_set(a);
        let second = edge_set(b);

        let (first_pieces, second_pieces) = overlay::split_edges(&first, &second, &self.config);
        debug!(
            "{}: {} + {} subcurves cut into {} + {} pieces",
            op,
            first.curves.len(),
            second.curves.len(),
            first_pieces.len(),
            second_pieces.len()
        );

        let mut selected = Vec::new();
        for (pieces, operand, other) in [
            (first_pieces, Operand::First, &second),
            (second_pieces, Operand::Second, &first),
        ] {
            for piece in pieces {
                match selection(op, operand, classify(&piece, other, &self.config)) {
                    Keep::Drop => {}
                    Keep::Forward => selected.push(piece),
                    Keep::Reversed => selected.push(piece.reversed()),
                }
            }
        }

        let components = trace::assemble(selected, &self.config).map_err(|err| {
            warn!("{} failed: {}", op, err);
            err
        })?;
        Ok(CurvedRegion::from_components(components))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monotone::BoundaryBuilder;
    use crate::test_shapes::polygon_points;

    fn boundary(corners: &[(f64, f64)], engine: &BezierArrangement) -> CurvedPolygonBoundary {
        let segments = crate::curve::build_segments(&polygon_points(corners)).unwrap();
        let mut builder = BoundaryBuilder::new(engine.point_tolerance());
        for segment in &segments {
            builder.push_segment(engine, segment);
        }
        builder.finish().unwrap().normalized()
    }

    #[test]
    fn bow_tie_is_rejected() {
        let engine = BezierArrangement::default();
        let bow_tie = boundary(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)], &engine);
        assert!(matches!(
            engine.insert_boundary(bow_tie),
            Err(EngineError::SelfIntersection { .. }) | Err(EngineError::ZeroArea)
        ));
    }

    #[test]
    fn flat_boundary_is_rejected() {
        let engine = BezierArrangement::default();
        let flat = boundary(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], &engine);
        assert!(engine.insert_boundary(flat).is_err());
    }

    #[test]
    fn simple_boundary_is_accepted() {
        let engine = BezierArrangement::default();
        let square = boundary(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], &engine);
        let region = engine.insert_boundary(square).unwrap();
        assert_eq!(region.components().len(), 1);
    }

    #[test]
    fn empty_operand_composes() {
        let engine = BezierArrangement::default();
        let square = boundary(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], &engine);
        let region = engine.insert_boundary(square).unwrap();
        let empty = CurvedRegion::empty();

        let union = engine.compose(SetOperation::Union, &empty, &region).unwrap();
        assert!((union.area() - 1.0).abs() < 1e-9);
        let meet = engine.compose(SetOperation::Intersection, &region, &empty).unwrap();
        assert!(meet.is_empty());
        let rest = engine.compose(SetOperation::Difference, &region, &empty).unwrap();
        assert!((rest.area() - 1.0).abs() < 1e-9);
    }
}
