//! Overlay of two regions' boundaries.
//!
//! Both operands' subcurves are cut wherever they meet, so each piece
//! lies entirely inside, outside or on the other operand's boundary.
//! The operation then decides, per piece, whether it belongs to the
//! result boundary and in which direction.

use kurbo::{BezPath, ParamCurveExtrema, Point, Rect, Shape, Vec2};

use super::intersect::{find_contacts, locate, Contact, Cut};
use crate::config::ArrangementConfig;
use crate::geom::{boxes_overlap, points_close};
use crate::monotone::XMonotoneSubcurve;
use crate::region::SetOperation;

/// Sample positions that must all lie on the other boundary for a piece
/// to count as shared.
const SHARED_SAMPLES: [f64; 3] = [0.25, 0.5, 0.75];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    First,
    Second,
}

/// Where a piece sits relative to the other operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Inside,
    Outside,
    /// On the other boundary, travelling the same way.
    SharedSame,
    /// On the other boundary, travelling the opposite way.
    SharedOpposite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keep {
    Drop,
    Forward,
    Reversed,
}

/// Whether a piece contributes to the result of `op`.
///
/// Shared stretches are contributed by the first operand only.
pub(crate) fn selection(op: SetOperation, operand: Operand, placement: Placement) -> Keep {
    use Operand::{First, Second};
    use Placement::{Inside, Outside, SharedOpposite, SharedSame};
    use SetOperation::*;
    match (op, operand, placement) {
        (Intersection, _, Inside) => Keep::Forward,
        (Intersection, First, SharedSame) => Keep::Forward,
        (Union, _, Outside) => Keep::Forward,
        (Union, First, SharedSame) => Keep::Forward,
        (Difference, First, Outside) => Keep::Forward,
        (Difference, First, SharedOpposite) => Keep::Forward,
        (Difference, Second, Inside) => Keep::Reversed,
        (SymmetricDifference, _, Outside) => Keep::Forward,
        (SymmetricDifference, _, Inside) => Keep::Reversed,
        _ => Keep::Drop,
    }
}

/// Subcurves of one operand with their tight bounding boxes.
pub(crate) struct EdgeSet {
    pub curves: Vec<XMonotoneSubcurve>,
    pub boxes: Vec<Rect>,
    /// All loops of the operand, for winding queries.
    pub path: BezPath,
}

impl EdgeSet {
    pub fn new(curves: Vec<XMonotoneSubcurve>, path: BezPath) -> Self {
        let boxes = curves
            .iter()
            .map(|c| ParamCurveExtrema::bounding_box(&c.cubic()))
            .collect();
        Self { curves, boxes, path }
    }
}

/// Cut both operands at every contact between them.
///
/// Both pieces at a contact are cut at the same point, so the result
/// pieces of both operands share their vertices exactly.
/// Returns the pieces of each operand, in boundary order.
pub(crate) fn split_edges(
    first: &EdgeSet,
    second: &EdgeSet,
    config: &ArrangementConfig,
) -> (Vec<XMonotoneSubcurve>, Vec<XMonotoneSubcurve>) {
    let mut first_cuts: Vec<Vec<Cut>> = vec![Vec::new(); first.curves.len()];
    let mut second_cuts: Vec<Vec<Cut>> = vec![Vec::new(); second.curves.len()];

    for (i, a) in first.curves.iter().enumerate() {
        for (j, b) in second.curves.iter().enumerate() {
            if !boxes_overlap(first.boxes[i], second.boxes[j], config.point_tolerance) {
                continue;
            }
            match find_contacts(a, b, config) {
                Contact::Overlap { on_first, on_second } => {
                    first_cuts[i].extend(on_first);
                    second_cuts[j].extend(on_second);
                }
                Contact::Crossings(hits) => {
                    for hit in hits {
                        first_cuts[i].push(Cut {
                            u: hit.first,
                            point: hit.point,
                        });
                        second_cuts[j].push(Cut {
                            u: hit.second,
                            point: hit.point,
                        });
                    }
                }
            }
        }
    }

    let cut = |curves: &[XMonotoneSubcurve], cuts: Vec<Vec<Cut>>| -> Vec<XMonotoneSubcurve> {
        curves
            .iter()
            .zip(cuts)
            .flat_map(|(curve, cuts)| curve.split_at(&clean_cuts(curve, cuts, config)))
            .collect()
    };
    (cut(&first.curves, first_cuts), cut(&second.curves, second_cuts))
}

/// Sort, drop cuts at the piece's own endpoints, and merge near-duplicates.
fn clean_cuts(curve: &XMonotoneSubcurve, mut cuts: Vec<Cut>, config: &ArrangementConfig) -> Vec<(f64, Point)> {
    cuts.sort_by(|a, b| a.u.total_cmp(&b.u));
    let mut kept: Vec<(f64, Point)> = Vec::with_capacity(cuts.len());
    let mut last_point = curve.source();
    for Cut { u, point } in cuts {
        if u <= config.param_tolerance || u >= 1.0 - config.param_tolerance {
            continue;
        }
        if points_close(point, last_point, config.point_tolerance)
            || points_close(point, curve.target(), config.point_tolerance)
        {
            continue;
        }
        kept.push((u, point));
        last_point = point;
    }
    kept
}

/// Place `piece` relative to the operand described by `other`.
pub(crate) fn classify(piece: &XMonotoneSubcurve, other: &EdgeSet, config: &ArrangementConfig) -> Placement {
    let midpoint = piece.point_at(0.5);

    let shared = SHARED_SAMPLES
        .iter()
        .all(|&u| on_boundary(piece.point_at(u), other, config).is_some());
    if shared {
        if let Some(along) = on_boundary(midpoint, other, config) {
            return if direction(piece, 0.5).dot(along) > 0.0 {
                Placement::SharedSame
            } else {
                Placement::SharedOpposite
            };
        }
    }

    if other.path.winding(midpoint) != 0 {
        Placement::Inside
    } else {
        Placement::Outside
    }
}

/// Travel direction of the other boundary at `point`, if `point` is on it.
fn on_boundary(point: Point, other: &EdgeSet, config: &ArrangementConfig) -> Option<Vec2> {
    let spot = Rect::from_points(point, point);
    other
        .curves
        .iter()
        .zip(&other.boxes)
        .filter(|(_, bbox)| boxes_overlap(**bbox, spot, config.point_tolerance))
        .find_map(|(curve, _)| locate(point, curve, config).map(|u| direction(curve, u)))
}

/// Tangent at `u`, falling back to a short chord where the tangent vanishes.
pub(crate) fn direction(curve: &XMonotoneSubcurve, u: f64) -> Vec2 {
    let tangent = curve.tangent_at(u);
    if tangent.hypot() > 1e-12 {
        return tangent;
    }
    let (lo, hi) = ((u - 1e-3).max(0.0), (u + 1e-3).min(1.0));
    curve.point_at(hi) - curve.point_at(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_keeps_shared_stretch_once() {
        let op = SetOperation::Intersection;
        assert_eq!(selection(op, Operand::First, Placement::SharedSame), Keep::Forward);
        assert_eq!(selection(op, Operand::Second, Placement::SharedSame), Keep::Drop);
        assert_eq!(selection(op, Operand::First, Placement::SharedOpposite), Keep::Drop);
    }

    #[test]
    fn difference_reverses_subtrahend_inside() {
        let op = SetOperation::Difference;
        assert_eq!(selection(op, Operand::Second, Placement::Inside), Keep::Reversed);
        assert_eq!(selection(op, Operand::Second, Placement::Outside), Keep::Drop);
        assert_eq!(selection(op, Operand::First, Placement::Inside), Keep::Drop);
        assert_eq!(selection(op, Operand::First, Placement::SharedOpposite), Keep::Forward);
    }

    #[test]
    fn symmetric_difference_is_operand_agnostic() {
        let op = SetOperation::SymmetricDifference;
        for placement in [
            Placement::Inside,
            Placement::Outside,
            Placement::SharedSame,
            Placement::SharedOpposite,
        ] {
            assert_eq!(
                selection(op, Operand::First, placement),
                selection(op, Operand::Second, placement)
            );
        }
    }
}
