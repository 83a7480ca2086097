//! Contacts between pairs of monotone subcurves.
//!
//! Two pieces either run along each other for some stretch (overlap) or
//! meet at isolated points (crossings). Overlaps are detected first from
//! endpoints lying on the other piece, then confirmed with interior
//! samples. Crossings are found by recursive bounding-box subdivision;
//! a box pair stops splitting as soon as the first piece's stretch lies
//! along the second piece. Neighbouring stopped stretches are merged into
//! runs, and each run becomes one Newton-refined crossing, or its two
//! ends when the pieces only graze.
//!
//! Every contact point is shared by both pieces, and snapped onto an
//! existing endpoint when one is within tolerance, so cut pieces of both
//! operands meet at identical vertices.

use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, ParamCurveNearest, Point};
use log::debug;

use crate::config::ArrangementConfig;
use crate::geom::{box_extent, boxes_overlap, control_box, points_close};
use crate::monotone::XMonotoneSubcurve;

/// Interior samples used to confirm an overlap.
const OVERLAP_SAMPLES: usize = 3;

/// Samples along a stretch that must all lie on the other piece.
const RUN_SAMPLES: usize = 4;

const NEWTON_STEPS: usize = 8;

/// Crossings whose tangents meet at a smaller sine are resolved from the
/// run they lie in rather than by Newton.
const MIN_CROSSING_SINE: f64 = 1e-3;

/// Where a piece is cut: local parameter and the exact vertex to use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cut {
    pub u: f64,
    pub point: Point,
}

/// An isolated meeting point, with local parameters on both pieces.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurveHit {
    pub first: f64,
    pub second: f64,
    pub point: Point,
}

#[derive(Debug, Clone)]
pub(crate) enum Contact {
    /// The pieces share a stretch. Each list holds the cuts where the
    /// other piece's endpoints land.
    Overlap { on_first: Vec<Cut>, on_second: Vec<Cut> },
    Crossings(Vec<CurveHit>),
}

/// Local parameter of `point` on `curve`, if it lies on it.
pub(crate) fn locate(point: Point, curve: &XMonotoneSubcurve, config: &ArrangementConfig) -> Option<f64> {
    locate_on(point, &curve.cubic(), config)
}

fn locate_on(point: Point, cubic: &CubicBez, config: &ArrangementConfig) -> Option<f64> {
    let reach = control_box(cubic).inflate(config.point_tolerance, config.point_tolerance);
    if !reach.contains(point) {
        return None;
    }
    let nearest = cubic.nearest(point, config.nearest_accuracy);
    if nearest.distance_sq.sqrt() <= config.point_tolerance {
        Some(nearest.t)
    } else {
        None
    }
}

/// Find how `first` and `second` touch.
pub(crate) fn find_contacts(
    first: &XMonotoneSubcurve,
    second: &XMonotoneSubcurve,
    config: &ArrangementConfig,
) -> Contact {
    if let Some((on_first, on_second)) = overlap(first, second, config) {
        return Contact::Overlap { on_first, on_second };
    }
    Contact::Crossings(crossings(first, second, config))
}

fn overlap(
    first: &XMonotoneSubcurve,
    second: &XMonotoneSubcurve,
    config: &ArrangementConfig,
) -> Option<(Vec<Cut>, Vec<Cut>)> {
    let second_source_on_first = locate(second.source(), first, config);
    let second_target_on_first = locate(second.target(), first, config);
    let first_source_on_second = locate(first.source(), second, config);
    let first_target_on_second = locate(first.target(), second, config);

    // Stretch of `first` that may lie along `second`.
    let mut along_first: Vec<f64> = Vec::with_capacity(4);
    if first_source_on_second.is_some() {
        along_first.push(0.0);
    }
    if first_target_on_second.is_some() {
        along_first.push(1.0);
    }
    along_first.extend(second_source_on_first);
    along_first.extend(second_target_on_first);
    if along_first.len() < 2 {
        return None;
    }

    let lo = along_first.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = along_first.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if points_close(first.point_at(lo), first.point_at(hi), config.point_tolerance) {
        return None;
    }

    let step = (hi - lo) / (OVERLAP_SAMPLES + 1) as f64;
    for k in 1..=OVERLAP_SAMPLES {
        let sample = first.point_at(lo + step * k as f64);
        locate(sample, second, config)?;
    }

    let cuts = |landings: [(Option<f64>, Point); 2]| -> Vec<Cut> {
        landings
            .into_iter()
            .filter_map(|(u, point)| u.map(|u| Cut { u, point }))
            .collect()
    };
    Some((
        cuts([
            (second_source_on_first, second.source()),
            (second_target_on_first, second.target()),
        ]),
        cuts([
            (first_source_on_second, first.source()),
            (first_target_on_second, first.target()),
        ]),
    ))
}

/// Isolated intersections by bounding-box subdivision.
fn crossings(first: &XMonotoneSubcurve, second: &XMonotoneSubcurve, config: &ArrangementConfig) -> Vec<CurveHit> {
    let c1 = first.cubic();
    let c2 = second.cubic();
    let tolerance = config.intersection_tolerance;

    // Parameter intervals of `first` that touch `second`.
    let mut stretches: Vec<(f64, f64)> = Vec::new();
    let mut stack = vec![((0.0, 1.0), (0.0, 1.0), 0usize)];
    let mut budget = config.subdivision_budget;

    while let Some(((a0, a1), (b0, b1), depth)) = stack.pop() {
        if budget == 0 {
            debug!("subdivision budget exhausted with {} candidates left", stack.len() + 1);
            break;
        }
        budget -= 1;

        let sub1 = c1.subsegment(a0..a1);
        let box1 = control_box(&sub1);
        let box2 = control_box(&c2.subsegment(b0..b1));
        if !boxes_overlap(box1, box2, tolerance) {
            continue;
        }

        let small = box_extent(box1) <= tolerance && box_extent(box2) <= tolerance;
        if small || depth >= config.max_subdivision_depth || lies_along(&sub1, &c2, config) {
            stretches.push((a0, a1));
            continue;
        }

        let am = 0.5 * (a0 + a1);
        let bm = 0.5 * (b0 + b1);
        for a in [(a0, am), (am, a1)] {
            for b in [(b0, bm), (bm, b1)] {
                stack.push((a, b, depth + 1));
            }
        }
    }

    let hits = merge_runs(stretches, &c1, config)
        .into_iter()
        .flat_map(|run| resolve_run(run, &c1, &c2, config))
        .map(|hit| snap_to_ends(hit, first, second, config.point_tolerance))
        .collect();
    merge_hits(hits, config.point_tolerance)
}

/// Whether every sample of `sub` lies on `other`.
fn lies_along(sub: &CubicBez, other: &CubicBez, config: &ArrangementConfig) -> bool {
    (0..=RUN_SAMPLES).all(|k| locate_on(sub.eval(k as f64 / RUN_SAMPLES as f64), other, config).is_some())
}

/// Join touching or overlapping stretches into maximal runs.
fn merge_runs(mut stretches: Vec<(f64, f64)>, c1: &CubicBez, config: &ArrangementConfig) -> Vec<(f64, f64)> {
    stretches.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut runs: Vec<(f64, f64)> = Vec::with_capacity(stretches.len());
    for (s0, s1) in stretches {
        if let Some(last) = runs.last_mut() {
            let joined = s0 <= last.1 + config.param_tolerance
                || points_close(c1.eval(last.1), c1.eval(s0), config.point_tolerance);
            if joined {
                last.1 = last.1.max(s1);
                continue;
            }
        }
        runs.push((s0, s1));
    }
    runs
}

/// One crossing for a transversal run, both ends for a grazing one.
fn resolve_run((s0, s1): (f64, f64), c1: &CubicBez, c2: &CubicBez, config: &ArrangementConfig) -> Vec<CurveHit> {
    let sm = 0.5 * (s0 + s1);
    let start = c1.eval(s0);
    let end = c1.eval(s1);
    let span = (end - start).hypot();

    let guess = hit_at(sm, c1, c2, config);
    if let Some(hit) = refine(guess, c1, c2, config) {
        if points_close(hit.point, guess.point, span + 2.0 * config.point_tolerance) {
            return vec![hit];
        }
    }
    if span <= config.point_tolerance {
        return vec![guess];
    }
    vec![hit_at(s0, c1, c2, config), hit_at(s1, c1, c2, config)]
}

fn hit_at(s: f64, c1: &CubicBez, c2: &CubicBez, config: &ArrangementConfig) -> CurveHit {
    let p = c1.eval(s);
    let t = c2.nearest(p, config.nearest_accuracy).t;
    CurveHit {
        first: s,
        second: t,
        point: p.midpoint(c2.eval(t)),
    }
}

/// Newton iteration on `c1(s) - c2(t) = 0`.
///
/// `None` when the tangents are (nearly) parallel or the iteration does
/// not settle within `intersection_tolerance`.
fn refine(guess: CurveHit, c1: &CubicBez, c2: &CubicBez, config: &ArrangementConfig) -> Option<CurveHit> {
    let d1c = c1.deriv();
    let d2c = c2.deriv();
    let transversal = |s: f64, t: f64| {
        let d1 = d1c.eval(s).to_vec2();
        let d2 = d2c.eval(t).to_vec2();
        let cross = d1.cross(d2);
        (cross.abs() > MIN_CROSSING_SINE * d1.hypot() * d2.hypot()).then_some((d1, d2, cross))
    };

    let (mut s, mut t) = (guess.first, guess.second);
    for _ in 0..NEWTON_STEPS {
        let r = c1.eval(s) - c2.eval(t);
        if r.hypot() <= config.intersection_tolerance {
            break;
        }
        let (d1, d2, cross) = transversal(s, t)?;
        s = (s - r.cross(d2) / cross).clamp(0.0, 1.0);
        t = (t + d1.cross(r) / cross).clamp(0.0, 1.0);
    }

    let p1 = c1.eval(s);
    let p2 = c2.eval(t);
    if (p1 - p2).hypot() > config.intersection_tolerance {
        return None;
    }
    transversal(s, t)?;
    Some(CurveHit {
        first: s,
        second: t,
        point: p1.midpoint(p2),
    })
}

/// Move a hit onto an endpoint of either piece when it is that close.
fn snap_to_ends(mut hit: CurveHit, first: &XMonotoneSubcurve, second: &XMonotoneSubcurve, tolerance: f64) -> CurveHit {
    for (u, end) in [(0.0, first.source()), (1.0, first.target())] {
        if points_close(hit.point, end, tolerance) {
            hit.first = u;
            hit.point = end;
        }
    }
    for (u, end) in [(0.0, second.source()), (1.0, second.target())] {
        if points_close(hit.point, end, tolerance) {
            hit.second = u;
            hit.point = end;
        }
    }
    hit
}

/// Drop hits that landed on an already reported point.
fn merge_hits(mut hits: Vec<CurveHit>, tolerance: f64) -> Vec<CurveHit> {
    hits.sort_by(|a, b| a.first.total_cmp(&b.first));
    let mut merged: Vec<CurveHit> = Vec::with_capacity(hits.len());
    for hit in hits {
        if merged.iter().any(|m| points_close(m.point, hit.point, tolerance)) {
            continue;
        }
        merged.push(hit);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::BezierSegment;

    fn line(a: (f64, f64), b: (f64, f64)) -> XMonotoneSubcurve {
        let a = Point::new(a.0, a.1);
        let b = Point::new(b.0, b.1);
        let cubic = CubicBez::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b);
        XMonotoneSubcurve::new(BezierSegment::new(0, cubic), 0.0, 1.0)
    }

    fn arch(offset: f64) -> XMonotoneSubcurve {
        let cubic = CubicBez::new((0.0, offset), (1.0, 3.0 + offset), (2.0, 1.0 + offset), (3.0, offset));
        XMonotoneSubcurve::new(BezierSegment::new(0, cubic), 0.0, 1.0)
    }

    #[test]
    fn crossing_lines_meet_once() {
        let config = ArrangementConfig::default();
        let horizontal = line((0.0, 1.0), (4.0, 1.0));
        let vertical = line((1.0, 0.0), (1.0, 3.0));
        match find_contacts(&horizontal, &vertical, &config) {
            Contact::Crossings(hits) => {
                assert_eq!(hits.len(), 1);
                assert!((hits[0].first - 0.25).abs() < 1e-9);
                assert!((hits[0].second - 1.0 / 3.0).abs() < 1e-9);
                assert!(points_close(hits[0].point, Point::new(1.0, 1.0), 1e-12));
            }
            other => panic!("expected crossings, got {:?}", other),
        }
    }

    #[test]
    fn crossing_is_refined_onto_both_lines() {
        let config = ArrangementConfig::default();
        let right_edge = line((4.0, 0.0), (4.0, 4.0));
        let bottom_edge = line((2.0, 2.0), (6.0, 2.0));
        match find_contacts(&right_edge, &bottom_edge, &config) {
            Contact::Crossings(hits) => {
                assert_eq!(hits.len(), 1);
                let p = hits[0].point;
                assert!((p.x - 4.0).abs() < 1e-12 && (p.y - 2.0).abs() < 1e-12, "drifted to {:?}", p);
            }
            other => panic!("expected crossings, got {:?}", other),
        }
    }

    #[test]
    fn curve_crosses_line_twice() {
        let config = ArrangementConfig::default();
        let a = arch(0.0);
        let b = line((0.0, 1.0), (3.0, 1.0));
        match find_contacts(&a, &b, &config) {
            Contact::Crossings(hits) => assert_eq!(hits.len(), 2, "hits: {:?}", hits),
            other => panic!("expected crossings, got {:?}", other),
        }
    }

    #[test]
    fn separate_curves_do_not_meet() {
        let config = ArrangementConfig::default();
        match find_contacts(&arch(0.0), &arch(5.0), &config) {
            Contact::Crossings(hits) => assert!(hits.is_empty()),
            other => panic!("expected no contact, got {:?}", other),
        }
    }

    #[test]
    fn collinear_lines_overlap() {
        let config = ArrangementConfig::default();
        let a = line((0.0, 0.0), (3.0, 0.0));
        let b = line((1.0, 0.0), (4.0, 0.0));
        match find_contacts(&a, &b, &config) {
            Contact::Overlap { on_first, on_second } => {
                assert_eq!(on_first.len(), 1);
                assert!((on_first[0].u - 1.0 / 3.0).abs() < 1e-9);
                assert_eq!(on_first[0].point, b.source());
                assert_eq!(on_second.len(), 1);
                assert!((on_second[0].u - 2.0 / 3.0).abs() < 1e-9);
                assert_eq!(on_second[0].point, a.target());
            }
            other => panic!("expected overlap, got {:?}", other),
        }
    }

    #[test]
    fn identical_curves_overlap() {
        let config = ArrangementConfig::default();
        assert!(matches!(
            find_contacts(&arch(0.0), &arch(0.0), &config),
            Contact::Overlap { .. }
        ));
    }

    #[test]
    fn lines_sharing_an_endpoint_do_not_overlap() {
        let config = ArrangementConfig::default();
        let a = line((0.0, 0.0), (2.0, 0.0));
        let b = line((2.0, 0.0), (2.0, 2.0));
        match find_contacts(&a, &b, &config) {
            Contact::Crossings(hits) => {
                assert!(hits.len() <= 1);
                for hit in hits {
                    assert_eq!(hit.point, Point::new(2.0, 0.0));
                }
            }
            other => panic!("expected crossings, got {:?}", other),
        }
    }

    #[test]
    fn nearly_collinear_stretch_gives_its_two_ends() {
        // An edge whose end drifted 1.4e-9 off the line it came from.
        let config = ArrangementConfig::default();
        let drifted = line((2.0, 2.0), (4.0, 2.0 - 1.4e-9));
        let edge = line((2.0, 2.0), (6.0, 2.0));
        let hits = crossings(&drifted, &edge, &config);
        assert_eq!(hits.len(), 2, "hits: {:?}", hits);
        assert_eq!(hits[0].point, drifted.source());
        assert_eq!(hits[1].point, drifted.target());
        assert!((hits[1].second - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tangent_touch_is_one_contact() {
        // Symmetric cubic touching y = 0 at the origin.
        let config = ArrangementConfig::default();
        let cubic = CubicBez::new((-1.0, 1.0), (-1.0 / 3.0, -1.0 / 3.0), (1.0 / 3.0, -1.0 / 3.0), (1.0, 1.0));
        let cup = XMonotoneSubcurve::new(BezierSegment::new(0, cubic), 0.0, 1.0);
        let floor = line((-2.0, 0.0), (2.0, 0.0));
        match find_contacts(&cup, &floor, &config) {
            Contact::Crossings(hits) => {
                assert!(!hits.is_empty() && hits.len() <= 2, "hits: {:?}", hits);
                for hit in hits {
                    assert!(hit.point.to_vec2().hypot() < 1e-2, "hit far from tangency: {:?}", hit);
                }
            }
            other => panic!("expected crossings, got {:?}", other),
        }
    }

    #[test]
    fn locate_finds_points_on_curve() {
        let config = ArrangementConfig::default();
        let a = arch(0.0);
        let p = a.point_at(0.3);
        let u = locate(p, &a, &config).unwrap();
        assert!((u - 0.3).abs() < 1e-6);
        assert!(locate(Point::new(1.5, -1.0), &a, &config).is_none());
    }
}
