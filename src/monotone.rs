//! X-monotone decomposition of cubic segments.
//!
//! A cubic is cut at the parameters where its x-derivative vanishes, so
//! every piece is crossed at most once by any vertical line. Segments
//! with constant x are vertical and are cut at their y-extrema instead.
//! The pieces of all segments of a path are accumulated, in order, by a
//! [`BoundaryBuilder`].

use kurbo::{CubicBez, ParamCurve, ParamCurveArea, ParamCurveDeriv, Point, Vec2};
use log::debug;

use crate::arrangement::Arrangement;
use crate::boundary::CurvedPolygonBoundary;
use crate::curve::BezierSegment;
use crate::error::EngineError;
use crate::geom::{points_close, solve_quadratic};

/// A maximal x-monotone piece of a [`BezierSegment`].
///
/// The piece runs over `t_source..t_target` of its supporting curve;
/// a reversed piece has `t_source > t_target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XMonotoneSubcurve {
    supporting: BezierSegment,
    t_source: f64,
    t_target: f64,
    source: Point,
    target: Point,
}

impl XMonotoneSubcurve {
    pub fn new(supporting: BezierSegment, t_source: f64, t_target: f64) -> Self {
        Self {
            supporting,
            t_source,
            t_target,
            source: supporting.eval(t_source),
            target: supporting.eval(t_target),
        }
    }

    pub fn source(&self) -> Point {
        self.source
    }

    pub fn target(&self) -> Point {
        self.target
    }

    /// The segment this piece was cut from.
    pub fn supporting_curve(&self) -> &BezierSegment {
        &self.supporting
    }

    pub fn t_source(&self) -> f64 {
        self.t_source
    }

    pub fn t_target(&self) -> f64 {
        self.t_target
    }

    /// Same geometry, opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            supporting: self.supporting,
            t_source: self.t_target,
            t_target: self.t_source,
            source: self.target,
            target: self.source,
        }
    }

    /// Replace the endpoints with snapped vertex positions.
    pub(crate) fn with_endpoints(mut self, source: Point, target: Point) -> Self {
        self.source = source;
        self.target = target;
        self
    }

    /// Supporting-curve parameter at local parameter `u` (0 = source, 1 = target).
    pub fn param_at(&self, u: f64) -> f64 {
        self.t_source + u * (self.t_target - self.t_source)
    }

    pub fn point_at(&self, u: f64) -> Point {
        if u <= 0.0 {
            return self.source;
        }
        if u >= 1.0 {
            return self.target;
        }
        self.supporting.eval(self.param_at(u))
    }

    /// Direction of travel at local parameter `u`.
    pub fn tangent_at(&self, u: f64) -> Vec2 {
        let t = self.param_at(u);
        let d = self.supporting.cubic().deriv().eval(t).to_vec2();
        if self.t_target >= self.t_source {
            d
        } else {
            -d
        }
    }

    /// This piece as a standalone cubic, in travel direction.
    pub fn cubic(&self) -> CubicBez {
        let mut cubic = self
            .supporting
            .cubic()
            .subsegment(self.t_source..self.t_target);
        cubic.p0 = self.source;
        cubic.p3 = self.target;
        cubic
    }

    /// Green's-theorem area contribution of this piece.
    pub fn signed_area(&self) -> f64 {
        self.cubic().signed_area()
    }

    /// Cut at sorted local parameters strictly inside (0, 1).
    ///
    /// Each cut carries the vertex to place there, which may sit a
    /// rounding error away from the curve.
    pub fn split_at(&self, cuts: &[(f64, Point)]) -> Vec<XMonotoneSubcurve> {
        let mut pieces = Vec::with_capacity(cuts.len() + 1);
        let mut start_t = self.t_source;
        let mut start_point = self.source;
        for &(u, point) in cuts {
            let t = self.param_at(u);
            pieces.push(Self {
                supporting: self.supporting,
                t_source: start_t,
                t_target: t,
                source: start_point,
                target: point,
            });
            start_t = t;
            start_point = point;
        }
        pieces.push(Self {
            supporting: self.supporting,
            t_source: start_t,
            t_target: self.t_target,
            source: start_point,
            target: self.target,
        });
        pieces
    }
}

/// One candidate produced by the decomposition primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonotonePiece {
    Curve(XMonotoneSubcurve),
    /// A piece that collapsed to (almost) a single point.
    Degenerate(Point),
}

/// Parameters in (margin, 1 - margin) where `cubic` stops being monotone.
///
/// Uses the x-axis unless the cubic is vertical, then the y-axis.
pub(crate) fn monotone_split_params(cubic: &CubicBez, margin: f64, flat_tolerance: f64) -> Vec<f64> {
    let xs = [cubic.p0.x, cubic.p1.x, cubic.p2.x, cubic.p3.x];
    let ys = [cubic.p0.y, cubic.p1.y, cubic.p2.y, cubic.p3.y];
    let vertical = xs.iter().all(|x| (x - xs[0]).abs() <= flat_tolerance);
    let [v0, v1, v2, v3] = if vertical { ys } else { xs };

    // Derivative coefficients: At² + Bt + C = 0
    let coeff_a = -3.0 * v0 + 9.0 * v1 - 9.0 * v2 + 3.0 * v3;
    let coeff_b = 6.0 * v0 - 12.0 * v1 + 6.0 * v2;
    let coeff_c = -3.0 * v0 + 3.0 * v1;

    let mut t_values: Vec<f64> = solve_quadratic(coeff_a, coeff_b, coeff_c)
        .into_iter()
        .filter(|t| *t > margin && *t < 1.0 - margin)
        .collect();
    t_values.sort_by(f64::total_cmp);
    t_values.dedup_by(|a, b| (*a - *b).abs() < margin);
    t_values
}

/// Accumulates the monotone pieces of one path, segment by segment.
#[derive(Debug, Clone)]
pub struct BoundaryBuilder {
    subcurves: Vec<XMonotoneSubcurve>,
    tolerance: f64,
    segments: usize,
    dropped: usize,
}

impl BoundaryBuilder {
    /// `tolerance` is the largest gap allowed between chained pieces.
    pub fn new(tolerance: f64) -> Self {
        Self {
            subcurves: Vec::new(),
            tolerance,
            segments: 0,
            dropped: 0,
        }
    }

    /// Decompose `segment` with `engine` and append its curve pieces.
    pub fn push_segment<A: Arrangement + ?Sized>(&mut self, engine: &A, segment: &BezierSegment) {
        for piece in engine.make_x_monotone(segment) {
            self.push_piece(piece);
        }
        self.segments += 1;
    }

    pub fn push_piece(&mut self, piece: MonotonePiece) {
        match piece {
            MonotonePiece::Curve(subcurve) => self.subcurves.push(subcurve),
            MonotonePiece::Degenerate(_) => self.dropped += 1,
        }
    }

    pub fn len(&self) -> usize {
        self.subcurves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subcurves.is_empty()
    }

    /// Check the pieces chain head-to-tail and close, then freeze them.
    ///
    /// Each source is snapped onto the previous target so the loop
    /// closes exactly.
    pub fn finish(self) -> Result<CurvedPolygonBoundary, EngineError> {
        let n = self.subcurves.len();
        if n == 0 {
            return Err(EngineError::EmptyBoundary);
        }
        for i in 0..n {
            let current = &self.subcurves[i];
            let next = &self.subcurves[(i + 1) % n];
            if !points_close(current.target(), next.source(), self.tolerance) {
                return Err(EngineError::OpenBoundary {
                    index: i,
                    gap: (current.target() - next.source()).hypot(),
                });
            }
        }

        let snapped: Vec<XMonotoneSubcurve> = (0..n)
            .map(|i| {
                let previous = &self.subcurves[(i + n - 1) % n];
                let current = &self.subcurves[i];
                current.with_endpoints(previous.target(), current.target())
            })
            .collect();

        debug!(
            "boundary: {} segments \u{2192} {} monotone pieces ({} degenerate dropped)",
            self.segments, n, self.dropped
        );
        Ok(CurvedPolygonBoundary::from_closed_chain(snapped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::BezierArrangement;

    fn segment(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)) -> BezierSegment {
        BezierSegment::new(0, CubicBez::new(p0, p1, p2, p3))
    }

    fn curves(pieces: &[MonotonePiece]) -> Vec<XMonotoneSubcurve> {
        pieces
            .iter()
            .filter_map(|p| match p {
                MonotonePiece::Curve(c) => Some(*c),
                MonotonePiece::Degenerate(_) => None,
            })
            .collect()
    }

    #[test]
    fn monotone_cubic_is_one_piece() {
        let engine = BezierArrangement::default();
        let pieces = engine.make_x_monotone(&segment((0.0, 0.0), (1.0, 3.0), (2.0, 1.0), (3.0, 0.0)));
        assert_eq!(curves(&pieces).len(), 1);
    }

    #[test]
    fn s_curve_in_x_is_split_at_vertical_tangents() {
        // x goes 0 → 3 → -2 → 1: two x-extrema.
        let engine = BezierArrangement::default();
        let seg = segment((0.0, 0.0), (3.0, 1.0), (-2.0, 2.0), (1.0, 3.0));
        let pieces = curves(&engine.make_x_monotone(&seg));
        assert_eq!(pieces.len(), 3);
        for piece in &pieces {
            let xs: Vec<f64> = (0..=20).map(|i| piece.point_at(i as f64 / 20.0).x).collect();
            let increasing = xs.windows(2).all(|w| w[1] >= w[0] - 1e-9);
            let decreasing = xs.windows(2).all(|w| w[1] <= w[0] + 1e-9);
            assert!(increasing || decreasing, "piece is not x-monotone: {:?}", xs);
        }
        // Pieces follow the curve parameter from source to target.
        assert_eq!(pieces[0].source(), seg.eval(0.0));
        assert_eq!(pieces[0].target(), pieces[1].source());
        assert_eq!(pieces[2].target(), seg.eval(1.0));
    }

    #[test]
    fn vertical_segment_splits_on_y() {
        // Vertical line that backtracks in y.
        let seg = segment((1.0, 0.0), (1.0, 3.0), (1.0, 3.0), (1.0, 1.0));
        let params = monotone_split_params(&seg.cubic(), 1e-9, 1e-12);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn point_segment_is_degenerate() {
        let engine = BezierArrangement::default();
        let seg = segment((1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0));
        let pieces = engine.make_x_monotone(&seg);
        assert!(matches!(pieces.as_slice(), [MonotonePiece::Degenerate(_)]));
    }

    #[test]
    fn reversed_swaps_endpoints_and_direction() {
        let piece = XMonotoneSubcurve::new(
            segment((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0)),
            0.0,
            1.0,
        );
        let back = piece.reversed();
        assert_eq!(back.source(), piece.target());
        assert_eq!(back.target(), piece.source());
        assert!(back.tangent_at(0.5).dot(piece.tangent_at(0.5)) < 0.0);
        assert!((back.signed_area() + piece.signed_area()).abs() < 1e-12);
        assert_eq!(back.reversed(), piece);
    }

    #[test]
    fn split_pieces_chain() {
        let piece = XMonotoneSubcurve::new(
            segment((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0)),
            0.2,
            0.9,
        );
        let cuts: Vec<(f64, Point)> = [0.25, 0.5].iter().map(|&u| (u, piece.point_at(u))).collect();
        let parts = piece.split_at(&cuts);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].source(), piece.source());
        assert_eq!(parts[0].target(), parts[1].source());
        assert_eq!(parts[2].target(), piece.target());
        assert!((parts[1].t_source() - piece.param_at(0.25)).abs() < 1e-12);
    }

    #[test]
    fn builder_drops_degenerate_and_rejects_open_chain() {
        let a = XMonotoneSubcurve::new(segment((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)), 0.0, 1.0);
        let b = XMonotoneSubcurve::new(segment((3.0, 0.0), (2.0, 1.0), (1.0, 1.0), (0.5, 0.5)), 0.0, 1.0);

        let mut builder = BoundaryBuilder::new(1e-7);
        builder.push_piece(MonotonePiece::Curve(a));
        builder.push_piece(MonotonePiece::Degenerate(Point::new(3.0, 0.0)));
        builder.push_piece(MonotonePiece::Curve(b));
        assert_eq!(builder.len(), 2);
        assert!(matches!(builder.finish(), Err(EngineError::OpenBoundary { index: 1, .. })));

        assert!(matches!(
            BoundaryBuilder::new(1e-7).finish(),
            Err(EngineError::EmptyBoundary)
        ));
    }
}
