//! beziergon: closed cubic bezier paths → curved polygons, with boolean
//! set operations between them.
//!
//! Each path is a flat list of control points where every third point is
//! an anchor. Paths become [`CurvedRegion`]s made of x-monotone subcurves;
//! regions compose by intersection, union, difference or symmetric
//! difference; the result serializes to a `{"polygons": [...]}` document.
//!
//! # Example
//!
//! ```
//! use beziergon::kurbo::Point;
//! use beziergon::{extract, intersect_paths, BezierArrangement};
//!
//! let a = [(0.0, 0.0), (1.0, 3.0), (2.0, 1.0), (3.0, 0.0), (2.0, -1.0), (1.0, -1.0)];
//! let a: Vec<Point> = a.iter().map(|&(x, y)| Point::new(x, y)).collect();
//! let b: Vec<Point> = a.iter().map(|p| Point::new(p.x + 1.0, p.y + 0.5)).collect();
//!
//! let engine = BezierArrangement::default();
//! let region = intersect_paths(&[a, b], &engine)?;
//! let json = extract(&region).to_json()?;
//! assert!(json.contains("polygons"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod config;
mod geom;

pub mod arrangement;
pub mod boundary;
pub mod curve;
pub mod error;
pub mod input;
pub mod monotone;
pub mod output;
pub mod region;

// Re-export kurbo so callers build points with the same version.
pub use kurbo;

pub use arrangement::{Arrangement, BezierArrangement};
pub use boundary::{CurvedPolygonBoundary, Orientation};
pub use config::ArrangementConfig;
pub use curve::{build_segments, transform_points, BezierSegment};
pub use error::{EngineError, RegionError};
pub use input::CurvesDocument;
pub use monotone::{BoundaryBuilder, MonotonePiece, XMonotoneSubcurve};
pub use output::{extract, BooleanResult, PolygonsDocument};
pub use region::{intersect, intersect_all, CurvedRegion, PolygonWithHoles, SetOperation};

use std::f64::consts::TAU;
use std::time::Instant;

use kurbo::{Affine, Point};
use log::debug;
use rayon::prelude::*;

/// Full pipeline for one path: control points → validated region.
///
/// Errors from the engine carry `path_index`.
pub fn region_from_points<A: Arrangement + ?Sized>(
    points: &[Point],
    path_index: usize,
    engine: &A,
) -> Result<CurvedRegion, RegionError> {
    let segments = build_segments(points)?;
    region_from_segments(&segments, path_index, engine)
}

fn region_from_segments<A: Arrangement + ?Sized>(
    segments: &[BezierSegment],
    path_index: usize,
    engine: &A,
) -> Result<CurvedRegion, RegionError> {
    let mut builder = BoundaryBuilder::new(engine.point_tolerance());
    for segment in segments {
        builder.push_segment(engine, segment);
    }
    let boundary = builder
        .finish()
        .map_err(|source| RegionError::at_path(path_index, source))?
        .normalized();
    engine
        .insert_boundary(boundary)
        .map_err(|source| RegionError::at_path(path_index, source))
}

/// Fold all `paths` with `op`, left to right.
///
/// Every path is validated before the engine is first called. An engine
/// failure names the operation and the path being folded in.
pub fn compose_paths<P: AsRef<[Point]>, A: Arrangement + ?Sized>(
    paths: &[P],
    op: SetOperation,
    engine: &A,
) -> Result<CurvedRegion, RegionError> {
    let t_start = Instant::now();

    // ── Build ─────────────────────────────────────────────
    let segments = paths
        .iter()
        .map(|points| build_segments(points.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let (first, rest) = segments.split_first().ok_or(RegionError::EmptyInput)?;

    // ── Compose ───────────────────────────────────────────
    let mut result = region_from_segments(first, 0, engine)?;
    for (i, path) in rest.iter().enumerate() {
        let region = region_from_segments(path, i + 1, engine)?;
        result = result
            .compose(op, &region, engine)
            .map_err(|err| err.with_path(i + 1))?;
    }

    debug!(
        "{} of {} paths \u{2192} {} components ({}ms)",
        op,
        paths.len(),
        result.components().len(),
        t_start.elapsed().as_millis()
    );
    Ok(result)
}

/// Intersection of all `paths`.
pub fn intersect_paths<P: AsRef<[Point]>, A: Arrangement + ?Sized>(
    paths: &[P],
    engine: &A,
) -> Result<CurvedRegion, RegionError> {
    compose_paths(paths, SetOperation::Intersection, engine)
}

/// Run independent two-path pipelines in parallel.
///
/// Results are in the order of `pairs`.
pub fn compose_pairs<A: Arrangement + Sync + ?Sized>(
    pairs: &[(Vec<Point>, Vec<Point>)],
    op: SetOperation,
    engine: &A,
) -> Vec<Result<CurvedRegion, RegionError>> {
    pairs
        .par_iter()
        .map(|(a, b)| compose_paths(&[a.as_slice(), b.as_slice()], op, engine))
        .collect()
}

/// Regions of an `n`-fold rotationally symmetric Venn diagram.
///
/// Curve `j` is `points` rotated about the origin by `j / n` of a full
/// turn. Region `i - 1`, for `i` in `1..2^n`, lies inside the curves
/// whose bit is set in `i` and outside all others.
pub fn venn_regions<A: Arrangement + ?Sized>(
    points: &[Point],
    n: usize,
    engine: &A,
) -> Result<Vec<CurvedRegion>, RegionError> {
    if n == 0 {
        return Err(RegionError::EmptyInput);
    }
    let t_start = Instant::now();

    // ── Curves ────────────────────────────────────────────
    let segments = (0..n)
        .map(|j| {
            let turn = Affine::rotate(TAU * j as f64 / n as f64);
            build_segments(&transform_points(points, turn))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let curves = segments
        .iter()
        .enumerate()
        .map(|(j, segments)| region_from_segments(segments, j, engine))
        .collect::<Result<Vec<_>, _>>()?;

    // ── Regions ───────────────────────────────────────────
    let regions = (1..1usize << n)
        .map(|mask| {
            let inside = |j: usize| mask & (1 << j) != 0;
            let mut included = (0..n).filter(|&j| inside(j));
            let first = included.next().ok_or(RegionError::EmptyInput)?;
            let mut region = curves[first].clone();
            for j in included {
                region = region.intersect(&curves[j], engine).map_err(|err| err.with_path(j))?;
            }
            for j in (0..n).filter(|&j| !inside(j)) {
                region = region.difference(&curves[j], engine).map_err(|err| err.with_path(j))?;
            }
            Ok::<_, RegionError>(region)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "venn diagram of {} curves \u{2192} {} regions ({}ms)",
        n,
        regions.len(),
        t_start.elapsed().as_millis()
    );
    Ok(regions)
}

/// Parse a curves document, intersect all its paths, and serialize the result.
pub fn run_document<A: Arrangement + ?Sized>(json: &str, engine: &A) -> Result<String, RegionError> {
    let document = CurvesDocument::from_json(json)?;
    let region = intersect_paths(&document.control_points(), engine)?;
    Ok(extract(&region).to_json()?)
}

/// Shapes shared by the unit tests.
#[cfg(test)]
pub(crate) mod test_shapes {
    use kurbo::Point;

    use crate::{region_from_points, BezierArrangement, CurvedRegion};

    /// Corners of an axis-aligned rectangle, counter-clockwise.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<(f64, f64)> {
        vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }

    /// Control points of a polygon whose edges are straight cubics.
    pub fn polygon_points(corners: &[(f64, f64)]) -> Vec<Point> {
        let n = corners.len();
        (0..n)
            .flat_map(|i| {
                let a = Point::new(corners[i].0, corners[i].1);
                let b = Point::new(corners[(i + 1) % n].0, corners[(i + 1) % n].1);
                [a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0)]
            })
            .collect()
    }

    pub fn region(corners: &[(f64, f64)]) -> CurvedRegion {
        region_from_points(&polygon_points(corners), 0, &BezierArrangement::default()).unwrap()
    }

    /// Control points of the usual four-cubic circle, counter-clockwise.
    pub fn circle(cx: f64, cy: f64, r: f64) -> Vec<Point> {
        const K: f64 = 0.552_284_749_830_793_4;
        let h = K * r;
        [
            (r, 0.0),
            (r, h),
            (h, r),
            (0.0, r),
            (-h, r),
            (-r, h),
            (-r, 0.0),
            (-r, -h),
            (-h, -r),
            (0.0, -r),
            (h, -r),
            (r, -h),
        ]
        .iter()
        .map(|&(x, y)| Point::new(cx + x, cy + y))
        .collect()
    }

    pub fn circle_region(cx: f64, cy: f64, r: f64) -> CurvedRegion {
        region_from_points(&circle(cx, cy, r), 0, &BezierArrangement::default()).unwrap()
    }
}
