//! Selected pieces → closed loops → components with holes.

use kurbo::{BezPath, Point, Shape};
use log::debug;

use super::overlay::direction;
use crate::boundary::CurvedPolygonBoundary;
use crate::config::ArrangementConfig;
use crate::error::EngineError;
use crate::geom::{points_close, turn_angle};
use crate::monotone::XMonotoneSubcurve;
use crate::region::PolygonWithHoles;

/// Points merged into shared vertices.
struct VertexPool {
    points: Vec<Point>,
    tolerance: f64,
}

impl VertexPool {
    fn new(tolerance: f64) -> Self {
        Self {
            points: Vec::new(),
            tolerance,
        }
    }

    fn id(&mut self, point: Point) -> usize {
        if let Some(i) = self
            .points
            .iter()
            .position(|&p| points_close(p, point, self.tolerance))
        {
            return i;
        }
        self.points.push(point);
        self.points.len() - 1
    }
}

/// Chain directed pieces into loops and group them into components.
pub(crate) fn assemble(
    pieces: Vec<XMonotoneSubcurve>,
    config: &ArrangementConfig,
) -> Result<Vec<PolygonWithHoles>, EngineError> {
    let loops = trace_loops(&pieces, config)?;
    nest(loops)
}

/// Walk the pieces head-to-tail into closed loops.
///
/// Where several pieces leave a vertex, the walk takes the leftmost
/// turn, so loops that only touch at a vertex come out separate.
fn trace_loops(
    pieces: &[XMonotoneSubcurve],
    config: &ArrangementConfig,
) -> Result<Vec<CurvedPolygonBoundary>, EngineError> {
    let mut pool = VertexPool::new(config.point_tolerance);
    let ends: Vec<(usize, usize)> = pieces
        .iter()
        .map(|p| (pool.id(p.source()), pool.id(p.target())))
        .collect();

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); pool.points.len()];
    for (i, &(source, _)) in ends.iter().enumerate() {
        outgoing[source].push(i);
    }

    let mut used = vec![false; pieces.len()];
    let mut loops = Vec::new();
    let mut slivers = 0;

    for start in 0..pieces.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let start_vertex = ends[start].0;
        let mut chain = vec![start];
        let mut current = start;

        loop {
            let vertex = ends[current].1;
            if vertex == start_vertex {
                break;
            }
            let incoming = direction(&pieces[current], 1.0);
            let next = outgoing[vertex]
                .iter()
                .copied()
                .filter(|&i| !used[i])
                .max_by(|&i, &j| {
                    let turn_i = turn_angle(incoming, direction(&pieces[i], 0.0));
                    let turn_j = turn_angle(incoming, direction(&pieces[j], 0.0));
                    turn_i.total_cmp(&turn_j)
                })
                .ok_or_else(|| {
                    let p = pool.points[vertex];
                    EngineError::Trace(format!("no continuation at ({:.6}, {:.6})", p.x, p.y))
                })?;
            used[next] = true;
            chain.push(next);
            current = next;
        }

        let subcurves: Vec<XMonotoneSubcurve> = chain
            .iter()
            .map(|&i| pieces[i].with_endpoints(pool.points[ends[i].0], pool.points[ends[i].1]))
            .collect();
        let boundary = CurvedPolygonBoundary::from_closed_chain(subcurves);
        if boundary.signed_area().abs() <= config.min_loop_area {
            slivers += 1;
            continue;
        }
        loops.push(boundary);
    }

    debug!(
        "traced {} loops from {} pieces ({} slivers dropped)",
        loops.len(),
        pieces.len(),
        slivers
    );
    Ok(loops)
}

/// CCW loops become outer boundaries; each CW loop is a hole of the
/// smallest outer boundary around it.
fn nest(loops: Vec<CurvedPolygonBoundary>) -> Result<Vec<PolygonWithHoles>, EngineError> {
    let (outers, holes): (Vec<_>, Vec<_>) = loops.into_iter().partition(|l| l.signed_area() > 0.0);

    let outer_paths: Vec<BezPath> = outers.iter().map(CurvedPolygonBoundary::to_bez_path).collect();
    let outer_areas: Vec<f64> = outers.iter().map(CurvedPolygonBoundary::signed_area).collect();
    let mut hole_lists: Vec<Vec<CurvedPolygonBoundary>> = vec![Vec::new(); outers.len()];

    for hole in holes {
        let sample = hole.subcurves()[0].point_at(0.5);
        let owner = (0..outers.len())
            .filter(|&i| outer_paths[i].winding(sample) != 0)
            .min_by(|&i, &j| outer_areas[i].total_cmp(&outer_areas[j]))
            .ok_or_else(|| {
                EngineError::Trace(format!(
                    "hole near ({:.6}, {:.6}) lies outside every outer boundary",
                    sample.x, sample.y
                ))
            })?;
        hole_lists[owner].push(hole);
    }

    Ok(outers
        .into_iter()
        .zip(hole_lists)
        .map(|(outer, holes)| PolygonWithHoles::new(outer, holes))
        .collect())
}
