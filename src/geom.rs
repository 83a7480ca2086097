//! Shared geometry utilities.

use kurbo::{CubicBez, Point, Rect, Vec2};

/// Whether two points are within `tolerance` of each other.
pub fn points_close(a: Point, b: Point, tolerance: f64) -> bool {
    (a - b).hypot() <= tolerance
}

/// Bounding box of a cubic's control polygon.
///
/// Always contains the curve, and is cheaper than the tight box.
pub fn control_box(cubic: &CubicBez) -> Rect {
    Rect::from_points(cubic.p0, cubic.p1)
        .union_pt(cubic.p2)
        .union_pt(cubic.p3)
}

/// Overlap test for boxes grown by `tolerance` on every side.
pub fn boxes_overlap(a: Rect, b: Rect, tolerance: f64) -> bool {
    a.x0 <= b.x1 + tolerance
        && b.x0 <= a.x1 + tolerance
        && a.y0 <= b.y1 + tolerance
        && b.y0 <= a.y1 + tolerance
}

/// Larger side of a box.
pub fn box_extent(rect: Rect) -> f64 {
    rect.width().max(rect.height())
}

/// Length of a cubic's control polygon, an upper bound of its arc length.
pub fn control_polygon_length(cubic: &CubicBez) -> f64 {
    (cubic.p1 - cubic.p0).hypot() + (cubic.p2 - cubic.p1).hypot() + (cubic.p3 - cubic.p2).hypot()
}

/// Signed turn from `incoming` to `outgoing`, in (-π, π].
///
/// Positive = left (counter-clockwise) turn.
pub fn turn_angle(incoming: Vec2, outgoing: Vec2) -> f64 {
    incoming.cross(outgoing).atan2(incoming.dot(outgoing))
}

/// Solve At² + Bt + C = 0, returning real roots.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < 1e-12 {
        if b.abs() > 1e-12 {
            return vec![-c / b];
        }
        return vec![];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return vec![];
    }
    let sqrt_disc = disc.sqrt();
    vec![(-b + sqrt_disc) / (2.0 * a), (-b - sqrt_disc) / (2.0 * a)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_roots() {
        let mut roots = solve_quadratic(1.0, -3.0, 2.0);
        roots.sort_by(f64::total_cmp);
        assert_eq!(roots, vec![1.0, 2.0]);
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert_eq!(solve_quadratic(0.0, 2.0, -1.0), vec![0.5]);
    }

    #[test]
    fn left_turn_is_positive() {
        let east = Vec2::new(1.0, 0.0);
        let north = Vec2::new(0.0, 1.0);
        assert!(turn_angle(east, north) > 0.0);
        assert!(turn_angle(north, east) < 0.0);
        assert!(turn_angle(east, east).abs() < 1e-12);
    }

    #[test]
    fn boxes_touching_within_tolerance_overlap() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0 + 1e-9, 0.0, 2.0, 1.0);
        assert!(boxes_overlap(a, b, 1e-8));
        assert!(!boxes_overlap(a, b, 0.0));
    }
}
