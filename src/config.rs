/// All arrangement tolerances in one struct.
///
/// Distances are absolute, in the same units as the input control points.
/// The defaults suit shapes about one unit across. For much smaller or
/// larger input, build the config with [`ArrangementConfig::for_extent`]:
/// with the defaults, a unit ellipse scaled by 1e-6 encloses less than
/// `min_loop_area` and is rejected as zero-area.
#[derive(Debug, Clone)]
pub struct ArrangementConfig {
    // -- Points --
    /// Two points closer than this are the same vertex.
    /// Also the distance under which a point counts as lying on a curve.
    pub point_tolerance: f64,

    // -- Decomposition --
    /// Curve parameters closer than this are merged.
    pub param_tolerance: f64,
    /// Monotone pieces whose control polygon is shorter than this
    /// are reported as degenerate points.
    pub min_piece_length: f64,

    // -- Intersection --
    /// Subdivision stops once both bounding boxes are smaller than this.
    pub intersection_tolerance: f64,
    /// Maximum recursion depth of the bounding-box subdivision.
    pub max_subdivision_depth: usize,
    /// Maximum number of box pairs examined for one pair of curves.
    /// Bounds the work spent on near-tangent curves.
    pub subdivision_budget: usize,
    /// Accuracy passed to kurbo's nearest-point search.
    pub nearest_accuracy: f64,

    // -- Tracing --
    /// Loops enclosing less than this area are discarded as slivers,
    /// and boundaries enclosing less are rejected as degenerate.
    pub min_loop_area: f64,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            point_tolerance: 1e-7,
            param_tolerance: 1e-9,
            min_piece_length: 1e-9,
            intersection_tolerance: 1e-9,
            max_subdivision_depth: 64,
            subdivision_budget: 1 << 16,
            nearest_accuracy: 1e-12,
            min_loop_area: 1e-10,
        }
    }
}

impl ArrangementConfig {
    /// Defaults rescaled for shapes about `extent` units across.
    ///
    /// Distance tolerances scale with `extent`, `min_loop_area` with its
    /// square. Parameter tolerances and subdivision limits are unitless
    /// and stay as they are.
    pub fn for_extent(extent: f64) -> Self {
        let base = Self::default();
        let extent = extent.abs();
        Self {
            point_tolerance: base.point_tolerance * extent,
            min_piece_length: base.min_piece_length * extent,
            intersection_tolerance: base.intersection_tolerance * extent,
            nearest_accuracy: base.nearest_accuracy * extent,
            min_loop_area: base.min_loop_area * extent * extent,
            ..base
        }
    }
}
