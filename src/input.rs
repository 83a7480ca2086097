//! Input document: `{"curves": [{"points": [{"x": .., "y": ..}, ...]}, ...]}`.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::error::RegionError;
use crate::output::PointRecord;

/// One closed path as a flat control-point list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveInput {
    pub points: Vec<PointRecord>,
}

impl CurveInput {
    pub fn control_points(&self) -> Vec<Point> {
        self.points.iter().copied().map(Point::from).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurvesDocument {
    pub curves: Vec<CurveInput>,
}

impl CurvesDocument {
    /// Parse a document. Point counts are validated later, per path.
    pub fn from_json(json: &str) -> Result<Self, RegionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Control points of every path, in document order.
    pub fn control_points(&self) -> Vec<Vec<Point>> {
        self.curves.iter().map(CurveInput::control_points).collect()
    }
}
