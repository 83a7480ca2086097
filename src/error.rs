use std::fmt;

use thiserror::Error;

use crate::region::SetOperation;

/// Errors that can occur while building or composing curved regions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegionError {
    #[error("malformed input: need a positive multiple of 3 control points, at least 6 (got {len})")]
    MalformedInput { len: usize },

    #[error("no paths to compose")]
    EmptyInput,

    #[error("region composition failed ({site}): {source}")]
    RegionComposition {
        site: CompositionSite,
        #[source]
        source: EngineError,
    },

    #[error("invalid curves document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

impl RegionError {
    /// Wrap an engine rejection of the boundary built from path `path`.
    pub fn at_path(path: usize, source: EngineError) -> Self {
        RegionError::RegionComposition {
            site: CompositionSite {
                path: Some(path),
                operation: None,
            },
            source,
        }
    }

    /// Record the input path a composition error belongs to.
    pub fn with_path(self, path: usize) -> Self {
        match self {
            RegionError::RegionComposition { mut site, source } => {
                site.path = Some(path);
                RegionError::RegionComposition { site, source }
            }
            other => other,
        }
    }

    /// Wrap an engine failure while running `operation`.
    pub fn in_operation(operation: SetOperation, source: EngineError) -> Self {
        RegionError::RegionComposition {
            site: CompositionSite {
                path: None,
                operation: Some(operation),
            },
            source,
        }
    }
}

/// Where a composition error happened, as far as it is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositionSite {
    /// Index of the input path whose boundary was rejected.
    pub path: Option<usize>,
    /// Set operation that failed.
    pub operation: Option<SetOperation>,
}

impl fmt::Display for CompositionSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.path, self.operation) {
            (Some(path), Some(op)) => write!(f, "path {}, {}", path, op),
            (Some(path), None) => write!(f, "path {}", path),
            (None, Some(op)) => write!(f, "{}", op),
            (None, None) => write!(f, "unknown site"),
        }
    }
}

/// Rejections raised by an arrangement engine.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("boundary has no curves")]
    EmptyBoundary,

    #[error("boundary does not close (gap of {gap:e} after subcurve {index})")]
    OpenBoundary { index: usize, gap: f64 },

    #[error("boundary crosses itself near ({x:.6}, {y:.6})")]
    SelfIntersection { x: f64, y: f64 },

    #[error("boundary encloses no area")]
    ZeroArea,

    #[error("could not trace result boundary: {0}")]
    Trace(String),
}
