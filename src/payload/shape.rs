//! Accepted argument shapes and the request they produce.

use serde_json::Value;
use thiserror::Error;

use crate::payload::builders;
use crate::payload::operation::Operation;

/// Malformed row arguments. Caller error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// No shape on this route takes this many arguments.
    #[error("{route} accepts {expected} argument(s), got {actual}")]
    Arity {
        route: &'static str,
        expected: String,
        actual: usize,
    },

    /// Argument has the wrong JSON type.
    #[error("argument `{name}` must be {expected}, got {actual}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// Argument has the right type but an unusable value.
    #[error("argument `{name}` is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// One variant per accepted (operation, argument shape) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    /// `profile, [lon,lat] start, [lon,lat] end`
    DirectionsPair,
    /// `profile, options` with `options.coordinates`
    DirectionsOptions,
    /// `profile, [[lon,lat], ...]`
    DirectionsTabular,
    /// `profile, optionsJSON`
    IsochronesOptions,
    /// `profile, lon, lat, rangeMinutes`
    IsochronesTabular,
    /// `profile, options`
    MatrixOptions,
    /// `profile, [[lon,lat], ...]`
    MatrixTabular,
    /// `problem`
    OptimizationProblem,
    /// `jobs, vehicles`
    OptimizationTabular,
}

impl PayloadShape {
    /// Number of row arguments (excluding the row id) this shape consumes.
    pub fn arity(&self) -> usize {
        match self {
            PayloadShape::DirectionsPair => 3,
            PayloadShape::IsochronesTabular => 4,
            PayloadShape::OptimizationProblem => 1,
            PayloadShape::DirectionsOptions
            | PayloadShape::DirectionsTabular
            | PayloadShape::IsochronesOptions
            | PayloadShape::MatrixOptions
            | PayloadShape::MatrixTabular
            | PayloadShape::OptimizationTabular => 2,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            PayloadShape::DirectionsPair
            | PayloadShape::DirectionsOptions
            | PayloadShape::DirectionsTabular => Operation::Directions,
            PayloadShape::IsochronesOptions | PayloadShape::IsochronesTabular => {
                Operation::Isochrones
            }
            PayloadShape::MatrixOptions | PayloadShape::MatrixTabular => Operation::Matrix,
            PayloadShape::OptimizationProblem | PayloadShape::OptimizationTabular => {
                Operation::Optimization
            }
        }
    }

    /// Validate the row arguments and build the downstream request.
    pub fn build(&self, args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
        match self {
            PayloadShape::DirectionsPair => builders::directions_pair(args),
            PayloadShape::DirectionsOptions => builders::directions_options(args),
            PayloadShape::DirectionsTabular => builders::directions_tabular(args),
            PayloadShape::IsochronesOptions => builders::isochrones_options(args),
            PayloadShape::IsochronesTabular => builders::isochrones_tabular(args),
            PayloadShape::MatrixOptions => builders::matrix_options(args),
            PayloadShape::MatrixTabular => builders::matrix_tabular(args),
            PayloadShape::OptimizationProblem => builders::optimization_problem(args),
            PayloadShape::OptimizationTabular => builders::optimization_tabular(args),
        }
    }
}

/// Translated request for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamRequest {
    pub operation: Operation,
    /// Routing profile; `None` for the VRP engine.
    pub profile: Option<String>,
    /// Response format segment; `None` means the client default.
    pub format: Option<String>,
    pub body: Value,
}

impl DownstreamRequest {
    pub fn routing(operation: Operation, profile: String, body: Value) -> Self {
        Self {
            operation,
            profile: Some(profile),
            format: None,
            body,
        }
    }

    pub fn vrp(body: Value) -> Self {
        Self {
            operation: Operation::Optimization,
            profile: None,
            format: None,
            body,
        }
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }
}
