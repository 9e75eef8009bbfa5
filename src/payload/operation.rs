//! Logical operations and the HTTP routes that reach them.

use std::fmt;

/// Operation performed by a downstream engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Directions,
    Isochrones,
    Matrix,
    Optimization,
    Status,
}

impl Operation {
    /// Path segment used by the routing engine for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Directions => "directions",
            Operation::Isochrones => "isochrones",
            Operation::Matrix => "matrix",
            Operation::Optimization => "optimization",
            Operation::Status => "status",
        }
    }

    /// True when the operation is served by the VRP engine rather than the routing engine.
    pub fn is_vrp(&self) -> bool {
        matches!(self, Operation::Optimization)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Batch endpoint exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Directions,
    DirectionsTabular,
    Isochrones,
    IsochronesTabular,
    Matrix,
    MatrixTabular,
    Optimization,
    OptimizationTabular,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Directions,
        Route::DirectionsTabular,
        Route::Isochrones,
        Route::IsochronesTabular,
        Route::Matrix,
        Route::MatrixTabular,
        Route::Optimization,
        Route::OptimizationTabular,
    ];

    /// Route name as it appears in the URL path (without leading slash).
    pub fn name(&self) -> &'static str {
        match self {
            Route::Directions => "directions",
            Route::DirectionsTabular => "directions_tabular",
            Route::Isochrones => "isochrones",
            Route::IsochronesTabular => "isochrones_tabular",
            Route::Matrix => "matrix",
            Route::MatrixTabular => "matrix_tabular",
            Route::Optimization => "optimization",
            Route::OptimizationTabular => "optimization_tabular",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Route::Directions | Route::DirectionsTabular => Operation::Directions,
            Route::Isochrones | Route::IsochronesTabular => Operation::Isochrones,
            Route::Matrix | Route::MatrixTabular => Operation::Matrix,
            Route::Optimization | Route::OptimizationTabular => Operation::Optimization,
        }
    }

    /// Whether the route takes an optional `/{format}` suffix.
    pub fn accepts_format(&self) -> bool {
        !self.operation().is_vrp()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
