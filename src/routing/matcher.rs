//! Shape selection.
//!
//! # Responsibilities
//! - Map a route and a row's argument count to its `PayloadShape`
//! - Report an arity error listing what the route accepts
//!
//! # Design Decisions
//! - Lookup by argument count only; type checks belong to the builders
//! - Static table, no runtime registration

use crate::payload::{PayloadShape, Route, ShapeError};

/// Shapes accepted on `route`.
pub fn shapes_for(route: Route) -> &'static [PayloadShape] {
    match route {
        Route::Directions => &[PayloadShape::DirectionsPair, PayloadShape::DirectionsOptions],
        Route::DirectionsTabular => &[PayloadShape::DirectionsTabular],
        Route::Isochrones => &[PayloadShape::IsochronesOptions],
        Route::IsochronesTabular => &[PayloadShape::IsochronesTabular],
        Route::Matrix => &[PayloadShape::MatrixOptions],
        Route::MatrixTabular => &[PayloadShape::MatrixTabular],
        Route::Optimization => &[PayloadShape::OptimizationProblem],
        Route::OptimizationTabular => &[PayloadShape::OptimizationTabular],
    }
}

/// Pick the shape on `route` that takes `arg_count` arguments.
pub fn select_shape(route: Route, arg_count: usize) -> Result<PayloadShape, ShapeError> {
    let shapes = shapes_for(route);
    shapes
        .iter()
        .copied()
        .find(|shape| shape.arity() == arg_count)
        .ok_or_else(|| ShapeError::Arity {
            route: route.name(),
            expected: shapes
                .iter()
                .map(|shape| shape.arity().to_string())
                .collect::<Vec<_>>()
                .join(" or "),
            actual: arg_count,
        })
}
