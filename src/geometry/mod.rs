//! Geometry codec subsystem.
//!
//! # Data Flow
//! ```text
//! VRP engine response
//!     → routes[].geometry (encoded polyline, lat/lon order)
//!     → polyline.rs (decode to (lat, lon) pairs)
//!     → swap to [lon, lat]
//!     → embedded back into the response JSON
//! ```
//!
//! # Design Decisions
//! - Precision fixed at 5 decimal places (the encoding the VRP engine emits)
//! - Decoding is bounded by input length; malformed input is an error, never a hang
//! - The decoder output stays in (lat, lon) order; swapping is explicit

pub mod polyline;

pub use polyline::{decode, decode_lon_lat, encode, DecodeError};
