//! Payload builders, one per `PayloadShape`.
//!
//! Each builder takes ownership of the row arguments (row id already
//! stripped) and returns the body the engine expects. Pass-through shapes
//! forward the caller's object untouched once its type is checked.

use serde_json::{json, Map, Value};

use crate::payload::operation::Operation;
use crate::payload::shape::{DownstreamRequest, ShapeError};

/// Isochrone smoothing factor sent with tabular requests.
const ISOCHRONE_SMOOTHING: u32 = 10;

pub fn directions_pair(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [profile, start, end] = take::<3>("directions", args)?;
    let profile = profile_arg(profile)?;
    let start = coordinate_arg(start, "start")?;
    let end = coordinate_arg(end, "end")?;

    Ok(DownstreamRequest::routing(
        Operation::Directions,
        profile,
        json!({ "coordinates": [start, end] }),
    ))
}

pub fn directions_options(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [profile, options] = take::<2>("directions", args)?;
    let profile = profile_arg(profile)?;
    let options = object_arg(options, "options")?;

    match options.get("coordinates") {
        Some(Value::Array(_)) => {}
        Some(other) => {
            return Err(ShapeError::WrongType {
                name: "options.coordinates",
                expected: "an array",
                actual: type_name(other),
            })
        }
        None => {
            return Err(ShapeError::Invalid {
                name: "options",
                reason: "missing `coordinates`".to_string(),
            })
        }
    }

    Ok(DownstreamRequest::routing(
        Operation::Directions,
        profile,
        Value::Object(options),
    ))
}

pub fn directions_tabular(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [profile, coordinates] = take::<2>("directions_tabular", args)?;
    let profile = profile_arg(profile)?;
    let coordinates = coordinate_list_arg(coordinates, "coordinates", 2)?;

    Ok(DownstreamRequest::routing(
        Operation::Directions,
        profile,
        json!({ "coordinates": coordinates }),
    ))
}

pub fn isochrones_options(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [profile, options] = take::<2>("isochrones", args)?;
    let profile = profile_arg(profile)?;
    let options = object_arg(options, "options")?;

    Ok(DownstreamRequest::routing(
        Operation::Isochrones,
        profile,
        Value::Object(options),
    ))
}

pub fn isochrones_tabular(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [profile, lon, lat, range_minutes] = take::<4>("isochrones_tabular", args)?;
    let profile = profile_arg(profile)?;
    let lon = number_arg(&lon, "lon")?;
    let lat = number_arg(&lat, "lat")?;
    check_lon_lat(lon, lat, "lon/lat")?;
    let range_minutes = number_arg(&range_minutes, "rangeMinutes")?;
    if range_minutes <= 0.0 {
        return Err(ShapeError::Invalid {
            name: "rangeMinutes",
            reason: format!("must be positive, got {}", range_minutes),
        });
    }

    Ok(DownstreamRequest::routing(
        Operation::Isochrones,
        profile,
        json!({
            "locations": [[lon, lat]],
            "range": [number_value(range_minutes * 60.0)],
            "location_type": "start",
            "range_type": "time",
            "smoothing": ISOCHRONE_SMOOTHING,
        }),
    ))
}

pub fn matrix_options(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [profile, options] = take::<2>("matrix", args)?;
    let profile = profile_arg(profile)?;
    let options = object_arg(options, "options")?;

    Ok(DownstreamRequest::routing(
        Operation::Matrix,
        profile,
        Value::Object(options),
    ))
}

pub fn matrix_tabular(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [profile, locations] = take::<2>("matrix_tabular", args)?;
    let profile = profile_arg(profile)?;
    let locations = coordinate_list_arg(locations, "locations", 1)?;

    Ok(DownstreamRequest::routing(
        Operation::Matrix,
        profile,
        json!({
            "locations": locations,
            "metrics": ["distance", "duration"],
            "resolve_locations": true,
        }),
    ))
}

pub fn optimization_problem(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [problem] = take::<1>("optimization", args)?;
    let problem = object_arg(problem, "problem")?;
    Ok(DownstreamRequest::vrp(Value::Object(problem)))
}

pub fn optimization_tabular(args: Vec<Value>) -> Result<DownstreamRequest, ShapeError> {
    let [jobs, vehicles] = take::<2>("optimization_tabular", args)?;
    let jobs = array_arg(jobs, "jobs")?;
    let vehicles = array_arg(vehicles, "vehicles")?;
    Ok(DownstreamRequest::vrp(json!({ "jobs": jobs, "vehicles": vehicles })))
}

/// True for non-empty strings made of `[A-Za-z0-9_-]`.
pub fn is_path_safe(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// JSON type name used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn take<const N: usize>(route: &'static str, args: Vec<Value>) -> Result<[Value; N], ShapeError> {
    args.try_into().map_err(|args: Vec<Value>| ShapeError::Arity {
        route,
        expected: N.to_string(),
        actual: args.len(),
    })
}

fn profile_arg(value: Value) -> Result<String, ShapeError> {
    match value {
        Value::String(profile) if is_path_safe(&profile) => Ok(profile),
        Value::String(profile) => Err(ShapeError::Invalid {
            name: "profile",
            reason: format!("{:?} is not a valid profile name", profile),
        }),
        other => Err(ShapeError::WrongType {
            name: "profile",
            expected: "a string",
            actual: type_name(&other),
        }),
    }
}

fn number_arg(value: &Value, name: &'static str) -> Result<f64, ShapeError> {
    value.as_f64().ok_or(ShapeError::WrongType {
        name,
        expected: "a number",
        actual: type_name(value),
    })
}

fn array_arg(value: Value, name: &'static str) -> Result<Vec<Value>, ShapeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ShapeError::WrongType {
            name,
            expected: "an array",
            actual: type_name(&other),
        }),
    }
}

/// Accept a JSON object, or a string holding one.
fn object_arg(value: Value, name: &'static str) -> Result<Map<String, Value>, ShapeError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ShapeError::WrongType {
                name,
                expected: "an object",
                actual: type_name(&other),
            }),
            Err(e) => Err(ShapeError::Invalid {
                name,
                reason: format!("not valid JSON: {}", e),
            }),
        },
        other => Err(ShapeError::WrongType {
            name,
            expected: "an object",
            actual: type_name(&other),
        }),
    }
}

fn coordinate_arg(value: Value, name: &'static str) -> Result<[f64; 2], ShapeError> {
    let items = match value {
        Value::Array(items) if items.len() == 2 => items,
        Value::Array(items) => {
            return Err(ShapeError::Invalid {
                name,
                reason: format!("expected [lon, lat], got {} element(s)", items.len()),
            })
        }
        other => {
            return Err(ShapeError::WrongType {
                name,
                expected: "a [lon, lat] array",
                actual: type_name(&other),
            })
        }
    };
    let lon = number_arg(&items[0], name)?;
    let lat = number_arg(&items[1], name)?;
    check_lon_lat(lon, lat, name)?;
    Ok([lon, lat])
}

fn coordinate_list_arg(
    value: Value,
    name: &'static str,
    min_len: usize,
) -> Result<Vec<[f64; 2]>, ShapeError> {
    let items = array_arg(value, name)?;
    if items.len() < min_len {
        return Err(ShapeError::Invalid {
            name,
            reason: format!("expected at least {} coordinate(s), got {}", min_len, items.len()),
        });
    }
    items
        .into_iter()
        .map(|item| coordinate_arg(item, name))
        .collect()
}

fn check_lon_lat(lon: f64, lat: f64, name: &'static str) -> Result<(), ShapeError> {
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(ShapeError::Invalid {
            name,
            reason: format!("[{}, {}] is outside lon/lat bounds", lon, lat),
        });
    }
    Ok(())
}

/// Whole numbers stay integers on the wire.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}
