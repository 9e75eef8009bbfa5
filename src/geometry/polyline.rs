//! Encoded polyline codec (precision 5).
//!
//! # Responsibilities
//! - Decode a polyline string into (lat, lon) pairs
//! - Swap decoded pairs into [lon, lat] order for GeoJSON-style consumers
//! - Encode (lat, lon) pairs, used by the CLI and by tests
//!
//! # Format
//! Each point is two zig-zag encoded deltas (latitude first) relative to the
//! previous point. Every value is split into 5-bit groups, least significant
//! first; groups are offset by 63 and all but the last carry the 0x20 bit.

use thiserror::Error;

const PRECISION: f64 = 1e5;
const CHAR_OFFSET: u8 = 63;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION_BIT: i64 = 0x20;
/// A 32-bit value needs at most seven 5-bit groups.
const MAX_SHIFT: u32 = 30;

/// Errors produced while decoding a polyline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Byte outside the polyline alphabet (`?` through `~`).
    #[error("invalid polyline byte 0x{byte:02x} at offset {offset}")]
    InvalidByte { byte: u8, offset: usize },

    /// Input ended inside a value, or after a latitude with no longitude.
    #[error("polyline truncated at offset {offset}")]
    Truncated { offset: usize },

    /// Continuation groups run past 32 bits.
    #[error("polyline value starting at offset {offset} overflows 32 bits")]
    Overflow { offset: usize },
}

/// Decode a polyline into `(lat, lon)` pairs.
pub fn decode(polyline: &str) -> Result<Vec<(f64, f64)>, DecodeError> {
    let bytes = polyline.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        let (d_lat, next) = read_value(bytes, index)?;
        if next >= bytes.len() {
            return Err(DecodeError::Truncated { offset: next });
        }
        let (d_lon, next) = read_value(bytes, next)?;
        index = next;

        lat += d_lat;
        lon += d_lon;
        points.push((lat as f64 / PRECISION, lon as f64 / PRECISION));
    }

    Ok(points)
}

/// Decode a polyline and swap every pair into `[lon, lat]` order.
pub fn decode_lon_lat(polyline: &str) -> Result<Vec<[f64; 2]>, DecodeError> {
    Ok(decode(polyline)?
        .into_iter()
        .map(|(lat, lon)| [lon, lat])
        .collect())
}

/// Encode `(lat, lon)` pairs as a polyline.
pub fn encode(points: &[(f64, f64)]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for &(lat, lon) in points {
        let lat = (lat * PRECISION).round() as i64;
        let lon = (lon * PRECISION).round() as i64;
        write_value(&mut out, lat - prev_lat);
        write_value(&mut out, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

/// Read one zig-zag value starting at `start`; returns the value and the next offset.
fn read_value(bytes: &[u8], start: usize) -> Result<(i64, usize), DecodeError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    let mut index = start;

    loop {
        let Some(&byte) = bytes.get(index) else {
            return Err(DecodeError::Truncated { offset: index });
        };
        if !(CHAR_OFFSET..=b'~').contains(&byte) {
            return Err(DecodeError::InvalidByte { byte, offset: index });
        }
        let chunk = i64::from(byte - CHAR_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        index += 1;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
        shift += 5;
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { offset: start });
        }
    }

    let value = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok((value, index))
}

fn write_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= CONTINUATION_BIT {
        out.push(char::from((CONTINUATION_BIT | (v & CHUNK_MASK)) as u8 + CHAR_OFFSET));
        v >>= 5;
    }
    out.push(char::from(v as u8 + CHAR_OFFSET));
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(a: (f64, f64), b: (f64, f64)) {
        assert!((a.0 - b.0).abs() < 1e-5, "{:?} vs {:?}", a, b);
        assert!((a.1 - b.1).abs() < 1e-5, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn test_decode_canonical_vector() {
        let points = decode(CANONICAL).unwrap();
        assert_eq!(points.len(), 3);
        assert_close(points[0], (38.5, -120.2));
        assert_close(points[1], (40.7, -120.95));
        assert_close(points[2], (43.252, -126.453));
    }

    #[test]
    fn test_lon_lat_swap() {
        let points = decode_lon_lat(CANONICAL).unwrap();
        assert_eq!(points[0], [-120.2, 38.5]);
        assert!((points[2][0] - -126.453).abs() < 1e-9);
        assert!((points[2][1] - 43.252).abs() < 1e-9);
    }

    #[test]
    fn test_encode_canonical_vector() {
        let encoded = encode(&[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]);
        assert_eq!(encoded, CANONICAL);
    }

    #[test]
    fn test_round_trip_within_precision() {
        let route = vec![
            (50.85045, 4.34878),
            (50.84667, 4.35242),
            (-33.86882, 151.20929),
            (0.0, 0.0),
            (-0.00001, 179.99999),
        ];
        let decoded = decode(&encode(&route)).unwrap();
        assert_eq!(decoded.len(), route.len());
        for (got, want) in decoded.into_iter().zip(route) {
            assert_close(got, want);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_value_is_error() {
        // '_' carries the continuation bit and nothing follows it.
        assert_eq!(decode("_"), Err(DecodeError::Truncated { offset: 1 }));
    }

    #[test]
    fn test_latitude_without_longitude_is_error() {
        assert_eq!(decode("_p~iF"), Err(DecodeError::Truncated { offset: 5 }));
    }

    #[test]
    fn test_invalid_byte_is_error() {
        let err = decode("_p~iF ps|U").unwrap_err();
        assert_eq!(err, DecodeError::InvalidByte { byte: b' ', offset: 5 });
    }

    #[test]
    fn test_endless_continuation_is_bounded() {
        let err = decode(&"~".repeat(64)).unwrap_err();
        assert_eq!(err, DecodeError::Overflow { offset: 0 });
    }
}
