//! Encoded polyline geometry.
//!
//! Decodes the Google polyline format: each coordinate is stored as a
//! latitude delta followed by a longitude delta, each delta zig-zag encoded
//! and split into 5-bit chunks offset by 63 into printable ASCII. A set
//! `0x20` bit on a chunk means another chunk follows.
//!
//! Decoding never fails. Malformed or truncated input yields the
//! coordinates fully decoded before the damage.

use crate::domain::Coordinate;

/// Precision used by Google and OpenTripPlanner (1e5).
pub const DEFAULT_PRECISION: u32 = 5;

/// Chunks are offset by this value into printable ASCII.
const CHAR_OFFSET: u8 = 63;

const CONTINUATION: u8 = 0x20;
const CHUNK_MASK: u8 = 0x1f;

/// Decode an encoded polyline into coordinates.
///
/// `precision` is the number of implied decimal digits (5 for Google/OTP,
/// 6 for OSRM/Valhalla).
///
/// # Examples
///
/// ```
/// use jeepney_server::domain::Coordinate;
/// use jeepney_server::polyline::decode;
///
/// let path = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 5);
/// assert_eq!(
///     path,
///     vec![
///         Coordinate::new(38.5, -120.2),
///         Coordinate::new(40.7, -120.95),
///         Coordinate::new(43.252, -126.453),
///     ]
/// );
///
/// // Empty and truncated input never panic.
/// assert!(decode("", 5).is_empty());
/// assert_eq!(decode("_p~iF~ps|U_ulL", 5).len(), 1);
/// ```
pub fn decode(encoded: &str, precision: u32) -> Vec<Coordinate> {
    let factor = scale(precision);
    let bytes = encoded.as_bytes();

    let mut path = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        // A pair is only emitted once both halves decoded cleanly.
        let Some(dlat) = next_delta(bytes, &mut index) else {
            break;
        };
        let Some(dlon) = next_delta(bytes, &mut index) else {
            break;
        };

        lat = lat.wrapping_add(dlat);
        lon = lon.wrapping_add(dlon);
        path.push(Coordinate::new(lat as f64 / factor, lon as f64 / factor));
    }

    path
}

fn scale(precision: u32) -> f64 {
    10f64.powi(precision.min(i32::MAX as u32) as i32)
}

/// Read one variable-length value starting at `index`.
///
/// Returns `None` if the input ends mid-value or holds a byte below the
/// chunk offset.
fn next_delta(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;

        let chunk = byte.checked_sub(CHAR_OFFSET)?;
        if shift < u64::BITS {
            value |= u64::from(chunk & CHUNK_MASK) << shift;
        }
        shift = shift.saturating_add(5);

        if chunk < CONTINUATION {
            break;
        }
    }

    Some(unzigzag(value))
}

/// One's-complement zig-zag: odd values are negative.
fn unzigzag(value: u64) -> i64 {
    let half = (value >> 1) as i64;
    if value & 1 == 1 { !half } else { half }
}



#[cfg(test)]
mod proptests {
    use super::test_support::encode;
    use super::*;
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        /// Encoding then decoding reproduces each point to within 1/10^precision.
        #[test]
        fn roundtrip_within_precision(
            path in prop::collection::vec(coordinate(), 0..50),
            precision in 1u32..=6,
        ) {
            let decoded = decode(&encode(&path, precision), precision);
            let tolerance = 1.0 / 10f64.powi(precision as i32);

            prop_assert_eq!(decoded.len(), path.len());
            for (a, b) in path.iter().zip(&decoded) {
                prop_assert!((a.lat - b.lat).abs() <= tolerance, "{:?} vs {:?}", a, b);
                prop_assert!((a.lon - b.lon).abs() <= tolerance, "{:?} vs {:?}", a, b);
            }
        }

        /// On well-formed input the result matches `polyline::decode_polyline`.
        #[test]
        fn matches_reference_decoder(
            path in prop::collection::vec(coordinate(), 0..50),
            precision in 1u32..=6,
        ) {
            let encoded = encode(&path, precision);
            let ours = decode(&encoded, precision);
            let theirs = ::polyline::decode_polyline(&encoded, precision).unwrap();

            prop_assert_eq!(ours.len(), theirs.0.len());
            for (a, b) in ours.iter().zip(&theirs.0) {
                prop_assert!((a.lat - b.y).abs() < 1e-9, "{:?} vs {:?}", a, b);
                prop_assert!((a.lon - b.x).abs() < 1e-9, "{:?} vs {:?}", a, b);
            }
        }

        /// Any prefix of a valid polyline decodes to a prefix of the full path.
        #[test]
        fn truncation_yields_prefix(
            path in prop::collection::vec(coordinate(), 1..20),
            cut in any::<prop::sample::Index>(),
        ) {
            let encoded = encode(&path, DEFAULT_PRECISION);
            let full = decode(&encoded, DEFAULT_PRECISION);
            let end = cut.index(encoded.len() + 1);

            let partial = decode(&encoded[..end], DEFAULT_PRECISION);
            prop_assert!(partial.len() <= full.len());
            prop_assert_eq!(&partial[..], &full[..partial.len()]);
        }

        /// Arbitrary text never panics and never yields more pairs than bytes allow.
        #[test]
        fn arbitrary_input_never_panics(s in ".*") {
            let path = decode(&s, DEFAULT_PRECISION);
            prop_assert!(path.len() * 2 <= s.len());
        }
    }
}
