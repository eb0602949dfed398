//! Fixed-width wire encodings for field values.
//!
//! The store expects little-endian byte layouts: 4 bytes for 32-bit
//! integers, 8 bytes for 64-bit integers, and the raw IEEE-754 bit pattern
//! for 32-bit floats. Strings travel as their raw bytes with the length
//! carried by the message envelope.

/// Encode a 32-bit integer, little-endian.
#[inline]
pub fn int32_bytes(v: i32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

/// Encode a 64-bit integer, little-endian.
#[inline]
pub fn int64_bytes(v: i64) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

/// Encode a 32-bit float as its raw bit pattern, little-endian.
#[inline]
pub fn float32_bytes(v: f32) -> Vec<u8> {
    v.to_bits().to_le_bytes().to_vec()
}

/// Concatenated f32 bit patterns, 4 bytes per element.
pub fn vector_bytes(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_bits().to_le_bytes());
    }
    out
}

#[inline]
pub fn decode_int32(bytes: &[u8]) -> Option<i32> {
    Some(i32::from_le_bytes(bytes.try_into().ok()?))
}

#[inline]
pub fn decode_int64(bytes: &[u8]) -> Option<i64> {
    Some(i64::from_le_bytes(bytes.try_into().ok()?))
}

#[inline]
pub fn decode_float32(bytes: &[u8]) -> Option<f32> {
    Some(f32::from_bits(u32::from_le_bytes(bytes.try_into().ok()?)))
}

/// Whether a numeric literal is decimal: its canonical textual rendering
/// contains a fractional separator. `30.0` renders as "30" and counts as
/// integral, matching how the store classifies numeric literals.
#[inline]
pub fn is_decimal(v: f64) -> bool {
    format!("{}", v).contains('.')
}
