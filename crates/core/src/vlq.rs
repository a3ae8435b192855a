//! Base64 VLQ codec for the `mappings` field.
//!
//! Each base64 character carries 6 bits: a 5-bit payload chunk plus a
//! continuation bit (0x20). Chunks are little-endian, with the continuation
//! bit set on every chunk except the last. The sign of the decoded value is
//! stored in the least significant bit of the full magnitude:
//! `unsigned = abs(value) << 1 | (value < 0)`.
//!
//! Notes:
//!
//! - [`decode`] consumes exactly one value at the given cursor, so callers
//!   can read a whole segment by calling it in a loop.
//! - Errors are raised for characters outside the base64 alphabet, for input
//!   that ends while the continuation bit is still set, and for sequences
//!   whose value would not fit in 64 bits.

use crate::Error;

const BASE64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Sentinel for bytes that are not part of the base64 alphabet.
const INVALID: u8 = 0xFF;

const BASE64_LOOKUP: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < BASE64_CHARS.len() {
        table[BASE64_CHARS[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Append the VLQ encoding of `value` to `out`.
///
/// `value` must be greater than `i64::MIN`: the sign-in-LSB scheme stores
/// `abs(value) << 1`, which needs a 65th bit for `i64::MIN`. Every value a
/// mappings field can hold is in range.
pub fn encode(value: i64, out: &mut String) {
    debug_assert!(value > i64::MIN, "magnitude does not fit in 63 bits");
    let mut rest: u64 = if value < 0 {
        ((value.unsigned_abs()) << 1) | 1
    } else {
        (value as u64) << 1
    };

    loop {
        let mut digit = (rest & 0x1F) as usize;
        rest >>= 5;
        if rest > 0 {
            digit |= 0x20;
        }
        out.push(BASE64_CHARS[digit] as char);
        if rest == 0 {
            break;
        }
    }
}

/// Encode a single value into a fresh string.
pub fn encode_to_string(value: i64) -> String {
    let mut out = String::new();
    encode(value, &mut out);
    out
}

/// Decode one VLQ value from `bytes` starting at `*cursor`.
///
/// On success the cursor is advanced past the consumed characters. On error
/// the cursor position is unspecified and the surrounding mappings string
/// must be rejected as a whole.
pub fn decode(bytes: &[u8], cursor: &mut usize) -> Result<i64, Error> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(*cursor) else {
            return Err(Error::TruncatedVlq);
        };
        *cursor += 1;

        let digit = BASE64_LOOKUP[byte as usize];
        if digit == INVALID {
            return Err(Error::InvalidBase64(byte as char));
        }

        // The chunk's payload bits land at shift..shift+5; reject any that
        // would fall outside the 64-bit result.
        let payload = (digit & 0x1F) as u64;
        if shift >= u64::BITS || (shift > u64::BITS - 5 && payload >> (u64::BITS - shift) != 0) {
            return Err(Error::VlqOverflow);
        }

        result |= payload << shift;
        shift += 5;

        if digit & 0x20 == 0 {
            break;
        }
    }

    let negative = result & 1 == 1;
    let magnitude = (result >> 1) as i64;
    Ok(if negative { -magnitude } else { magnitude })
}
