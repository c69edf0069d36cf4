//! Little-endian base-128 variable-length integers.

use crate::error::{DecodeError, DecodeResult};

/// Longest encoding of a `u64` (ceil(64 / 7)).
const MAX_VARINT_LEN: usize = 10;

/// Decode one varint starting at `offset`.
///
/// Each byte contributes its low 7 bits, least significant group first. A set
/// high bit means another byte follows.
///
/// # Returns
///
/// The decoded value and the offset of the first byte after it.
pub fn decode_varint(buffer: &[u8], offset: usize) -> DecodeResult<(u64, usize)> {
    let mut value = 0u64;
    let mut pos = offset;
    for shift in (0u32..).step_by(7).take(MAX_VARINT_LEN) {
        let Some(&byte) = buffer.get(pos) else {
            return Err(DecodeError::TruncatedInput {
                needed: pos + 1,
                actual: buffer.len(),
            });
        };
        pos += 1;
        // The tenth byte only has room for bit 63.
        if shift == 63 && byte & 0x7e != 0 {
            return Err(DecodeError::VarIntOverflow { offset });
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
    }
    Err(DecodeError::VarIntOverflow { offset })
}

/// Append the varint encoding of `value` to `out`.
///
/// Returns the number of bytes written.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out.len() - start;
        }
        out.push(byte | 0x80);
    }
}
