//! Path and flags unpacking.

use crate::PathAndFlags;

/// Unpack path and flags from node metadata.
///
/// The `path_and_flags` field encodes:
/// - Lower 2 bits: Level - 1 (so level is 1-4)
/// - Next 3*level bits: Octant path digits (0-7)
/// - Remaining bits: Flags
///
/// # Arguments
///
/// * `path_and_flags` - The packed value from `NodeMetadata`
#[must_use]
pub fn unpack_path_and_flags(path_and_flags: u32) -> PathAndFlags {
    let level = 1 + (path_and_flags & 3) as usize;
    let mut rest = path_and_flags >> 2;

    let mut path = String::with_capacity(level);
    for _ in 0..level {
        path.push(char::from(b'0' + (rest & 7) as u8));
        rest >>= 3;
    }

    PathAndFlags {
        path,
        flags: rest,
        level,
    }
}
