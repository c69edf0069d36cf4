//! Texture coordinate unpacking.

use glam::Vec2;

use crate::UvTransform;
use crate::error::{DecodeError, DecodeResult};

const HEADER_LEN: usize = 4;

/// How the low and high byte planes of the UV payload are addressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TexCoordLayout {
    /// Step `i` reads `data[i]`/`data[3i]` for U and `data[2i]`/`data[4i]`
    /// for V.
    #[default]
    Strided,
    /// Four contiguous planes: U low, V low, U high, V high.
    Planar,
}

/// Unpacked texture coordinates with their shader transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TexCoords {
    pub uvs: Vec<[u16; 2]>,
    /// Per-axis modulus (`1 + header value`), always at least 1.
    pub modulus: [u32; 2],
    pub transform: UvTransform,
}

/// Unpack texture coordinates.
///
/// Input format: 4-byte header (`u_mod - 1`, `v_mod - 1` as little-endian
/// u16) followed by 4*N bytes of UV data. The UV values are delta-encoded
/// with modulo arithmetic.
pub fn unpack_tex_coords(packed: &[u8]) -> DecodeResult<TexCoords> {
    unpack_tex_coords_with_layout(packed, TexCoordLayout::Strided)
}

/// Unpack texture coordinates using an explicit byte-plane layout.
pub fn unpack_tex_coords_with_layout(
    packed: &[u8],
    layout: TexCoordLayout,
) -> DecodeResult<TexCoords> {
    if packed.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedInput {
            needed: HEADER_LEN,
            actual: packed.len(),
        });
    }
    let data = &packed[HEADER_LEN..];
    if data.len() % 4 != 0 {
        return Err(DecodeError::InvalidLength {
            what: "texture coordinate payload (must be a multiple of 4)",
            actual: packed.len(),
        });
    }

    let u_mod = 1 + u32::from(u16::from_le_bytes([packed[0], packed[1]]));
    let v_mod = 1 + u32::from(u16::from_le_bytes([packed[2], packed[3]]));
    let count = data.len() / 4;

    let (mut u, mut v) = (0u32, 0u32);
    let uvs = (0..count)
        .map(|i| {
            let (u_lo, u_hi, v_lo, v_hi) = match layout {
                TexCoordLayout::Strided => (data[i], data[i * 3], data[i * 2], data[i * 4]),
                TexCoordLayout::Planar => (
                    data[i],
                    data[count * 2 + i],
                    data[count + i],
                    data[count * 3 + i],
                ),
            };
            u = (u + u32::from(u_lo) + (u32::from(u_hi) << 8)) % u_mod;
            v = (v + u32::from(v_lo) + (u32::from(v_hi) << 8)) % v_mod;
            [u as u16, v as u16]
        })
        .collect();

    Ok(TexCoords {
        uvs,
        modulus: [u_mod, v_mod],
        transform: UvTransform {
            offset: Vec2::splat(0.5),
            scale: Vec2::new(1.0 / u_mod as f32, 1.0 / v_mod as f32),
        },
    })
}
