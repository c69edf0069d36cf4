//! Texture image decoding.
//!
//! Pixel decoding is left to the `image` crate; this module only checks the
//! format tag carried by the tile.

use image::{ImageFormat, RgbaImage};

use crate::error::{DecodeError, DecodeResult};

/// Format tag for JPEG textures, the only format decoded here.
pub const FORMAT_JPEG: u32 = 1;

/// Decode a texture payload into RGBA pixels.
///
/// # Arguments
///
/// * `bytes` - The encoded texture
/// * `format` - The tile's texture format tag
pub fn decode_image(bytes: &[u8], format: u32) -> DecodeResult<RgbaImage> {
    if format != FORMAT_JPEG {
        return Err(DecodeError::UnsupportedFormat(format));
    }
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
    Ok(decoded.into_rgba8())
}
