//! Index texture creation
//!
//! Legacy normal maps store the colorset row in their alpha channel, 16 rows
//! spaced 17 apart (row 0 = 0, row 15 = 255). An index texture stores the
//! same selection explicitly, one packed quad per pixel:
//!
//! | channel | meaning                                    |
//! |---------|--------------------------------------------|
//! | R       | row, scaled back to `row * 17`             |
//! | G       | 255, select the first row of the pair      |
//! | B       | unused, 0                                  |
//! | A       | 255, opaque                                |
//!
//! The output has exactly the byte length of the input so the encoder can
//! write it as a 32-bpp image of the same dimensions.

use super::buffer::{IndexBuffer, PixelBuffer, RGBA_CHANNELS};
use crate::error::ConvertError;

/// Distance between adjacent rows in the legacy alpha encoding
pub const ROW_STEP: u8 = 17;

/// Number of rows addressable by the legacy encoding
pub const ROW_COUNT: u8 = 16;

/// Map a legacy alpha value to the nearest colorset row
#[inline]
pub fn row_from_alpha(alpha: u8) -> u8 {
    let row = (alpha as u16 + ROW_STEP as u16 / 2) / ROW_STEP as u16;
    (row as u8).min(ROW_COUNT - 1)
}

/// Index quad for one RGBA pixel
#[inline]
fn index_pixel(pixel: &[u8]) -> [u8; 4] {
    let row = row_from_alpha(pixel[3]);
    [row * ROW_STEP, 255, 0, 255]
}

/// Build an index texture from decoded pixels
///
/// Pure per-pixel transform: no state survives between calls, so it is safe
/// to run on many buffers in parallel.
pub fn build_index(pixels: &PixelBuffer) -> Result<IndexBuffer, ConvertError> {
    pixels.validate()?;

    let mut data = vec![0u8; pixels.data.len()];
    for (out, pixel) in data
        .chunks_exact_mut(RGBA_CHANNELS)
        .zip(pixels.data.chunks_exact(RGBA_CHANNELS))
    {
        out.copy_from_slice(&index_pixel(pixel));
    }

    Ok(IndexBuffer {
        width: pixels.width,
        height: pixels.height,
        data,
    })
}
