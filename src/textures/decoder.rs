//! DDS decoding using image_dds, with DirectXTex fallback for legacy
//! formats (L8, RGB565, etc.) that image_dds cannot read.
//!
//! Only the top mip of the first layer is decoded.

use anyhow::{anyhow, Context, Result};
use directxtex::{ScratchImage, DDS_FLAGS, DXGI_FORMAT, TEX_FILTER_FLAGS};
use image::RgbaImage;
use image_dds::ddsfile::Dds;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use super::buffer::{expected_len, PixelBuffer, RGBA_CHANNELS};
use crate::error::ConvertError;

/// Basic texture info read from the DDS header
#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub mip_count: u32,
}

/// Read and decode a DDS file into RGBA pixels
pub fn decode(path: &Path) -> Result<PixelBuffer, ConvertError> {
    let input_data = std::fs::read(path)
        .map_err(|e| ConvertError::Decode(format!("failed to read {}: {}", path.display(), e)))?;

    let rgba = decode_dds_to_rgba(&input_data)
        .map_err(|e| ConvertError::Decode(format!("{:#}", e)))?;

    let (width, height) = rgba.dimensions();
    debug!("Decoded {} ({}x{})", path.display(), width, height);

    Ok(PixelBuffer::new(width, height, rgba.into_raw()))
}

/// Decode DDS bytes to RGBA, falling back to DirectXTex for what image_dds rejects
pub fn decode_dds_to_rgba(input_data: &[u8]) -> Result<RgbaImage> {
    let dds = Dds::read(Cursor::new(input_data)).context("Failed to parse DDS")?;

    let primary = match image_dds::image_from_dds(&dds, 0) {
        Ok(rgba) => return Ok(rgba),
        Err(e) => e,
    };

    let format = describe_format(&dds);
    debug!("image_dds cannot read {} ({}), trying DirectXTex", format, primary);
    decode_with_directxtex(input_data).map_err(|fallback| {
        anyhow!(
            "unsupported DDS ({}): image_dds: {}; DirectXTex: {}",
            format,
            primary,
            fallback
        )
    })
}

/// Decode the first image through DirectXTex, converting to R8G8B8A8 first
fn decode_with_directxtex(input_data: &[u8]) -> Result<RgbaImage> {
    let flags = DDS_FLAGS::DDS_FLAGS_ALLOW_LARGE_FILES | DDS_FLAGS::DDS_FLAGS_EXPAND_LUMINANCE;
    let scratch =
        ScratchImage::load_dds(input_data, flags, None, None).context("DirectXTex: load failed")?;

    let metadata = scratch.metadata();
    let (width, height) = (metadata.width as u32, metadata.height as u32);

    let scratch = if metadata.format == DXGI_FORMAT::DXGI_FORMAT_R8G8B8A8_UNORM {
        scratch
    } else {
        info!("DirectXTex: converting {:?} to R8G8B8A8", metadata.format);
        scratch
            .convert(
                DXGI_FORMAT::DXGI_FORMAT_R8G8B8A8_UNORM,
                TEX_FILTER_FLAGS::TEX_FILTER_DEFAULT,
                0.5,
            )
            .context("DirectXTex: convert failed")?
    };

    let image = scratch
        .images()
        .first()
        .context("DirectXTex: no images in scratch")?;

    // SAFETY: DirectXTex guarantees `pixels` points at `slice_pitch` bytes
    // for as long as `scratch` is alive.
    let slice = unsafe { std::slice::from_raw_parts(image.pixels, image.slice_pitch) };

    let pixels = unpad_rows(slice, image.row_pitch, width, height)?;
    RgbaImage::from_raw(width, height, pixels)
        .context("DirectXTex: failed to create RgbaImage")
}

/// Copy `height` rows of `width` RGBA pixels out of rows padded to `row_pitch`
fn unpad_rows(slice: &[u8], row_pitch: usize, width: u32, height: u32) -> Result<Vec<u8>> {
    let row_len = width as usize * RGBA_CHANNELS;
    if row_len == 0 || row_pitch < row_len {
        return Err(anyhow!(
            "row pitch {} does not fit {} pixels per row",
            row_pitch,
            width
        ));
    }

    let mut pixels = Vec::with_capacity(expected_len(width, height));
    for row in slice.chunks(row_pitch).take(height as usize) {
        let row = row.get(..row_len).context("image smaller than its metadata")?;
        pixels.extend_from_slice(row);
    }
    if pixels.len() != expected_len(width, height) {
        return Err(anyhow!("image smaller than its metadata"));
    }
    Ok(pixels)
}

/// Get texture info without a full decode
pub fn texture_info(path: &Path) -> Result<TextureInfo> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read: {:?}", path))?;
    let dds = Dds::read(Cursor::new(&data)).context("Failed to parse DDS")?;

    Ok(TextureInfo {
        width: dds.header.width,
        height: dds.header.height,
        format: describe_format(&dds),
        mip_count: dds.header.mip_map_count.unwrap_or(1),
    })
}

/// Format name as image_dds knows it, or the raw pixel format otherwise
fn describe_format(dds: &Dds) -> String {
    if let Ok(format) = image_dds::dds_image_format(dds) {
        return format!("{:?}", format);
    }

    let pf = &dds.header.spf;
    match pf.fourcc {
        Some(ref fourcc) => {
            let bytes = fourcc.0.to_le_bytes();
            format!("FOURCC {}", String::from_utf8_lossy(&bytes))
        }
        None => format!("{}-bit uncompressed", pf.rgb_bit_count.unwrap_or(0)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image_dds::{ImageFormat, Mipmaps, Quality, SurfaceRgba8};

    /// Write an uncompressed RGBA DDS filled with a gradient
    pub(crate) fn write_test_dds(path: &Path, width: u32, height: u32) {
        let rgba = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([x as u8, y as u8, 128, ((x * 17 + y) % 256) as u8])
        });
        let encoded = SurfaceRgba8::from_image(&rgba)
            .encode(ImageFormat::Rgba8Unorm, Quality::Fast, Mipmaps::Disabled)
            .unwrap();
        let dds = encoded.to_dds().unwrap();
        let mut data = Vec::new();
        dds.write(&mut data).unwrap();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, data).unwrap();
    }

    #[test]
    fn test_decode_rgba_dds() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("grad.dds");
        write_test_dds(&path, 8, 4);

        let pixels = decode(&path).unwrap();
        assert_eq!((pixels.width, pixels.height), (8, 4));
        assert_eq!(pixels.data.len(), 8 * 4 * 4);
        pixels.validate().unwrap();

        // pixel (3, 2)
        let offset = (2 * 8 + 3) * 4;
        assert_eq!(&pixels.data[offset..offset + 3], &[3, 2, 128]);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("bad.dds");
        std::fs::write(&path, b"definitely not a dds file").unwrap();

        assert!(matches!(decode(&path), Err(ConvertError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_file_is_decode_error() {
        let temp = tempfile::tempdir().unwrap();
        let result = decode(&temp.path().join("missing.dds"));
        assert!(matches!(result, Err(ConvertError::Decode(_))));
    }

    #[test]
    fn test_unpad_rows_drops_row_padding() {
        // 2x2 image, rows padded from 8 to 12 bytes
        let slice: Vec<u8> = (0..24).collect();
        let pixels = unpad_rows(&slice, 12, 2, 2).unwrap();
        let expected: Vec<u8> = (0..8).chain(12..20).collect();
        assert_eq!(pixels, expected);
    }

    #[test]
    fn test_unpad_rows_rejects_short_data() {
        assert!(unpad_rows(&[0; 12], 8, 2, 2).is_err());
        assert!(unpad_rows(&[0; 16], 4, 2, 2).is_err());
    }

    #[test]
    fn test_texture_info() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("info.dds");
        write_test_dds(&path, 16, 8);

        let info = texture_info(&path).unwrap();
        assert_eq!((info.width, info.height), (16, 8));
        assert!(info.format.contains("Rgba8"));
    }
}
