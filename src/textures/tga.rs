//! TGA output: 32 bits per pixel, no RLE, single image
//!
//! Files are written to a temporary sibling and renamed over the target,
//! so an interrupted write never leaves a truncated TGA behind.

use image::codecs::tga::TgaEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use super::buffer::{expected_len, IndexBuffer};
use crate::error::ConvertError;

/// Encode an index buffer as an uncompressed 32-bpp TGA into memory
pub fn encode_to_vec(indices: &IndexBuffer) -> Result<Vec<u8>, ConvertError> {
    check_dimensions(indices)?;
    let mut out = Vec::with_capacity(indices.data.len() + 64);
    write_tga(&mut out, indices).map_err(|e| ConvertError::Encode(e.to_string()))?;
    Ok(out)
}

/// Encode an index buffer and write it to `output_path`, replacing any
/// existing file
pub fn encode(indices: &IndexBuffer, output_path: &Path) -> Result<(), ConvertError> {
    check_dimensions(indices)?;

    let parent = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(".texidx-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| ConvertError::io(parent, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_tga(&mut writer, indices).map_err(|e| match e {
            ImageError::IoError(io) => ConvertError::io(output_path, io),
            other => ConvertError::Encode(other.to_string()),
        })?;
        writer
            .flush()
            .map_err(|e| ConvertError::io(output_path, e))?;
    }

    temp.persist(output_path)
        .map_err(|e| ConvertError::io(output_path, e.error))?;

    debug!(
        "Wrote {} ({}x{})",
        output_path.display(),
        indices.width,
        indices.height
    );
    Ok(())
}

fn check_dimensions(indices: &IndexBuffer) -> Result<(), ConvertError> {
    if indices.width == 0 || indices.height == 0 {
        return Err(ConvertError::Encode(format!(
            "zero dimension {}x{}",
            indices.width, indices.height
        )));
    }

    let expected = expected_len(indices.width, indices.height);
    if indices.data.len() != expected {
        return Err(ConvertError::Encode(format!(
            "buffer is {} bytes, {}x{} needs {}",
            indices.data.len(),
            indices.width,
            indices.height,
            expected
        )));
    }
    Ok(())
}

fn write_tga<W: Write>(writer: W, indices: &IndexBuffer) -> Result<(), ImageError> {
    TgaEncoder::new(writer).disable_rle().write_image(
        &indices.data,
        indices.width,
        indices.height,
        ExtendedColorType::Rgba8,
    )
}
