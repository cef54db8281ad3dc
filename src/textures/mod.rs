//! Texture pipeline stages
//!
//! DDS decoding (image_dds with DirectXTex fallback), index texture creation
//! and uncompressed TGA output. Each stage owns its buffer and hands it to
//! the next one by value.

mod buffer;
mod decoder;
mod index;
mod tga;

pub use buffer::{expected_len, IndexBuffer, PixelBuffer, RGBA_CHANNELS};
pub use decoder::{decode, decode_dds_to_rgba, texture_info, TextureInfo};
pub use index::{build_index, row_from_alpha, ROW_COUNT, ROW_STEP};
pub use tga::{encode, encode_to_vec};

#[cfg(test)]
pub(crate) use decoder::tests::write_test_dds;
