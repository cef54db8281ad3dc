//! Pixel and index buffers passed between pipeline stages

use crate::error::ConvertError;

/// Bytes per RGBA pixel
pub const RGBA_CHANNELS: usize = 4;

/// Decoded RGBA pixels, row-major, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Index texture pixels, one packed quad per source pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Bytes needed for `width * height` RGBA pixels
pub fn expected_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * RGBA_CHANNELS
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check that the byte length matches the declared dimensions
    pub fn validate(&self) -> Result<(), ConvertError> {
        let expected = expected_len(self.width, self.height);
        if self.data.len() != expected {
            return Err(ConvertError::MalformedBuffer {
                width: self.width,
                height: self.height,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

impl IndexBuffer {
    pub fn pixel_count(&self) -> usize {
        self.data.len() / RGBA_CHANNELS
    }
}
