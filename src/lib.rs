//! texidx - batch index texture creator
//!
//! Walks a directory tree of DDS textures and writes an index texture (TGA)
//! for each one into a mirrored output tree.

pub mod batch;
pub mod error;
pub mod paths;
pub mod settings;
pub mod textures;

pub use batch::{
    BatchConverter, BatchProgress, BatchRequest, BatchResult, BatchState, BatchStatus,
    CancelToken, ProgressCallback,
};
pub use error::{BatchError, ConfigError, ConvertError};
