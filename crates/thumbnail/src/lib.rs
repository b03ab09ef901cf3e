//! Censoring of preview images with a block mosaic followed by a gaussian blur.
//!
//! Processing never fails a request: when an image cannot be decoded or
//! re-encoded (or the crate is built without the `imaging` feature) the
//! source bytes are handed back unchanged.

pub mod error;
mod level;
mod scratch;
#[cfg(feature = "imaging")]
mod transform;

pub use crate::level::Level;
pub use crate::scratch::Scratch;
#[cfg(feature = "imaging")]
use tracing::debug;
use tracing::{instrument, warn};

pub type TempFile = tempfile::NamedTempFile;

/// Apply mosaic then blur to `source`.
///
/// With both levels at zero the output is byte-for-byte the input.
#[instrument(skip(source), fields(source_size = source.len()))]
pub fn transform(source: &[u8], mosaic: Level, blur: Level) -> Vec<u8> {
    if mosaic.is_off() && blur.is_off() {
        return source.to_vec();
    }
    censor_or_passthrough(source, mosaic, blur)
}

#[cfg(feature = "imaging")]
fn censor_or_passthrough(source: &[u8], mosaic: Level, blur: Level) -> Vec<u8> {
    match transform::censor(source, mosaic, blur) {
        Ok(output) => {
            debug!(output_size = output.len(), "censored thumbnail");
            output
        },
        Err(err) => {
            warn!(error = ?err, "could not process thumbnail, returning it unchanged");
            source.to_vec()
        },
    }
}

#[cfg(not(feature = "imaging"))]
fn censor_or_passthrough(source: &[u8], _mosaic: Level, _blur: Level) -> Vec<u8> {
    warn!("built without image processing, returning thumbnail unchanged");
    source.to_vec()
}

/// A fetched preview image alongside its censored rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailAsset {
    pub source_bytes: Vec<u8>,
    pub transformed_bytes: Vec<u8>,
    pub mosaic_level: Level,
    pub blur_level: Level,
}
impl ThumbnailAsset {
    pub fn new(source_bytes: Vec<u8>, mosaic_level: Level, blur_level: Level) -> Self {
        let transformed_bytes = transform(&source_bytes, mosaic_level, blur_level);
        Self { source_bytes, transformed_bytes, mosaic_level, blur_level }
    }

    /// Whether the transformed bytes are the untouched source.
    pub fn is_unchanged(&self) -> bool {
        self.source_bytes == self.transformed_bytes
    }

    /// File extension matching the transformed bytes, sniffed from their magic number.
    pub fn extension(&self) -> &'static str {
        match self.transformed_bytes.as_slice() {
            [0xFF, 0xD8, 0xFF, ..] => "jpg",
            [0x89, b'P', b'N', b'G', ..] => "png",
            [b'G', b'I', b'F', b'8', ..] => "gif",
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "webp",
            _ => "bin",
        }
    }
}
