use std::io::Write;
use std::path::PathBuf;

use exn::ResultExt;
use r34v_extract::models::VideoRecord;
use r34v_thumbnail::ThumbnailAsset;
use serde::Serialize;

use crate::error::{ErrorKind, Result};

/// A record plus the values derived from it.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    #[serde(flatten)]
    pub record: &'a VideoRecord,
    pub page_url: Option<String>,
    pub duration: Option<String>,
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_file: Option<PathBuf>,
}
impl<'a> RecordView<'a> {
    pub fn new(record: &'a VideoRecord) -> Self {
        Self {
            record,
            page_url: record.address().page_url(),
            duration: record.duration_display(),
            rating: record.rating(),
            thumbnail_file: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThumbnailView {
    pub id: u64,
    pub file: Option<PathBuf>,
    pub mosaic_level: u8,
    pub blur_level: u8,
    pub unchanged: bool,
    pub size: usize,
}
impl ThumbnailView {
    pub fn new(id: u64, asset: &ThumbnailAsset, file: Option<PathBuf>) -> Self {
        Self {
            id,
            file,
            mosaic_level: asset.mosaic_level.get(),
            blur_level: asset.blur_level.get(),
            unchanged: asset.is_unchanged(),
            size: asset.transformed_bytes.len(),
        }
    }
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).or_raise(|| ErrorKind::Output)?;
    writeln!(stdout).or_raise(|| ErrorKind::Output)
}
