use crate::{
    TempFile, ThumbnailAsset,
    error::{ErrorKind, Result},
};
use exn::ResultExt;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

const PREFIX: &str = "r34v-thumbnail-";

/// Holds at most one transformed thumbnail on disk.
///
/// Storing a new thumbnail deletes the previous file first, and dropping the
/// scratch deletes whatever it still holds.
#[derive(Debug, Default)]
pub struct Scratch {
    dir: Option<PathBuf>,
    current: Option<TempFile>,
}
impl Scratch {
    /// Scratch files in the system temporary directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()), current: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.current.as_ref().map(TempFile::path)
    }

    #[instrument(skip_all, fields(size = asset.transformed_bytes.len()))]
    pub fn store(&mut self, asset: &ThumbnailAsset) -> Result<&Path> {
        self.clear()?;
        let suffix = format!(".{}", asset.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX).suffix(&suffix);
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .or_raise(|| ErrorKind::Io)?;
        file.write_all(&asset.transformed_bytes).or_raise(|| ErrorKind::Io)?;
        file.flush().or_raise(|| ErrorKind::Io)?;
        debug!(path = %file.path().display(), "stored thumbnail in scratch file");
        Ok(self.current.insert(file).path())
    }

    /// Delete the currently held file, if any.
    pub fn clear(&mut self) -> Result<()> {
        if let Some(file) = self.current.take() {
            debug!(path = %file.path().display(), "removing previous scratch file");
            file.close().or_raise(|| ErrorKind::Io)?;
        }
        Ok(())
    }

    /// Delete files left behind by earlier processes using the same directory.
    ///
    /// Only meaningful with [`in_dir`](Self::in_dir); the currently held file
    /// is kept.
    #[instrument(skip(self))]
    pub fn sweep(&self) -> Result<usize> {
        let Some(dir) = &self.dir else {
            return Ok(0);
        };
        let mut removed = 0;
        for entry in fs::read_dir(dir).or_raise(|| ErrorKind::Io)? {
            let path = entry.or_raise(|| ErrorKind::Io)?.path();
            let is_scratch = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(PREFIX));
            if is_scratch && path.is_file() && Some(path.as_path()) != self.path() {
                fs::remove_file(&path).or_raise(|| ErrorKind::Io)?;
                removed += 1;
            }
        }
        debug!(removed, "swept stale scratch files");
        Ok(removed)
    }

    /// Release the current file so it outlives the scratch.
    pub fn persist(mut self) -> Result<Option<PathBuf>> {
        let Some(file) = self.current.take() else {
            return Ok(None);
        };
        let (_, path) = file.keep().or_raise(|| ErrorKind::Io)?;
        Ok(Some(path))
    }
}
