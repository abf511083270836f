//! FILENAME: core/export/src/artifact.rs
//! PURPOSE: A finished export: suggested filename, MIME type and bytes.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

use crate::error::ExportError;
use crate::filename::ExportFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn new(format: ExportFormat, filename: String, bytes: Vec<u8>) -> Self {
        ExportArtifact {
            format,
            filename,
            mime: format.mime_type(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Write the artifact into `dir` under its filename. The bytes go to a
    /// temporary file in the same directory first and are renamed into place,
    /// so a partially written artifact never appears.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let target = dir.join(&self.filename);
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&self.bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&target).map_err(|e| ExportError::Io(e.error))?;

        info!("saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}
