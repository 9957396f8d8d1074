//! ZIP packaging of rendered registration letters.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::pdf::RenderedArtifact;

/// Fatal archive failure; no retry, surfaced to the caller.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Name of the archive produced for one building.
pub fn archive_filename(building_name: &str) -> String {
    sanitize_filename::sanitize(format!("Registrierungscodes_{building_name}.zip"))
}

/// Compress all rendered letters into a single in-memory ZIP archive.
///
/// Duplicate filenames overwrite rather than error; building and apartment
/// name pairs are assumed unique within one batch, so this only matters for
/// pathological data. `on_progress` receives percent values from 0 to 100.
pub fn pack<F>(files: &[RenderedArtifact], mut on_progress: F) -> Result<Vec<u8>, PackagingError>
where
    F: FnMut(usize),
{
    on_progress(0);

    // Last occurrence wins, at the position of the first.
    let mut ordered: Vec<&RenderedArtifact> = Vec::with_capacity(files.len());
    for file in files {
        match ordered.iter().position(|f| f.filename == file.filename) {
            Some(existing) => ordered[existing] = file,
            None => ordered.push(file),
        }
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let total = ordered.len();
    for (index, file) in ordered.iter().enumerate() {
        writer.start_file(file.filename.as_str(), options)?;
        writer.write_all(&file.bytes)?;
        on_progress((index + 1) * 100 / total);
    }
    if total == 0 {
        on_progress(100);
    }

    Ok(writer.finish()?.into_inner())
}
