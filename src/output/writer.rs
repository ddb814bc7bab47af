//! Atomic serialization of a document to its output path

use std::io::{self, BufWriter, Write};
use std::path::Path;

use lopdf::Document;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::NormalizeError;

/// Serialize `document` to `output`.
///
/// Bytes go to a temporary file in the destination directory which is
/// renamed over `output` only after a complete write, so a failed save
/// never leaves a partial file at `output`.
pub fn write_atomically(document: &mut Document, output: &Path) -> Result<u64, NormalizeError> {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged =
        NamedTempFile::new_in(directory).map_err(|e| NormalizeError::write(output, e))?;
    {
        let mut buffered = BufWriter::new(staged.as_file_mut());
        document
            .save_to(&mut buffered)
            .map_err(|e| NormalizeError::write(output, io::Error::new(io::ErrorKind::Other, e.to_string())))?;
        buffered.flush().map_err(|e| NormalizeError::write(output, e))?;
    }
    staged
        .as_file()
        .sync_all()
        .map_err(|e| NormalizeError::write(output, e))?;

    let file = staged
        .persist(output)
        .map_err(|e| NormalizeError::write(output, e.error))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    debug!("Wrote {} bytes to {}", size, output.display());
    Ok(size)
}
