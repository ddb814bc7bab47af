//! The metadata normalization transform
//! Author: kartik4091

use std::path::Path;

use tracing::instrument;

use crate::config::MetadataTarget;
use crate::error::NormalizeError;
use crate::pdf_document::PdfDocument;

/// Rewrite Author, Creator and Producer of `input` into a new file at `output`.
///
/// Both the Info dictionary and the XMP packet receive the target values;
/// everything else in the document is carried over. Nothing is left at
/// `output` when this returns an error.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn normalize(input: &Path, output: &Path, target: &MetadataTarget) -> Result<(), NormalizeError> {
    let mut document = PdfDocument::open(input)?;
    document.apply_target(target)?;
    document.save(output)?;
    Ok(())
}
