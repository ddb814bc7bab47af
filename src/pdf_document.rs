//! PDF Document abstraction
//! Author: kartik4091

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{debug, info};

use crate::config::MetadataTarget;
use crate::error::NormalizeError;
use crate::metadata::{self, catalog_id};
use crate::output::{apply_legacy_layout, write_atomically};

/// A document opened from exactly one input file and saved to exactly one output
#[derive(Debug)]
pub struct PdfDocument {
    document: Document,
    source: PathBuf,
}

impl PdfDocument {
    /// Load `path`; encrypted or structurally broken files are refused
    pub fn open(path: &Path) -> Result<Self, NormalizeError> {
        let bytes = fs::read(path)
            .map_err(|e| NormalizeError::Parse(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_bytes(&bytes, path)
    }

    pub fn from_bytes(bytes: &[u8], source: impl Into<PathBuf>) -> Result<Self, NormalizeError> {
        let source = source.into();
        let document = match Document::load_mem(bytes) {
            Ok(document) => document,
            Err(_) if contains_encrypt_key(bytes) => {
                return Err(NormalizeError::Unsupported(
                    "document is encrypted and no credentials are available".into(),
                ));
            }
            Err(e) => return Err(NormalizeError::Parse(e.to_string())),
        };

        if document.trailer.has(b"Encrypt") {
            return Err(NormalizeError::Unsupported(
                "document is encrypted and no credentials are available".into(),
            ));
        }
        catalog_id(&document)?;

        debug!(
            "Opened {} (PDF {}, {} objects)",
            source.display(),
            document.version,
            document.objects.len()
        );
        Ok(Self { document, source })
    }

    pub fn apply_target(&mut self, target: &MetadataTarget) -> Result<(), NormalizeError> {
        metadata::apply_target(&mut self.document, target)
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serialize under the fixed legacy layout and release the document
    pub fn save(mut self, output: &Path) -> Result<u64, NormalizeError> {
        apply_legacy_layout(&mut self.document);
        let size = write_atomically(&mut self.document, output)?;
        info!("Saved {} as {}", self.source.display(), output.display());
        Ok(size)
    }
}

fn contains_encrypt_key(bytes: &[u8]) -> bool {
    bytes.windows(b"/Encrypt".len()).any(|window| window == b"/Encrypt")
}
