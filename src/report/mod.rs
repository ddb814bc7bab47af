//! Metadata report for inspecting a document's two metadata surfaces
//! Author: kartik4091

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, NormalizeError};
use crate::metadata::{read_info, read_packet, DC_CREATOR, PDF_PRODUCER, XMP_CREATOR_TOOL};
use crate::pdf_document::PdfDocument;

pub mod formatter;

pub use formatter::ReportFormatter;

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    PlainText,
    Json,
}

/// Report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{0}")]
    Document(#[from] NormalizeError),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ReportError> for Error {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Document(e) => Error::NormalizeError(e),
            ReportError::SerializationError(e) => Error::InternalError(e),
        }
    }
}

/// The three values this tool manages, as found in the XMP packet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmpSummary {
    pub creator: Vec<String>,
    pub creator_tool: Option<String>,
    pub producer: Option<String>,
}

/// What a document currently says about itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataReport {
    pub file: String,
    pub pdf_version: String,
    pub page_count: usize,
    pub info: BTreeMap<String, String>,
    pub xmp: Option<XmpSummary>,
}

impl MetadataReport {
    pub fn read(path: &Path) -> Result<Self, ReportError> {
        let document = PdfDocument::open(path)?;
        let inner = document.document();

        let xmp = read_packet(inner).map(|packet| XmpSummary {
            creator: packet.get_seq(DC_CREATOR),
            creator_tool: packet.get_text(XMP_CREATOR_TOOL),
            producer: packet.get_text(PDF_PRODUCER),
        });

        Ok(Self {
            file: path.display().to_string(),
            pdf_version: inner.version.clone(),
            page_count: document.page_count(),
            info: read_info(inner),
            xmp,
        })
    }

    pub fn author(&self) -> Option<&str> {
        self.info.get("Author").map(String::as_str)
    }

    pub fn creator(&self) -> Option<&str> {
        self.info.get("Creator").map(String::as_str)
    }

    pub fn producer(&self) -> Option<&str> {
        self.info.get("Producer").map(String::as_str)
    }
}
