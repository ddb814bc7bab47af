//! Error types and handling for the PDF metadata normalizer
//! Author: kartik4091

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for pdfmeta operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for pdfmeta operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("{0}")]
    NormalizeError(#[from] NormalizeError),

    #[error("Transport error: {0}")]
    TransportError(#[from] TransportError),

    #[error("Input rejected: {0}")]
    InputRejected(String),

    #[error("Timed out after {0} seconds")]
    TimeoutError(u64),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

// -------------------- Sub-Error Categories --------------------

/// Failures of the metadata normalization transform
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NormalizeError {
    #[error("Cannot parse PDF: {0}")]
    Parse(String),

    #[error("Unsupported PDF: {0}")]
    Unsupported(String),

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl NormalizeError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NormalizeError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Reasons an embedded XMP packet cannot be edited in place
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum XmpError {
    #[error("XMP packet is not UTF-8")]
    Encoding,

    #[error("malformed XMP: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XMP attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("unbalanced XMP markup")]
    Unbalanced,

    #[error("XMP packet has no rdf:RDF element")]
    MissingRdf,
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config parsing error: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Bot API returned an error: {0}")]
    Api(String),

    #[error("Malformed Bot API response: {0}")]
    Malformed(String),

    #[error("I/O error during transfer: {0}")]
    Io(#[from] io::Error),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            // The Bot API reports failures as JSON bodies with non-2xx statuses
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                TransportError::Api(format!("HTTP {}: {}", code, body))
            }
            ureq::Error::Transport(t) => TransportError::Http(t.to_string()),
        }
    }
}
