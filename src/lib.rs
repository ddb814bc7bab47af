//! Main Library File for the PDF metadata normalizer
//! Rewrites Author, Creator and Producer in a PDF's Info dictionary and XMP
//! packet, and serves the transform to a chat bot.

// Configuration and errors
pub mod config;
pub mod error;

// Document model
pub mod pdf_document;
pub mod structure;

// Metadata surfaces
pub mod metadata;

// Output generation
pub mod output;

// The transform
pub mod normalizer;

// Inspection
pub mod report;

// Chat front end
pub mod transport;
pub mod bot;

// Re-exports for crate consumers
pub use bot::Bot;
pub use config::{BotConfig, MetadataTarget};
pub use error::{ConfigError, Error, NormalizeError, Result, TransportError};
pub use normalizer::normalize;
pub use pdf_document::PdfDocument;
pub use report::{MetadataReport, ReportFormat, ReportFormatter};
pub use transport::{TelegramClient, Transport};
