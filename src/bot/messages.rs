//! Reply texts and the upload acceptance check

use crate::config::MetadataTarget;

pub const SEND_AS_FILE: &str = "Send the PDF as a file.";
pub const NOT_A_PDF: &str = "This is not a PDF file.";
pub const SEND_AS_DOCUMENT: &str = "Send a PDF as a document.";
pub const DONE_CAPTION: &str = "Done ✅ Metadata updated";

pub fn start_text(target: &MetadataTarget) -> String {
    format!(
        "Send me a PDF and I will change its metadata:\n\
         Author → {}\n\
         Creator → {}\n\
         Producer → {}",
        target.author, target.creator, target.producer
    )
}

pub fn failure_text(error: &impl std::fmt::Display) -> String {
    format!("Failed to process PDF: {}", error)
}

/// An upload is a PDF if it says so by content type or by file name
pub fn is_pdf(mime_type: Option<&str>, file_name: &str) -> bool {
    let declared = mime_type.map_or(false, |mime| mime.trim().eq_ignore_ascii_case("application/pdf"));
    declared || file_name.to_ascii_lowercase().ends_with(".pdf")
}
