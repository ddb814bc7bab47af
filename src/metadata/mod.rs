//! Metadata handling for the Info dictionary and the XMP packet
//! Author: kartik4091

use lopdf::Document;
use tracing::{debug, info, instrument};

use crate::config::MetadataTarget;
use crate::error::NormalizeError;

pub mod info;
pub mod stream;
pub mod text;
pub mod xmp;

pub use info::{apply_info, read_info};
pub use stream::{catalog_id, metadata_stream_id, read_packet};
pub use xmp::{Property, PropertyValue, XmpPacket, DC_CREATOR, PDF_PRODUCER, XMP_CREATOR_TOOL};

/// Write the target triple into both metadata surfaces
#[instrument(skip_all)]
pub fn apply_target(document: &mut Document, target: &MetadataTarget) -> Result<(), NormalizeError> {
    apply_info(document, target)?;
    apply_xmp(document, target)?;
    info!("Metadata rewritten in Info dictionary and XMP packet");
    Ok(())
}

/// Rewrite the XMP packet, creating one when the document has none
pub fn apply_xmp(document: &mut Document, target: &MetadataTarget) -> Result<(), NormalizeError> {
    let mut packet = match read_packet(document) {
        Some(packet) => packet,
        None => {
            debug!("No usable XMP packet, starting from an empty one");
            XmpPacket::empty().map_err(|e| NormalizeError::Parse(e.to_string()))?
        }
    };

    packet.set_seq(DC_CREATOR, &[target.author.as_str()]);
    packet.set_text(XMP_CREATOR_TOOL, &target.creator);
    packet.set_text(PDF_PRODUCER, &target.producer);

    let bytes = packet
        .to_bytes()
        .map_err(|e| NormalizeError::Parse(format!("cannot serialize XMP packet: {}", e)))?;
    stream::write_packet_bytes(document, bytes)?;
    Ok(())
}
