//! Catalog `/Metadata` stream access

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::error::NormalizeError;
use crate::metadata::xmp::XmpPacket;
use crate::structure::readable_content;

/// Object id of the document catalog
pub fn catalog_id(document: &Document) -> Result<ObjectId, NormalizeError> {
    match document.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => match document.objects.get(id) {
            Some(Object::Dictionary(_)) => Ok(*id),
            _ => Err(NormalizeError::Parse(format!(
                "catalog {} {} is missing or not a dictionary",
                id.0, id.1
            ))),
        },
        _ => Err(NormalizeError::Parse("trailer has no /Root reference".into())),
    }
}

fn catalog_mut(document: &mut Document) -> Result<&mut Dictionary, NormalizeError> {
    let id = catalog_id(document)?;
    match document.objects.get_mut(&id) {
        Some(Object::Dictionary(dict)) => Ok(dict),
        _ => Err(NormalizeError::Parse("catalog is not a dictionary".into())),
    }
}

/// The metadata stream referenced by the catalog, if there is one
pub fn metadata_stream_id(document: &Document) -> Option<ObjectId> {
    let catalog = catalog_id(document)
        .ok()
        .and_then(|id| document.objects.get(&id))?;
    let Object::Dictionary(catalog) = catalog else {
        return None;
    };
    match catalog.get(b"Metadata") {
        Ok(Object::Reference(id)) => match document.objects.get(id) {
            Some(Object::Stream(_)) => Some(*id),
            _ => None,
        },
        _ => None,
    }
}

/// Parse the document's packet. `None` when there is no usable packet.
pub fn read_packet(document: &Document) -> Option<XmpPacket> {
    let id = metadata_stream_id(document)?;
    let Some(Object::Stream(stream)) = document.objects.get(&id) else {
        return None;
    };
    let Some(content) = readable_content(stream) else {
        warn!("Metadata stream {} {} uses filters that cannot be decoded", id.0, id.1);
        return None;
    };
    match XmpPacket::parse(&content) {
        Ok(packet) => Some(packet),
        Err(e) => {
            warn!("Existing XMP packet is unreadable and will be replaced: {}", e);
            None
        }
    }
}

/// Store `content` as the document's metadata stream, uncompressed.
///
/// An existing stream object is rewritten in place; otherwise a new one is
/// added and linked from the catalog.
pub fn write_packet_bytes(document: &mut Document, content: Vec<u8>) -> Result<ObjectId, NormalizeError> {
    if let Some(id) = metadata_stream_id(document) {
        if let Some(Object::Stream(stream)) = document.objects.get_mut(&id) {
            stream.dict.remove(b"Filter");
            stream.dict.remove(b"DecodeParms");
            stream.dict.remove(b"DL");
            stream.dict.set("Type", Object::Name(b"Metadata".to_vec()));
            stream.dict.set("Subtype", Object::Name(b"XML".to_vec()));
            stream.set_content(content);
            debug!("Rewrote metadata stream {} {}", id.0, id.1);
            return Ok(id);
        }
    }

    let stream = Stream::new(
        dictionary! {
            "Type" => "Metadata",
            "Subtype" => "XML",
        },
        content,
    );
    let id = document.add_object(stream);
    catalog_mut(document)?.set("Metadata", Object::Reference(id));
    debug!("Created metadata stream {} {}", id.0, id.1);
    Ok(id)
}
