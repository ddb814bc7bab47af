//! Fixed output layout: no linearization, no stream compression, no object streams
//! Author: kartik4091

use lopdf::xref::XrefType;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use crate::structure::{decode_in_place, is_plain_flate, prune_unreachable};

/// Trailer keys that only make sense on a cross-reference stream
const XREF_STREAM_KEYS: &[&[u8]] = &[
    b"Type", b"W", b"Index", b"Filter", b"DecodeParms", b"Length", b"Prev", b"XRefStm", b"DL",
];

/// What the layout pass changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LayoutStats {
    pub linearization_dropped: bool,
    pub container_streams_dropped: usize,
    pub streams_decoded: usize,
    pub unreachable_dropped: usize,
}

/// Bring the object table into the classic one-object-per-entry layout
pub fn apply_legacy_layout(document: &mut Document) -> LayoutStats {
    let mut stats = LayoutStats {
        linearization_dropped: drop_linearization(document),
        container_streams_dropped: drop_container_streams(document),
        ..LayoutStats::default()
    };
    strip_xref_stream_trailer(document);
    // The reader keeps the input's xref kind and the writer follows it
    document.reference_table.cross_reference_type = XrefType::CrossReferenceTable;
    stats.streams_decoded = decode_streams(document);
    stats.unreachable_dropped = prune_unreachable(document);
    debug!("Output layout prepared: {:?}", stats);
    stats
}

/// Remove the linearization parameter dictionary. The hint stream it points
/// at by offset is unreferenced and goes with the unreachable objects.
fn drop_linearization(document: &mut Document) -> bool {
    let ids: Vec<ObjectId> = document
        .objects
        .iter()
        .filter(|(_, object)| matches!(object, Object::Dictionary(dict) if dict.has(b"Linearized")))
        .map(|(id, _)| *id)
        .collect();
    for id in &ids {
        document.objects.remove(id);
    }
    !ids.is_empty()
}

/// Remove `/ObjStm` and `/XRef` streams; their objects are already in the table
fn drop_container_streams(document: &mut Document) -> usize {
    let before = document.objects.len();
    document.objects.retain(|_, object| match object {
        Object::Stream(stream) => !matches!(
            stream.dict.get(b"Type"),
            Ok(Object::Name(name)) if name == b"ObjStm" || name == b"XRef"
        ),
        _ => true,
    });
    before - document.objects.len()
}

fn strip_xref_stream_trailer(document: &mut Document) {
    for key in XREF_STREAM_KEYS {
        document.trailer.remove(key);
    }
}

/// Write plain Flate streams decoded; anything else is left as it is
fn decode_streams(document: &mut Document) -> usize {
    let mut decoded = 0;
    for (id, object) in document.objects.iter_mut() {
        let Object::Stream(stream) = object else { continue };
        if !is_plain_flate(stream) {
            continue;
        }
        match decode_in_place(stream) {
            Ok(()) => decoded += 1,
            Err(e) => trace!("Keeping stream {} {} compressed: {}", id.0, id.1, e),
        }
    }
    decoded
}
