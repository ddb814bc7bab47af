//! Stream filter inspection and decoding

use std::io::{self, Read};

use flate2::read::ZlibDecoder;
use lopdf::{Dictionary, Object, Stream};

/// Filter names declared by a stream dictionary, in application order
pub fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether the stream is plain FlateDecode with no predictor applied
pub fn is_plain_flate(stream: &Stream) -> bool {
    let filters = stream_filters(&stream.dict);
    if filters.len() != 1 || filters[0] != b"FlateDecode" {
        return false;
    }
    match stream.dict.get(b"DecodeParms") {
        Err(_) | Ok(Object::Null) => true,
        Ok(Object::Dictionary(params)) => predictor_is_identity(params),
        Ok(Object::Array(items)) => items.iter().all(|item| match item {
            Object::Dictionary(params) => predictor_is_identity(params),
            Object::Null => true,
            _ => false,
        }),
        Ok(_) => false,
    }
}

fn predictor_is_identity(params: &Dictionary) -> bool {
    match params.get(b"Predictor") {
        Err(_) => true,
        Ok(Object::Integer(p)) => *p <= 1,
        Ok(_) => false,
    }
}

/// Inflate zlib-wrapped data
pub fn inflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data).read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Replace the stream body with its decoded form and drop the filter entries
pub fn decode_in_place(stream: &mut Stream) -> io::Result<()> {
    let decoded = inflate(&stream.content)?;
    stream.dict.remove(b"Filter");
    stream.dict.remove(b"DecodeParms");
    stream.dict.remove(b"DL");
    stream.set_content(decoded);
    Ok(())
}

/// Readable content of a stream: raw when unfiltered, inflated for plain Flate
pub fn readable_content(stream: &Stream) -> Option<Vec<u8>> {
    if stream_filters(&stream.dict).is_empty() {
        return Some(stream.content.clone());
    }
    if is_plain_flate(stream) {
        return inflate(&stream.content).ok();
    }
    None
}
