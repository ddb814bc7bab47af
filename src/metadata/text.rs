//! PDF text string encoding for Info dictionary values

use lopdf::{Object, StringFormat};

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Encode `value` as a PDF text string object.
///
/// Printable ASCII stays a literal string; everything else becomes UTF-16BE
/// with a byte order mark.
pub fn encode_text_string(value: &str) -> Object {
    if value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = Vec::with_capacity(2 + value.len() * 2);
    bytes.extend_from_slice(&UTF16BE_BOM);
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode raw text string bytes, UTF-16BE when marked, Latin-1 otherwise
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&UTF16BE_BOM) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(body) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(body).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Text value of a string object, if it is one
pub fn object_text(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}
