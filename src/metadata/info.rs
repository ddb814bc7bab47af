//! Document Information Dictionary editing
//! Author: kartik4091

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::config::MetadataTarget;
use crate::error::NormalizeError;
use crate::metadata::text::{encode_text_string, object_text};

/// Where the trailer keeps its Info dictionary
enum InfoLocation {
    Indirect(ObjectId),
    Inline,
}

/// Overwrite Author, Creator and Producer, creating the dictionary if needed
pub fn apply_info(document: &mut Document, target: &MetadataTarget) -> Result<(), NormalizeError> {
    let info = info_dictionary_mut(document)?;
    info.set("Author", encode_text_string(&target.author));
    info.set("Creator", encode_text_string(&target.creator));
    info.set("Producer", encode_text_string(&target.producer));
    debug!("Info dictionary updated with {} entries", info.len());
    Ok(())
}

/// Text entries of the Info dictionary; non-string values are skipped
pub fn read_info(document: &Document) -> BTreeMap<String, String> {
    let dictionary = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => match document.objects.get(id) {
            Some(Object::Dictionary(dict)) => dict,
            _ => return BTreeMap::new(),
        },
        Ok(Object::Dictionary(dict)) => dict,
        _ => return BTreeMap::new(),
    };

    dictionary
        .iter()
        .filter_map(|(key, value)| {
            object_text(value).map(|text| (String::from_utf8_lossy(key).into_owned(), text))
        })
        .collect()
}

fn info_dictionary_mut(document: &mut Document) -> Result<&mut Dictionary, NormalizeError> {
    match locate_info(document) {
        InfoLocation::Indirect(id) => match document.objects.get_mut(&id) {
            Some(Object::Dictionary(dict)) => Ok(dict),
            _ => Err(NormalizeError::Parse(format!(
                "Info object {} {} is not a dictionary",
                id.0, id.1
            ))),
        },
        InfoLocation::Inline => match document.trailer.get_mut(b"Info") {
            Ok(Object::Dictionary(dict)) => Ok(dict),
            _ => Err(NormalizeError::Parse("trailer Info entry changed shape".into())),
        },
    }
}

fn locate_info(document: &mut Document) -> InfoLocation {
    match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => {
            let id = *id;
            if let Some(Object::Dictionary(_)) = document.objects.get(&id) {
                return InfoLocation::Indirect(id);
            }
            warn!("Trailer Info points at {} {} which is not a dictionary, replacing it", id.0, id.1);
        }
        Ok(Object::Dictionary(_)) => return InfoLocation::Inline,
        Ok(_) => warn!("Trailer Info entry has an unexpected type, replacing it"),
        Err(_) => debug!("Document has no Info dictionary, creating one"),
    }

    let id = document.add_object(Dictionary::new());
    document.trailer.set("Info", Object::Reference(id));
    InfoLocation::Indirect(id)
}
