use std::collections::BTreeSet;

use lopdf::{Document, Object, ObjectId};

/// Every object id reachable from the trailer, following references through
/// arrays, dictionaries and stream dictionaries
pub fn reachable_objects(document: &Document) -> BTreeSet<ObjectId> {
    let mut visited = BTreeSet::new();
    let mut pending: Vec<&Object> = document.trailer.iter().map(|(_, value)| value).collect();

    while let Some(object) = pending.pop() {
        match object {
            Object::Reference(id) => {
                if let Some(target) = document.objects.get(id) {
                    if visited.insert(*id) {
                        pending.push(target);
                    }
                }
            }
            Object::Array(items) => pending.extend(items.iter()),
            Object::Dictionary(dict) => pending.extend(dict.iter().map(|(_, value)| value)),
            Object::Stream(stream) => pending.extend(stream.dict.iter().map(|(_, value)| value)),
            _ => {}
        }
    }

    visited
}

/// Drop objects nothing reaches; returns how many were removed
pub fn prune_unreachable(document: &mut Document) -> usize {
    let reachable = reachable_objects(document);
    let before = document.objects.len();
    document.objects.retain(|id, _| reachable.contains(id));
    before - document.objects.len()
}
