//! Object graph helpers shared by the metadata editors and the writer

pub mod filters;
pub mod relationships;

pub use filters::{decode_in_place, is_plain_flate, readable_content, stream_filters};
pub use relationships::{prune_unreachable, reachable_objects};
