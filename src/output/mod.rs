//! Output generation: fixed layout policy plus atomic write

pub mod layout;
pub mod writer;

pub use layout::{apply_legacy_layout, LayoutStats};
pub use writer::write_atomically;
