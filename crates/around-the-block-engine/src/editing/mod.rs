//! Host-side editing: holds a file in a rope and applies toggle results to it
//! as line-range replacements.

pub mod document;
pub mod patch;

pub use document::{Document, LineEnding};
pub use patch::Patch;
