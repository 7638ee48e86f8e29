pub mod convert;
pub mod editing;
pub mod error;
pub mod locate;

// Re-export key types for easier usage
pub use convert::{
    COLLAPSE_MAX_LINES, ToggledCode, block_toggle, brace_replacement_lines,
    doend_replacement_lines,
};
pub use editing::{Document, LineEnding, Patch};
pub use error::ToggleError;
pub use locate::{
    BlockDescriptor, LinePosition, MarkerPosition, Notation, current_block_descriptor,
    find_block_end, find_block_start,
};
