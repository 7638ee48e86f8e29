use crate::convert::ToggledCode;

/// Result of applying a toggle to a document
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub changed: Vec<std::ops::Range<usize>>,
    pub new_selection: std::ops::Range<usize>,
    pub version: u64,
    pub toggled: ToggledCode,
}
