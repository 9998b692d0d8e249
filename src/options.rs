use crate::constants::MAX_DEPTH;

/// Knobs for document parsing. Construct with `ParseOptions::new()` and
/// chain `with_*` calls.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}
