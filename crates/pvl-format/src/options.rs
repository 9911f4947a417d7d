//! Formatting options for PVL output.

/// Options for PVL rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces added per nesting level (default: 2)
    pub indent_width: usize,

    /// Column limit for keyword lines before values wrap (default: 80)
    pub char_limit: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            char_limit: 80,
        }
    }
}

impl FormatOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation step.
    pub fn indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Set the column limit used for wrapping.
    pub fn char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }
}
