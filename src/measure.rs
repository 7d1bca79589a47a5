use unicode_width::UnicodeWidthStr;

/// Line-width budget for generated source.
pub struct LineMetrics {
    pub max_width: usize,
    pub indent_width: usize,
}

impl Default for LineMetrics {
    fn default() -> Self {
        Self {
            max_width: 80,
            indent_width: 2,
        }
    }
}

impl LineMetrics {
    pub fn text_width(&self, text: &str) -> usize {
        UnicodeWidthStr::width(text)
    }

    /// Whether `text` fits on one line at the given nesting depth.
    pub fn fits(&self, depth: usize, text: &str) -> bool {
        depth * self.indent_width + self.text_width(text) <= self.max_width
    }
}
