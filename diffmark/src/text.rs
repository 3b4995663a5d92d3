//! Line documents for plain and full-text comparisons.

/// A text document split into lines.
///
/// Line endings (`\n` or `\r\n`) are not part of the lines. A trailing line
/// ending does not start an extra empty line, and empty input has no lines.
/// Whitespace-only lines are still lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
}

impl TextDocument {
    /// Splits `raw` into lines.
    pub fn parse(raw: &str) -> Self {
        TextDocument {
            lines: raw.lines().map(str::to_string).collect(),
        }
    }

    /// Returns the lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the 1-based line `number`.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
