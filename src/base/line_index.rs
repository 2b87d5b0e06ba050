//! Byte offset <-> line/column conversion.

use text_size::TextSize;

use super::SourceFilePosition;

/// Line start table for a piece of text.
///
/// Columns are counted in characters. An origin can be set so a fragment
/// parsed on its own reports positions as if it sat inside a larger file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    origin_line: usize,
    origin_column: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        Self::with_origin(text, 0, 0)
    }

    pub fn with_origin(text: &str, origin_line: usize, origin_column: usize) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            line_starts,
            origin_line,
            origin_column,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of a byte offset in `text` (which must be the indexed text).
    pub fn position(&self, text: &str, offset: TextSize) -> SourceFilePosition {
        let offset = usize::from(offset).min(text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let mut column = text[line_start..offset].chars().count();
        if line == 0 {
            column += self.origin_column;
        }
        SourceFilePosition::new(self.origin_line + line, column)
    }

    /// Byte offset of an effective `(line, column)` in `text`.
    ///
    /// Coordinates past the end of a line clamp to the line end; lines past
    /// the end of the text clamp to the text end.
    pub fn offset(&self, text: &str, line: usize, column: usize) -> usize {
        let Some(relative_line) = line.checked_sub(self.origin_line) else {
            return 0;
        };
        let Some(&line_start) = self.line_starts.get(relative_line) else {
            return text.len();
        };
        let line_end = self
            .line_starts
            .get(relative_line + 1)
            .map(|next| next - 1)
            .unwrap_or(text.len());
        let column = if relative_line == 0 {
            column.saturating_sub(self.origin_column)
        } else {
            column
        };
        text[line_start..line_end]
            .char_indices()
            .nth(column)
            .map(|(i, _)| line_start + i)
            .unwrap_or(line_end)
    }
}
