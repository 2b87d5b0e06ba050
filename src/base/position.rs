/// Position tracking for AST nodes
///
/// A node's range is recorded when the file is parsed. Edits applied after
/// that parse do not move the recorded coordinates; they accumulate a
/// [`Shift`] instead, so the tree stays usable until the next reparse.
use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Accumulated drift of a position since it was parsed.
///
/// A shift that crosses lines (non-zero `lines`) replaces the column offset
/// instead of adding to it: once a position lands on a different line, the
/// offsets collected on its old line no longer apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shift {
    pub lines: i64,
    pub columns: i64,
    crossed_lines: bool,
}

impl Shift {
    pub const NONE: Shift = Shift {
        lines: 0,
        columns: 0,
        crossed_lines: false,
    };

    pub fn new(lines: i64, columns: i64) -> Self {
        Self {
            lines,
            columns,
            crossed_lines: false,
        }
    }

    pub fn lines(lines: i64) -> Self {
        Self::new(lines, 0)
    }

    pub fn columns(columns: i64) -> Self {
        Self::new(0, columns)
    }

    /// Whether applying this shift resets the column offset of a position.
    pub fn crosses_lines(&self) -> bool {
        self.lines != 0 || self.crossed_lines
    }

    /// The single shift equivalent to applying `self` and then `next`.
    pub fn then(self, next: Shift) -> Shift {
        let columns = if next.crosses_lines() {
            next.columns
        } else {
            self.columns + next.columns
        };
        Shift {
            lines: self.lines + next.lines,
            columns,
            crossed_lines: self.crosses_lines() || next.crosses_lines(),
        }
    }

    /// The shift that moves `position` onto the effective coordinates `(line, column)`.
    pub fn between(position: &SourceFilePosition, line: usize, column: usize) -> Shift {
        let lines = line as i64 - position.line() as i64;
        if lines != 0 {
            // Crossing lines replaces the column offset, so it is measured
            // from the initial column rather than the effective one.
            Shift::new(lines, column as i64 - position.initial_column as i64)
        } else {
            Shift::columns(column as i64 - position.column() as i64)
        }
    }

    pub fn is_none(&self) -> bool {
        self.lines == 0 && self.columns == 0 && !self.crossed_lines
    }
}

/// A position in a source file (0-indexed, columns in characters).
///
/// Equality and ordering use the effective coordinates, so two positions
/// parsed at different places can compare equal after edits.
#[derive(Debug, Clone, Copy)]
pub struct SourceFilePosition {
    initial_line: usize,
    initial_column: usize,
    shift: Shift,
}

impl SourceFilePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            initial_line: line,
            initial_column: column,
            shift: Shift::NONE,
        }
    }

    pub fn initial_line(&self) -> usize {
        self.initial_line
    }

    pub fn initial_column(&self) -> usize {
        self.initial_column
    }

    pub fn shift(&self) -> Shift {
        self.shift
    }

    /// Effective line: initial line plus the accumulated shift.
    pub fn line(&self) -> usize {
        (self.initial_line as i64 + self.shift.lines).max(0) as usize
    }

    /// Effective column: initial column plus the accumulated shift.
    pub fn column(&self) -> usize {
        (self.initial_column as i64 + self.shift.columns).max(0) as usize
    }

    /// Returns a new position with `delta` applied on top of the current shift.
    pub fn shifted_by(&self, delta: Shift) -> Self {
        Self {
            initial_line: self.initial_line,
            initial_column: self.initial_column,
            shift: self.shift.then(delta),
        }
    }

    /// Returns a new position moved onto the given effective coordinates.
    pub fn moved_to(&self, line: usize, column: usize) -> Self {
        self.shifted_by(Shift::between(self, line, column))
    }

    /// Returns a position with the shift folded into the initial coordinates.
    pub fn rebased(&self) -> Self {
        Self::new(self.line(), self.column())
    }
}

/// Compare two positions by effective line, then effective column.
pub fn compare(a: &SourceFilePosition, b: &SourceFilePosition) -> Ordering {
    a.line()
        .cmp(&b.line())
        .then_with(|| a.column().cmp(&b.column()))
}

impl PartialEq for SourceFilePosition {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for SourceFilePosition {}

impl PartialOrd for SourceFilePosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceFilePosition {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl fmt::Display for SourceFilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line(), self.column())
    }
}

/// A range was built with its end before its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid range: {from} is after {to}")]
pub struct InvalidRange {
    pub from: SourceFilePosition,
    pub to: SourceFilePosition,
}

/// A range in a source file, `from <= to` under the position order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFileRange {
    from: SourceFilePosition,
    to: SourceFilePosition,
}

impl SourceFileRange {
    pub fn new(from: SourceFilePosition, to: SourceFilePosition) -> Result<Self, InvalidRange> {
        if from > to {
            return Err(InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Create a range covering both positions, whichever comes first.
    pub fn spanning(a: SourceFilePosition, b: SourceFilePosition) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    /// Create a range from line/column coordinates, swapping the ends if needed.
    pub fn from_coords(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self::spanning(
            SourceFilePosition::new(start_line, start_col),
            SourceFilePosition::new(end_line, end_col),
        )
    }

    pub fn from(&self) -> SourceFilePosition {
        self.from
    }

    pub fn to(&self) -> SourceFilePosition {
        self.to
    }

    /// Check if a position falls within this range (both ends inclusive)
    pub fn contains(&self, position: &SourceFilePosition) -> bool {
        self.from <= *position && *position <= self.to
    }

    pub fn contains_range(&self, other: &SourceFileRange) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Map both ends through an edit. The edit mapping is monotone, so the
    /// result is still ordered.
    pub fn mapped_through(&self, edit: &TextEdit) -> Self {
        Self {
            from: edit.map_position(&self.from),
            to: edit.map_position(&self.to),
        }
    }
}

impl fmt::Display for SourceFileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// A text replacement expressed in effective coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: SourceFileRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: SourceFileRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: SourceFilePosition, text: impl Into<String>) -> Self {
        Self::new(SourceFileRange { from: at, to: at }, text)
    }

    /// Effective `(line, column)` where the inserted text ends.
    pub fn new_end(&self) -> (usize, usize) {
        let start = self.range.from;
        match self.new_text.rfind('\n') {
            None => (start.line(), start.column() + self.new_text.chars().count()),
            Some(last_newline) => {
                let added_lines = self.new_text.matches('\n').count();
                let tail = self.new_text[last_newline + 1..].chars().count();
                (start.line() + added_lines, tail)
            }
        }
    }

    /// Where `position` ends up once this edit is applied.
    pub fn map_position(&self, position: &SourceFilePosition) -> SourceFilePosition {
        let start = self.range.from;
        let old_end = self.range.to;
        let (end_line, end_column) = self.new_end();

        // The start of a non-empty replaced range still begins the new text.
        if *position < start || (*position == start && start < old_end) {
            return *position;
        }
        if *position < old_end {
            return position.moved_to(end_line, end_column);
        }

        let line_delta = end_line as i64 - old_end.line() as i64;
        if position.line() == old_end.line() {
            let column = end_column + (position.column() - old_end.column());
            position.moved_to(end_line, column)
        } else if line_delta != 0 {
            position.moved_to((position.line() as i64 + line_delta) as usize, position.column())
        } else {
            *position
        }
    }
}
