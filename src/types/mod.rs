use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Point};

/// A document-relative position: 0-based line, 0-based column.
///
/// Ordering is line-major, then column, which the derived `Ord` provides
/// through field order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn from_point(point: Point) -> Self {
        Self {
            line: point.row as u32,
            column: point.column as u32,
        }
    }
}

/// A start/end position pair delimiting a syntactic construct.
///
/// End-exclusive: `end` points one past the last character of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span covering the full extent of a parse-tree node.
    pub fn of_node(node: &Node) -> Self {
        Self {
            start: Position::from_point(node.start_position()),
            end: Position::from_point(node.end_position()),
        }
    }

    /// Span of a single terminal token: end = start + token text length.
    ///
    /// Columns count bytes, matching tree-sitter's own column convention.
    pub fn of_token(node: &Node, code: &str) -> Self {
        let start = Position::from_point(node.start_position());
        let len = code[node.byte_range()].len() as u32;
        Self {
            start,
            end: Position::new(start.line, start.column + len),
        }
    }

    /// Zero-width span at a single position.
    pub fn empty_at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `other` lies entirely within this span (inclusive bounds).
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}
