//! Source spans - stable positions for every node the core touches
//!
//! Format: `<line>:<column>` for display, byte offsets for ordering.
//!
//! Examples:
//! - `3:9` (line 3, column 9, 1-indexed)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A region of source text.
///
/// Byte offsets drive source-order comparisons (temporal dead zone checks);
/// line and column are kept for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    /// Length of the spanned text in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely within this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether this span starts before `offset` in source order
    pub fn precedes(&self, offset: usize) -> bool {
        self.start < offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl FromStr for Span {
    type Err = Error;

    /// Parse `line:column@start..end`, the form used in JSON keys and test fixtures.
    fn from_str(s: &str) -> Result<Self> {
        let (position, range) = s
            .split_once('@')
            .ok_or_else(|| Error::InvalidKind(format!("span must contain @range: {}", s)))?;
        let (line, column) = position
            .split_once(':')
            .ok_or_else(|| Error::InvalidKind(format!("span must contain line:column: {}", s)))?;
        let (start, end) = range
            .split_once("..")
            .ok_or_else(|| Error::InvalidKind(format!("span range must be start..end: {}", s)))?;

        let number = |text: &str| -> Result<usize> {
            text.parse()
                .map_err(|_| Error::InvalidKind(format!("invalid span number: {}", text)))
        };

        Ok(Self {
            start: number(start)?,
            end: number(end)?,
            line: number(line)? as u32,
            column: number(column)? as u32,
        })
    }
}
