//! Error types shared across the instrumentation pipeline.

use std::fmt;

/// Errors emitted while turning a syntax tree into a control flow automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A construct is missing a field its grammar guarantees, e.g. an
    /// `if_statement` without a `condition`. Always an upstream parse defect.
    Structural {
        /// Grammar kind of the offending node.
        kind: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A placeholder node survived finalization without ever being anchored
    /// to a statement.
    Unanchored,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Structural { kind, field } => {
                write!(f, "`{kind}` node is missing its `{field}` field")
            }
            BuildError::Unanchored => {
                write!(f, "control flow graph still contains an unanchored placeholder")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Errors emitted while applying planned text edits to a source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Two identical edits target the same byte offset. Duplicate probe
    /// insertions indicate a planning defect, so the whole pass is aborted
    /// before any text is touched.
    Conflict {
        /// Byte offset both edits target.
        offset: usize,
    },
    /// An edit points outside the source buffer or into the middle of a
    /// UTF-8 code point.
    OutOfBounds {
        /// Offending byte offset.
        offset: usize,
    },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::Conflict { offset } => {
                write!(f, "duplicate text edit at byte offset {offset}")
            }
            EditError::OutOfBounds { offset } => {
                write!(f, "text edit offset {offset} is not a valid insertion point")
            }
        }
    }
}

impl std::error::Error for EditError {}
