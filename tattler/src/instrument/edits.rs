//! Byte-offset text edits and their application.

use rustc_hash::FxHashSet;
use tree_sitter::Node;

use crate::error::EditError;

/// How an edit attaches to its anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Text lands at the anchor's `start_byte`, before the node.
    InsertBefore,
    /// Text lands at the anchor's `end_byte`, after the node.
    AppendAfter,
}

/// One planned text splice into the unpatched source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edit {
    /// Placement relative to the anchor node.
    pub kind: EditKind,
    /// Byte offset into the unpatched source.
    pub offset: usize,
    /// Text to splice in.
    pub text: String,
}

impl Edit {
    /// An edit inserting `text` just before `node`.
    ///
    /// `None` when `text` is empty; empty splices are dropped at
    /// construction so plans carry only effective edits.
    #[must_use]
    pub fn insert(node: Node<'_>, text: impl Into<String>) -> Option<Edit> {
        Self::at(EditKind::InsertBefore, node.start_byte(), text.into())
    }

    /// An edit appending `text` right after `node`. Same empty-text rule
    /// as [`Edit::insert`].
    #[must_use]
    pub fn append(node: Node<'_>, text: impl Into<String>) -> Option<Edit> {
        Self::at(EditKind::AppendAfter, node.end_byte(), text.into())
    }

    fn at(kind: EditKind, offset: usize, text: String) -> Option<Edit> {
        if text.is_empty() {
            return None;
        }
        Some(Edit { kind, offset, text })
    }
}

/// Applies `edits` to `source`, producing the patched text.
///
/// Every offset and every edit is validated before any text moves, so an
/// error leaves nothing half-spliced. Edits apply highest offset first,
/// keeping lower offsets valid; edits sharing an offset keep construction
/// order, which puts the later-constructed text earlier in the output.
/// The caller re-parses the patched source once.
///
/// # Errors
///
/// [`EditError::OutOfBounds`] when an offset is past the end of `source`
/// or off a character boundary. [`EditError::Conflict`] when the plan
/// carries the same edit twice, which means an anchor was planned twice.
pub fn apply(edits: &[Edit], source: &str) -> Result<String, EditError> {
    let mut seen: FxHashSet<&Edit> = FxHashSet::default();
    for edit in edits {
        if edit.offset > source.len() || !source.is_char_boundary(edit.offset) {
            return Err(EditError::OutOfBounds { offset: edit.offset });
        }
        if !seen.insert(edit) {
            return Err(EditError::Conflict { offset: edit.offset });
        }
    }

    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut patched = source.to_owned();
    for edit in ordered {
        patched.insert_str(edit.offset, &edit.text);
    }
    Ok(patched)
}
