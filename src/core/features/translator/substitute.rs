//! In-place line substitution.
//!
//! Two sequences advance under one matching rule: a cursor over text
//! positions below the selection's ancestor, and the original lines paired
//! by index with the translated ones. A position that contains the current
//! original line gets that line replaced and both sequences move on; any
//! other position is skipped and the same line is tried against the next.

use tracing::debug;

use crate::core::dom::{Document, NodeId};
use crate::core::matching::{leading_whitespace, split_lines, substitute_line};
use crate::shared::error::AppResult;

/// A byte offset inside a text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub node: NodeId,
    pub offset: usize,
}

/// Restartable walk over text positions strictly below `root`, in document
/// order, skipping text that is blank from the position onward.
///
/// The walk is recomputed from the tree on every step, so the document may
/// be edited between calls.
#[derive(Debug, Clone)]
pub struct TextCursor {
    root: NodeId,
    last: Option<NodeId>,
    resume: Option<TextPosition>,
}

impl TextCursor {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            last: None,
            resume: None,
        }
    }

    /// Continue inside `node` at `offset` on the next call
    pub fn resume_at(&mut self, node: NodeId, offset: usize) {
        self.resume = Some(TextPosition { node, offset });
    }

    pub fn next_position(&mut self, doc: &Document) -> Option<TextPosition> {
        if let Some(position) = self.resume.take() {
            let rest = doc
                .text(position.node)
                .and_then(|text| text.get(position.offset..))
                .unwrap_or_default();
            if !rest.trim().is_empty() {
                return Some(position);
            }
        }

        let mut node = self.successor(doc, self.last);
        while let Some(current) = node {
            self.last = Some(current);
            if let Some(text) = doc.text(current) {
                if !text.trim().is_empty() {
                    return Some(TextPosition {
                        node: current,
                        offset: 0,
                    });
                }
            }
            node = self.successor(doc, Some(current));
        }
        None
    }

    /// Pre-order successor of `from` inside the root's subtree
    fn successor(&self, doc: &Document, from: Option<NodeId>) -> Option<NodeId> {
        let Some(mut node) = from else {
            return doc.children(self.root).first().copied();
        };
        if let Some(first) = doc.children(node).first() {
            return Some(*first);
        }
        while node != self.root {
            let parent = doc.parent(node)?;
            let index = doc.child_index(node)?;
            if let Some(next) = doc.children(parent).get(index + 1) {
                return Some(*next);
            }
            node = parent;
        }
        None
    }
}

/// Replace original lines with translated ones inside the text nodes below
/// `root`. Returns how many lines were substituted.
pub fn substitute_lines(
    doc: &mut Document,
    root: NodeId,
    original: &str,
    translated: &str,
) -> AppResult<usize> {
    let translated_lines = split_lines(translated);
    let mut lines = split_lines(original)
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .peekable();

    let mut cursor = TextCursor::new(root);
    let mut matched = 0;

    while let Some(&(index, line)) = lines.peek() {
        let Some(translated_line) = translated_lines.get(index) else {
            break;
        };
        let Some(position) = cursor.next_position(doc) else {
            break;
        };
        let Some(resume) = replace_in_node(doc, position, line, translated_line)? else {
            continue;
        };
        debug!(line = index, node = ?position.node, "substituted line in place");
        cursor.resume_at(position.node, resume);
        lines.next();
        matched += 1;
    }

    Ok(matched)
}

/// Replace the first occurrence of `line` at or after `position`. Returns
/// the byte offset just past the inserted text, or `None` without a match.
fn replace_in_node(
    doc: &mut Document,
    position: TextPosition,
    line: &str,
    translated_line: &str,
) -> AppResult<Option<usize>> {
    let Some(text) = doc.text(position.node) else {
        return Ok(None);
    };
    let needle = line.trim();
    let Some(found) = text
        .get(position.offset..)
        .and_then(|rest| rest.find(needle))
        .map(|i| position.offset + i)
    else {
        return Ok(None);
    };

    let indent = leading_whitespace(line);
    let mut replacement = substitute_line(line, translated_line);
    let start = if !indent.is_empty()
        && found >= position.offset + indent.len()
        && text[..found].ends_with(indent)
    {
        found - indent.len()
    } else {
        // the page does not carry the indentation here, so neither do we
        replacement = replacement
            .strip_prefix(indent)
            .unwrap_or(&replacement)
            .to_string();
        found
    };

    let updated = format!(
        "{}{}{}",
        &text[..start],
        replacement,
        &text[found + needle.len()..]
    );
    let resume = start + replacement.len();
    doc.set_text(position.node, updated)?;
    Ok(Some(resume))
}
