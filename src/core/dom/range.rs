//! Ranges and the live selection.
//!
//! Offsets count child indices when the container is an element or fragment,
//! and characters (Unicode scalar values) when it is a text node.

use std::collections::HashMap;

use super::{char_to_byte, Document, NodeId};
use crate::shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: BoundaryPoint,
    end: BoundaryPoint,
}

/// Pre-order index and index of the last descendant, per node of one tree
struct TreeOrder {
    index: HashMap<NodeId, (usize, usize)>,
}

impl TreeOrder {
    fn build(doc: &Document, root: NodeId) -> Self {
        let mut index = HashMap::new();
        let mut counter = 0;
        Self::visit(doc, root, &mut counter, &mut index);
        Self { index }
    }

    fn visit(
        doc: &Document,
        node: NodeId,
        counter: &mut usize,
        index: &mut HashMap<NodeId, (usize, usize)>,
    ) {
        let pre = *counter;
        *counter += 1;
        for child in doc.children(node) {
            Self::visit(doc, *child, counter, index);
        }
        index.insert(node, (pre, *counter - 1));
    }

    fn span(&self, node: NodeId) -> (usize, usize) {
        self.index.get(&node).copied().unwrap_or((0, 0))
    }

    /// Sort key of the position just before `node`
    fn before(&self, node: NodeId) -> (usize, usize) {
        (2 * self.span(node).0, 0)
    }

    /// Sort key of the position just after `node` and its subtree
    fn after(&self, node: NodeId) -> (usize, usize) {
        (2 * (self.span(node).1 + 1), 0)
    }

    fn point(&self, doc: &Document, point: BoundaryPoint) -> (usize, usize) {
        if doc.is_text(point.node) {
            return (2 * self.span(point.node).0 + 1, point.offset);
        }
        match doc.children(point.node).get(point.offset) {
            Some(child) => self.before(*child),
            None => self.after(point.node),
        }
    }
}

impl Range {
    /// Range between two points of the same tree, start not after end
    pub fn new(doc: &Document, start: BoundaryPoint, end: BoundaryPoint) -> AppResult<Self> {
        for point in [start, end] {
            doc.ensure_node(point.node)?;
            if point.offset > doc.node_length(point.node) {
                return Err(AppError::Dom(format!(
                    "offset {} exceeds node length {}",
                    point.offset,
                    doc.node_length(point.node)
                )));
            }
        }
        let root = doc.tree_root(start.node);
        if doc.tree_root(end.node) != root {
            return Err(AppError::Dom("range boundaries belong to different trees".to_string()));
        }
        let order = TreeOrder::build(doc, root);
        if order.point(doc, start) > order.point(doc, end) {
            return Err(AppError::Dom("range start is after its end".to_string()));
        }
        Ok(Self { start, end })
    }

    pub fn collapsed_at(point: BoundaryPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn select_node_contents(doc: &Document, node: NodeId) -> Self {
        Self {
            start: BoundaryPoint::new(node, 0),
            end: BoundaryPoint::new(node, doc.node_length(node)),
        }
    }

    /// Range around `node` itself, from its parent's point of view
    pub fn select_node(doc: &Document, node: NodeId) -> AppResult<Self> {
        let parent = doc
            .parent(node)
            .ok_or_else(|| AppError::Dom("cannot select a node without a parent".to_string()))?;
        let index = doc.child_index(node).unwrap_or(0);
        Ok(Self {
            start: BoundaryPoint::new(parent, index),
            end: BoundaryPoint::new(parent, index + 1),
        })
    }

    pub fn start(&self) -> BoundaryPoint {
        self.start
    }

    pub fn end(&self) -> BoundaryPoint {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Offsets still fit their containers (mutations may have shortened them)
    pub fn is_valid(&self, doc: &Document) -> bool {
        self.start.offset <= doc.node_length(self.start.node)
            && self.end.offset <= doc.node_length(self.end.node)
    }

    fn check(&self, doc: &Document) -> AppResult<()> {
        if self.is_valid(doc) {
            Ok(())
        } else {
            Err(AppError::Dom("range offsets no longer fit their containers".to_string()))
        }
    }

    /// Deepest node containing both boundary points
    pub fn common_ancestor_container(&self, doc: &Document) -> NodeId {
        let mut candidate = self.start.node;
        loop {
            if doc.is_inclusive_ancestor(candidate, self.end.node) {
                return candidate;
            }
            match doc.parent(candidate) {
                Some(parent) => candidate = parent,
                None => return candidate,
            }
        }
    }

    fn is_contained(&self, doc: &Document, order: &TreeOrder, node: NodeId) -> bool {
        order.before(node) >= order.point(doc, self.start)
            && order.after(node) <= order.point(doc, self.end)
    }

    fn is_partially_contained(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_inclusive_ancestor(node, self.start.node)
            != doc.is_inclusive_ancestor(node, self.end.node)
    }

    fn order(&self, doc: &Document) -> TreeOrder {
        TreeOrder::build(doc, doc.tree_root(self.start.node))
    }

    /// Selected text, as `Range.toString()` reports it
    pub fn to_string(&self, doc: &Document) -> AppResult<String> {
        self.check(doc)?;
        if self.start.node == self.end.node {
            if let Some(text) = doc.text(self.start.node) {
                return Ok(slice(text, self.start.offset, Some(self.end.offset)).to_string());
            }
        }

        let order = self.order(doc);
        let ancestor = self.common_ancestor_container(doc);
        let mut out = String::new();
        if let Some(text) = doc.text(self.start.node) {
            out.push_str(slice(text, self.start.offset, None));
        }
        for node in doc.text_nodes_under(ancestor) {
            if node == self.start.node || node == self.end.node {
                continue;
            }
            if self.is_contained(doc, &order, node) {
                out.push_str(doc.text(node).unwrap_or_default());
            }
        }
        if let Some(text) = doc.text(self.end.node) {
            out.push_str(slice(text, 0, Some(self.end.offset)));
        }
        Ok(out)
    }

    /// Detached fragment copying the selected content. Partially selected
    /// elements are cloned without their unselected children; partially
    /// selected text is sliced.
    pub fn clone_contents(&self, doc: &mut Document) -> AppResult<NodeId> {
        self.check(doc)?;
        let fragment = doc.create_fragment();
        if self.start.node == self.end.node {
            if let Some(text) = doc.text(self.start.node) {
                let piece = slice(text, self.start.offset, Some(self.end.offset)).to_string();
                let copy = doc.create_text(piece);
                doc.append_child(fragment, copy)?;
                return Ok(fragment);
            }
        }
        let order = self.order(doc);
        let ancestor = self.common_ancestor_container(doc);
        self.clone_children_into(doc, &order, ancestor, fragment)?;
        Ok(fragment)
    }

    fn clone_children_into(
        &self,
        doc: &mut Document,
        order: &TreeOrder,
        node: NodeId,
        target: NodeId,
    ) -> AppResult<()> {
        for child in doc.children(node).to_vec() {
            if self.is_contained(doc, order, child) {
                let copy = doc.deep_clone(child);
                doc.append_child(target, copy)?;
            } else if self.is_partially_contained(doc, child) {
                if let Some(text) = doc.text(child) {
                    let piece = if child == self.start.node {
                        slice(text, self.start.offset, None).to_string()
                    } else {
                        slice(text, 0, Some(self.end.offset)).to_string()
                    };
                    let copy = doc.create_text(piece);
                    doc.append_child(target, copy)?;
                } else {
                    let shell = doc.shallow_clone(child);
                    doc.append_child(target, shell)?;
                    self.clone_children_into(doc, order, child, shell)?;
                }
            }
        }
        Ok(())
    }

    /// Remove the selected content and collapse to the start point
    pub fn delete_contents(&mut self, doc: &mut Document) -> AppResult<()> {
        self.check(doc)?;
        if self.is_collapsed() {
            return Ok(());
        }
        if self.start.node == self.end.node {
            if let Some(text) = doc.text(self.start.node) {
                let from = char_to_byte(text, self.start.offset);
                let to = char_to_byte(text, self.end.offset);
                let remaining = format!("{}{}", &text[..from], &text[to..]);
                doc.set_text(self.start.node, remaining)?;
                self.end = self.start;
                return Ok(());
            }
        }

        let order = self.order(doc);
        let ancestor = self.common_ancestor_container(doc);
        let doomed: Vec<NodeId> = doc
            .descendants(ancestor)
            .filter(|node| self.is_contained(doc, &order, *node))
            .filter(|node| {
                doc.parent(*node)
                    .map_or(true, |parent| !self.is_contained(doc, &order, parent))
            })
            .collect();
        for node in doomed {
            doc.remove(node);
        }

        if let Some(text) = doc.text(self.start.node) {
            let head = slice(text, 0, Some(self.start.offset)).to_string();
            doc.set_text(self.start.node, head)?;
        }
        if let Some(text) = doc.text(self.end.node) {
            let tail = slice(text, self.end.offset, None).to_string();
            doc.set_text(self.end.node, tail)?;
        }
        self.end = self.start;
        Ok(())
    }

    /// Insert `node` at the start point. A text container is split around
    /// the insertion point; a fragment contributes its children.
    pub fn insert_node(&self, doc: &mut Document, node: NodeId) -> AppResult<()> {
        self.check(doc)?;
        let start = self.start;
        if let Some(text) = doc.text(start.node) {
            let parent = doc
                .parent(start.node)
                .ok_or_else(|| AppError::Dom("cannot insert into a detached text node".to_string()))?;
            let length = text.chars().count();
            if start.offset == 0 {
                return doc.insert_before(parent, node, Some(start.node));
            }
            if start.offset >= length {
                let next = doc
                    .child_index(start.node)
                    .and_then(|i| doc.children(parent).get(i + 1).copied());
                return doc.insert_before(parent, node, next);
            }
            let head = slice(text, 0, Some(start.offset)).to_string();
            let tail = slice(text, start.offset, None).to_string();
            doc.set_text(start.node, head)?;
            let tail_node = doc.create_text(tail);
            let next = doc
                .child_index(start.node)
                .and_then(|i| doc.children(parent).get(i + 1).copied());
            doc.insert_before(parent, tail_node, next)?;
            return doc.insert_before(parent, node, Some(tail_node));
        }

        let reference = doc.children(start.node).get(start.offset).copied();
        doc.insert_before(start.node, node, reference)
    }
}

fn slice(text: &str, from: usize, to: Option<usize>) -> &str {
    let start = char_to_byte(text, from);
    let end = to.map_or(text.len(), |to| char_to_byte(text, to));
    if start >= end {
        ""
    } else {
        &text[start..end]
    }
}

/// The user's selection on the page: zero or one range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    range: Option<Range>,
}

impl Selection {
    pub fn range_count(&self) -> usize {
        usize::from(self.range.is_some())
    }

    pub fn range_at(&self, index: usize) -> Option<Range> {
        if index == 0 {
            self.range
        } else {
            None
        }
    }

    pub fn add_range(&mut self, range: Range) {
        self.range = Some(range);
    }

    pub fn remove_all_ranges(&mut self) {
        self.range = None;
    }

    /// Text covered by the selection, empty when nothing is selected
    pub fn text(&self, doc: &Document) -> AppResult<String> {
        match self.range {
            Some(range) => range.to_string(doc),
            None => Ok(String::new()),
        }
    }
}
