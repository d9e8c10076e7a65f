//! Page model
//!
//! A small arena-backed document with the subset of DOM behaviour the
//! translator depends on: attributes, text nodes, detached clones, tree
//! mutation, and a live selection made of [`Range`]s.
//!
//! Nodes are never freed. A node removed from the tree simply loses its
//! parent; it is *connected* only while its ancestor chain reaches the
//! document root.

pub mod range;

pub use range::{BoundaryPoint, Range, Selection};

use crate::shared::error::{AppError, AppResult};

/// Handle to a node inside one [`Document`].
///
/// An id is only meaningful for the document that created it. The read
/// accessors index the arena directly and panic on a foreign id; the
/// fallible mutations reject one with [`AppError::Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Fragment,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    selection: Selection,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            selection: Selection::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// True when `id` was created by this document
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub(crate) fn ensure_node(&self, id: NodeId) -> AppResult<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(AppError::Dom(format!("node {} does not belong to this document", id.0)))
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Position of `id` among its parent's children
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Length in the DOM sense: characters for text, child count otherwise
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::Text(text) => text.chars().count(),
            _ => self.children(id).len(),
        }
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Topmost ancestor of `id` (the document root when connected)
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree_root(id) == self.root
    }

    /// Pre-order walk of everything below `id`, `id` itself excluded
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Text nodes strictly below `root`, in document order
    pub fn text_nodes_under(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(root).filter(|id| self.is_text(*id))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> AppResult<()> {
        self.ensure_node(id)?;
        match &mut self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => {
                if let Some(slot) = attrs.iter_mut().find(|(key, _)| key == name) {
                    slot.1 = value.to_string();
                } else {
                    attrs.push((name.to_string(), value.to_string()));
                }
                Ok(())
            }
            _ => Err(AppError::Dom(format!("cannot set attribute '{}' on a non-element", name))),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.nodes.get_mut(id.0)
        {
            attrs.retain(|(key, _)| key != name);
        }
    }

    /// Data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> AppResult<()> {
        self.ensure_node(id)?;
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(text) => {
                *text = value.into();
                Ok(())
            }
            _ => Err(AppError::Dom("cannot set data of a non-text node".to_string())),
        }
    }

    /// Concatenated data of every text node at or below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(text) => text.clone(),
            _ => self
                .text_nodes_under(id)
                .filter_map(|t| self.text(t))
                .collect(),
        }
    }

    /// First connected element whose attribute `name` equals `value`
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|id| self.attr(*id, name) == Some(value))
    }

    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        if let Some(parent) = node.parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> AppResult<()> {
        if matches!(self.kind(parent), NodeKind::Text(_)) {
            return Err(AppError::Dom("text nodes cannot have children".to_string()));
        }
        if matches!(self.kind(child), NodeKind::Document) {
            return Err(AppError::Dom("the document node cannot be inserted".to_string()));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(AppError::Dom("insertion would create a cycle".to_string()));
        }
        Ok(())
    }

    /// Insert `child` into `parent` before `reference` (append when `None`).
    ///
    /// A fragment's children are moved in its place, leaving it empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> AppResult<()> {
        self.ensure_node(parent)?;
        self.ensure_node(child)?;
        if let Some(reference) = reference {
            self.ensure_node(reference)?;
            if self.parent(reference) != Some(parent) {
                return Err(AppError::Dom("reference node is not a child of the parent".to_string()));
            }
            if reference == child {
                return Ok(());
            }
        }
        self.check_insertable(parent, child)?;

        let moving = if matches!(self.kind(child), NodeKind::Fragment) {
            std::mem::take(&mut self.nodes[child.0].children)
        } else {
            self.detach(child);
            vec![child]
        };

        let mut index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(self.children(parent).len()),
            None => self.children(parent).len(),
        };
        for node in moving {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(index, node);
            index += 1;
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> AppResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Put `replacement` where `target` is. Returns `false` when `target` has
    /// no parent, in which case nothing changes.
    pub fn replace_with(&mut self, target: NodeId, replacement: NodeId) -> AppResult<bool> {
        self.ensure_node(target)?;
        self.ensure_node(replacement)?;
        let Some(parent) = self.parent(target) else {
            return Ok(false);
        };
        if target == replacement {
            return Ok(true);
        }
        self.insert_before(parent, replacement, Some(target))?;
        self.detach(target);
        Ok(true)
    }

    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Detached deep copy of `id`
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = match self.kind(id) {
            NodeKind::Document => NodeKind::Fragment,
            other => other.clone(),
        };
        let copy = self.push(kind);
        for child in self.children(id).to_vec() {
            let child_copy = self.deep_clone(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    /// Detached copy of `id` without its children
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let kind = match self.kind(id) {
            NodeKind::Document => NodeKind::Fragment,
            other => other.clone(),
        };
        self.push(kind)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Replace the live selection with one covering the contents of `id`
    pub fn select_node_contents(&mut self, id: NodeId) {
        let range = Range::select_node_contents(self, id);
        self.selection.remove_all_ranges();
        self.selection.add_range(range);
    }

    /// Markup of `id` and its subtree; the document and fragments render
    /// only their children.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape(value, true));
                    out.push('"');
                }
                out.push('>');
                for child in self.children(id) {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeKind::Document | NodeKind::Fragment => {
                for child in self.children(id) {
                    self.write_html(*child, out);
                }
            }
        }
    }
}

fn escape(value: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Byte index of the `chars`-th character of `text`, clamped to its end
pub(crate) fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &mut Document, text: &str) -> (NodeId, NodeId) {
        let p = doc.create_element("p");
        let t = doc.create_text(text);
        doc.append_child(p, t).unwrap();
        doc.append_child(doc.root(), p).unwrap();
        (p, t)
    }

    #[test]
    fn test_build_and_serialize() {
        let mut doc = Document::new();
        let (p, _) = paragraph(&mut doc, "a < b");
        doc.set_attr(p, "data-original", "\"x\"").unwrap();
        assert_eq!(doc.to_html(doc.root()), "<p data-original=\"&quot;x&quot;\">a &lt; b</p>");
    }

    #[test]
    fn test_foreign_ids_are_rejected_by_mutations() {
        let mut big = Document::new();
        for text in ["one", "two"] {
            paragraph(&mut big, text);
        }
        let (_, foreign) = paragraph(&mut big, "three");
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "here");

        assert!(!doc.contains(foreign));
        assert!(doc.contains(t));
        assert!(matches!(doc.append_child(p, foreign), Err(AppError::Dom(_))));
        assert!(matches!(doc.append_child(foreign, t), Err(AppError::Dom(_))));
        assert!(matches!(doc.insert_before(p, t, Some(foreign)), Err(AppError::Dom(_))));
        assert!(matches!(doc.replace_with(foreign, t), Err(AppError::Dom(_))));
        assert!(matches!(doc.set_text(foreign, "x"), Err(AppError::Dom(_))));
        assert!(matches!(doc.set_attr(foreign, "data-original", "x"), Err(AppError::Dom(_))));
        assert!(matches!(
            Range::new(&doc, BoundaryPoint::new(foreign, 0), BoundaryPoint::new(t, 0)),
            Err(AppError::Dom(_))
        ));
        // silent no-ops
        doc.remove(foreign);
        doc.remove_attr(foreign, "data-original");
        assert_eq!(doc.to_html(p), "<p>here</p>");
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div).unwrap();
        let a = doc.create_text("a");
        let b = doc.create_element("b");
        let b_text = doc.create_text("b");
        let c = doc.create_text("c");
        doc.append_child(div, a).unwrap();
        doc.append_child(div, b).unwrap();
        doc.append_child(b, b_text).unwrap();
        doc.append_child(div, c).unwrap();

        let order: Vec<NodeId> = doc.descendants(doc.root()).collect();
        assert_eq!(order, vec![div, a, b, b_text, c]);
        let texts: Vec<NodeId> = doc.text_nodes_under(div).collect();
        assert_eq!(texts, vec![a, b_text, c]);
        assert_eq!(doc.text_content(div), "abc");
        // a text node has nothing strictly below it
        assert_eq!(doc.text_nodes_under(a).count(), 0);
    }

    #[test]
    fn test_replace_with_and_connectivity() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "Hello");
        let span = doc.create_element("span");

        assert!(doc.replace_with(t, span).unwrap());
        assert_eq!(doc.children(p), &[span]);
        assert!(!doc.is_connected(t));
        assert!(doc.is_connected(span));

        // detached targets are left alone
        let loose = doc.create_text("x");
        assert!(!doc.replace_with(t, loose).unwrap());
        assert_eq!(doc.parent(loose), None);
    }

    #[test]
    fn test_fragment_children_move_on_insert() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "tail");
        let frag = doc.create_fragment();
        let one = doc.create_text("one ");
        let two = doc.create_text("two ");
        doc.append_child(frag, one).unwrap();
        doc.append_child(frag, two).unwrap();

        doc.insert_before(p, frag, Some(t)).unwrap();
        assert_eq!(doc.children(p), &[one, two, t]);
        assert!(doc.children(frag).is_empty());
    }

    #[test]
    fn test_cycles_rejected() {
        let mut doc = Document::new();
        let (p, t) = paragraph(&mut doc, "x");
        assert!(doc.append_child(p, p).is_err());
        assert!(doc.append_child(t, p).is_err());
        assert!(doc.append_child(p, doc.root()).is_err());
    }

    #[test]
    fn test_deep_clone_is_detached() {
        let mut doc = Document::new();
        let (p, _) = paragraph(&mut doc, "copy me");
        doc.set_attr(p, "class", "x").unwrap();
        let copy = doc.deep_clone(p);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.to_html(copy), doc.to_html(p));
        assert_ne!(doc.children(copy), doc.children(p));
    }

    #[test]
    fn test_find_by_attr_ignores_detached() {
        let mut doc = Document::new();
        let (p, _) = paragraph(&mut doc, "x");
        doc.set_attr(p, "data-translation-id", "tr-1").unwrap();
        assert_eq!(doc.find_by_attr("data-translation-id", "tr-1"), Some(p));
        doc.remove(p);
        assert_eq!(doc.find_by_attr("data-translation-id", "tr-1"), None);
    }

    #[test]
    fn test_char_to_byte() {
        assert_eq!(char_to_byte("Olá!", 3), 4);
        assert_eq!(char_to_byte("Olá", 10), 4);
        assert_eq!(char_to_byte("", 0), 0);
    }
}
