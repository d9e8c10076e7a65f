//! Provenance markers left in the page by translations, and the weak store of
//! original content per selection container.
//!
//! The markers are the durable record of "a translation exists here"; the
//! undo history only decides the order in which translations come back.

use std::collections::HashMap;
use tracing::debug;

use super::dom::{Document, NodeId};
use crate::shared::error::AppResult;

pub const ORIGINAL_ATTR: &str = "data-original";
pub const TARGET_LANG_ATTR: &str = "data-target-lang";
pub const TRANSLATION_ID_ATTR: &str = "data-translation-id";

pub fn is_marker(doc: &Document, node: NodeId) -> bool {
    doc.is_element(node) && doc.has_attr(node, ORIGINAL_ATTR)
}

/// Nearest marker at or above `node`
pub fn closest_marker(doc: &Document, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .find(|candidate| is_marker(doc, *candidate))
}

/// Nearest marked element around `node`.
///
/// Walks upward from `node`; at each level the node itself is checked, then
/// its descendants. The walk stops below the document root, so a marker
/// elsewhere on the page is never picked up from an unrelated node.
pub fn find_translated_element_from_node(doc: &Document, node: NodeId) -> Option<NodeId> {
    let root = doc.root();
    let mut current = Some(node);
    while let Some(candidate) = current {
        if candidate == root {
            break;
        }
        if is_marker(doc, candidate) {
            return Some(candidate);
        }
        if let Some(found) = doc
            .descendants(candidate)
            .find(|descendant| is_marker(doc, *descendant))
        {
            return Some(found);
        }
        current = doc.parent(candidate);
    }
    None
}

/// Swap `element` for a plain text node holding `original_text`. Returns
/// `false` without touching anything when the element is already detached.
pub fn revert_translated_element(
    doc: &mut Document,
    element: NodeId,
    original_text: &str,
) -> AppResult<bool> {
    if doc.parent(element).is_none() {
        debug!(?element, "translated element already detached");
        return Ok(false);
    }
    let text = doc.create_text(original_text);
    doc.replace_with(element, text)
}

/// One layer of a nested translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationLayer {
    pub text: String,
    pub lang: Option<String>,
    pub original: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalText {
    /// `data-original` of the outermost marker
    pub original_text: Option<String>,
    /// Outermost layer first
    pub translations: Vec<TranslationLayer>,
}

/// Follow nested markers outward from `element` back to the text that was
/// on the page before any translation.
pub fn find_original_text(doc: &Document, element: NodeId) -> OriginalText {
    let mut result = OriginalText::default();
    let mut current = Some(element).filter(|node| is_marker(doc, *node));

    while let Some(marker) = current {
        let original = doc.attr(marker, ORIGINAL_ATTR).unwrap_or_default().to_string();
        result.translations.insert(
            0,
            TranslationLayer {
                text: doc.text_content(marker),
                lang: doc.attr(marker, TARGET_LANG_ATTR).map(str::to_string),
                original: original.clone(),
            },
        );
        result.original_text = Some(original);
        current = doc.parent(marker).and_then(|parent| closest_marker(doc, parent));
    }

    result
}

/// What a container held before its first translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalContent {
    pub text: String,
    /// Detached clone of the selected content
    pub node: NodeId,
}

/// Original content per selection container. Entries go away with their
/// container: anything no longer attached to the page is dropped by
/// [`OriginalContentStore::prune`].
#[derive(Debug, Clone, Default)]
pub struct OriginalContentStore {
    entries: HashMap<NodeId, OriginalContent>,
}

impl OriginalContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, container: NodeId) -> Option<&OriginalContent> {
        self.entries.get(&container)
    }

    pub fn contains(&self, container: NodeId) -> bool {
        self.entries.contains_key(&container)
    }

    /// Record `content` unless the container already has a record
    pub fn insert_if_absent(&mut self, container: NodeId, content: OriginalContent) -> bool {
        if self.entries.contains_key(&container) {
            return false;
        }
        self.entries.insert(container, content);
        true
    }

    pub fn prune(&mut self, doc: &Document) {
        let before = self.entries.len();
        self.entries.retain(|container, _| doc.is_connected(*container));
        if self.entries.len() != before {
            debug!(dropped = before - self.entries.len(), "pruned original content records");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(doc: &mut Document, parent: NodeId, text: &str, original: &str, lang: &str) -> NodeId {
        let span = doc.create_element("span");
        let t = doc.create_text(text);
        doc.append_child(span, t).unwrap();
        doc.set_attr(span, ORIGINAL_ATTR, original).unwrap();
        doc.set_attr(span, TARGET_LANG_ATTR, lang).unwrap();
        doc.append_child(parent, span).unwrap();
        span
    }

    #[test]
    fn test_find_upward_from_text() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append_child(doc.root(), p).unwrap();
        let span = marked(&mut doc, p, "Olá", "Hello", "PT-BR");
        let inner = doc.children(span)[0];

        assert_eq!(find_translated_element_from_node(&doc, inner), Some(span));
        assert_eq!(find_translated_element_from_node(&doc, span), Some(span));
    }

    #[test]
    fn test_find_through_sibling_descendants() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.append_child(doc.root(), div).unwrap();
        let plain = doc.create_text("before ");
        doc.append_child(div, plain).unwrap();
        let span = marked(&mut doc, div, "Olá", "Hello", "PT-BR");

        // from the plain text, the parent's descendants are searched
        assert_eq!(find_translated_element_from_node(&doc, plain), Some(span));
    }

    #[test]
    fn test_find_stops_below_root() {
        let mut doc = Document::new();
        let p1 = doc.create_element("p");
        let p2 = doc.create_element("p");
        doc.append_child(doc.root(), p1).unwrap();
        doc.append_child(doc.root(), p2).unwrap();
        let lonely = doc.create_text("nothing here");
        doc.append_child(p1, lonely).unwrap();
        marked(&mut doc, p2, "Olá", "Hello", "PT-BR");

        assert_eq!(find_translated_element_from_node(&doc, lonely), None);
    }

    #[test]
    fn test_revert_element() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append_child(doc.root(), p).unwrap();
        let span = marked(&mut doc, p, "Olá", "Hello", "PT-BR");

        assert!(revert_translated_element(&mut doc, span, "Hello").unwrap());
        assert_eq!(doc.to_html(p), "<p>Hello</p>");
        // second call is a silent no-op
        assert!(!revert_translated_element(&mut doc, span, "Hello").unwrap());
        assert_eq!(doc.to_html(p), "<p>Hello</p>");
    }

    #[test]
    fn test_find_original_text_through_layers() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append_child(doc.root(), p).unwrap();
        let outer = marked(&mut doc, p, "", "Hello", "PT-BR");
        let inner = marked(&mut doc, outer, "Bonjour", "Olá", "FR");

        let found = find_original_text(&doc, inner);
        assert_eq!(found.original_text.as_deref(), Some("Hello"));
        assert_eq!(found.translations.len(), 2);
        assert_eq!(found.translations[0].original, "Hello");
        assert_eq!(found.translations[1].original, "Olá");
        assert_eq!(found.translations[1].lang.as_deref(), Some("FR"));

        assert_eq!(find_original_text(&doc, p), OriginalText::default());
    }

    #[test]
    fn test_store_keeps_first_record_and_prunes_detached() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.append_child(doc.root(), p).unwrap();
        let snapshot = doc.create_fragment();

        let mut store = OriginalContentStore::new();
        assert!(store.insert_if_absent(p, OriginalContent { text: "first".into(), node: snapshot }));
        assert!(!store.insert_if_absent(p, OriginalContent { text: "second".into(), node: snapshot }));
        assert_eq!(store.get(p).map(|r| r.text.as_str()), Some("first"));

        store.prune(&doc);
        assert!(store.contains(p));

        doc.remove(p);
        store.prune(&doc);
        assert!(store.is_empty());
    }
}
