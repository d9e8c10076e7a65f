use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::debug;

use super::dom::NodeId;
use crate::config::MAX_HISTORY_ENTRIES;

/// One applied translation that can be undone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Mirrored on the element as `data-translation-id`
    pub id: String,
    /// Element holding the translated text (owned by the document)
    pub element: NodeId,
    pub original_text: String,
    pub translated_text: String,
    pub target_lang: String,
    pub created_at: DateTime<Utc>,
}

/// Undo stack of whole-range translations, newest on top
#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    sequence: u64,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            sequence: 0,
        }
    }

    /// Fresh translation id, `tr-<unix millis>-<sequence>`
    pub fn next_id(&mut self) -> String {
        self.sequence += 1;
        format!("tr-{}-{}", Utc::now().timestamp_millis(), self.sequence)
    }

    /// Push a new entry. Past capacity the oldest entry is dropped; its
    /// element stays in the page, reachable only through its marker.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            if let Some(dropped) = self.entries.pop_front() {
                debug!(id = %dropped.id, "history full, dropped oldest entry");
            }
        }
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        self.entries.remove(index)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Ids from oldest to newest
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
