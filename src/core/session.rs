//! Per-page state shared by translate and revert.

use std::sync::Arc;
use tracing::{debug, warn};

use super::dom::{Document, Range};
use super::features::{translator, undo};
use super::history::UndoHistory;
use super::provenance::OriginalContentStore;
use crate::core::features::translator::TranslationService;
use crate::shared::emit::{Notifier, TracingNotifier};
use crate::shared::error::AppResult;
use crate::shared::events::Notification;
use crate::shared::settings::SettingsProvider;

/// Everything one page knows about its translations. Dropping the session
/// is the equivalent of navigating away: history and records are gone, the
/// markers stay in whatever document outlives it.
pub struct PageSession {
    pub(crate) document: Document,
    pub(crate) history: UndoHistory,
    pub(crate) originals: OriginalContentStore,
    /// Range of the last in-place translation, used when reverting without
    /// a history entry
    pub(crate) last_translated: Option<Range>,
    pub(crate) translator: Arc<dyn TranslationService>,
    pub(crate) settings: Arc<dyn SettingsProvider>,
    notifier: Arc<dyn Notifier>,
}

impl PageSession {
    pub fn new(
        document: Document,
        translator: Arc<dyn TranslationService>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            document,
            history: UndoHistory::new(),
            originals: OriginalContentStore::new(),
            last_translated: None,
            translator,
            settings,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn originals(&self) -> &OriginalContentStore {
        &self.originals
    }

    pub fn last_translated(&self) -> Option<Range> {
        self.last_translated
    }

    /// Forget history, records and the last range. The page keeps its
    /// markers, so earlier translations remain revertible by proximity.
    pub fn reset(&mut self) {
        self.history.clear();
        self.originals.clear();
        self.last_translated = None;
        debug!("page session reset");
    }

    /// Translate the current selection. Failures never escape; they come
    /// back (and are shown) as an error notification.
    pub async fn translate(&mut self, target_lang: Option<&str>) -> Notification {
        let result = translator::translate_selection(self, target_lang).await;
        self.finish(result)
    }

    pub fn revert(&mut self) -> Notification {
        let result = undo::revert(self);
        self.finish(result)
    }

    fn finish(&self, result: AppResult<String>) -> Notification {
        let notification = match result {
            Ok(message) => Notification::success(message),
            Err(e) => {
                warn!(error = %e, "page action failed");
                Notification::from(&e)
            }
        };
        self.notifier.notify(&notification);
        notification
    }
}
