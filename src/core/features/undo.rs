//! Revert the most recent translation.
//!
//! The history decides which translation goes first. When its element is
//! gone (or the history is empty) the page markers around the selection and
//! around the last in-place translation are searched instead.

use tracing::{debug, info};

use crate::core::dom::NodeId;
use crate::core::provenance::{
    find_translated_element_from_node, revert_translated_element, ORIGINAL_ATTR,
    TRANSLATION_ID_ATTR,
};
use crate::core::session::PageSession;
use crate::shared::error::{AppError, AppResult};

use super::translator::MSG_RESTORED;

pub fn revert(session: &mut PageSession) -> AppResult<String> {
    if let Some(entry) = session.history.pop() {
        if let Some(element) = session.document.find_by_attr(TRANSLATION_ID_ATTR, &entry.id) {
            if revert_translated_element(&mut session.document, element, &entry.original_text)? {
                let remaining = session.history.len();
                info!(id = %entry.id, remaining, "translation reverted");
                return Ok(format!(
                    "Translation reverted! ({} remaining in history)",
                    remaining
                ));
            }
        }
        debug!(id = %entry.id, "history entry no longer in the page, searching markers");
    }

    if let Some(range) = session.document.selection().range_at(0) {
        let from = range.common_ancestor_container(&session.document);
        if revert_marker_near(session, from)? {
            session.document.selection_mut().remove_all_ranges();
            return Ok(MSG_RESTORED.to_string());
        }
    }

    if let Some(range) = session.last_translated {
        let from = range.common_ancestor_container(&session.document);
        if revert_marker_near(session, from)? {
            session.last_translated = None;
            session.document.selection_mut().remove_all_ranges();
            return Ok(MSG_RESTORED.to_string());
        }
    }

    Err(AppError::RevertNotFound)
}

/// Revert the marked element nearest to `node`, dropping its history entry
fn revert_marker_near(session: &mut PageSession, node: NodeId) -> AppResult<bool> {
    let Some(element) = find_translated_element_from_node(&session.document, node) else {
        return Ok(false);
    };
    let original = session
        .document
        .attr(element, ORIGINAL_ATTR)
        .unwrap_or_default()
        .to_string();
    let id = session
        .document
        .attr(element, TRANSLATION_ID_ATTR)
        .map(str::to_string);

    if !revert_translated_element(&mut session.document, element, &original)? {
        return Ok(false);
    }
    if let Some(id) = id {
        session.history.remove_by_id(&id);
    }
    info!(?element, "translation reverted from page marker");
    Ok(true)
}
