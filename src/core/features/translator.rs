//! Translator feature
//!
//! Translates the live selection and writes the result back into the page,
//! line by line where the page text still matches the selection and as one
//! tagged element otherwise.

pub mod service;
pub mod substitute;
pub mod types;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config;
use crate::core::dom::{NodeId, Range};
use crate::core::history::HistoryEntry;
use crate::core::matching::{
    is_same_language_family, leading_whitespace, normalize_text, reindent, split_lines,
};
use crate::core::provenance::{
    closest_marker, find_original_text, OriginalContent, ORIGINAL_ATTR, TARGET_LANG_ATTR,
    TRANSLATION_ID_ATTR,
};
use crate::core::session::PageSession;
use crate::shared::error::{AppError, AppResult};

pub use service::{DeepLService, TranslationService};
pub use types::TranslationResponse;

pub const MSG_RESTORED: &str = "Text restored to original!";
pub const MSG_FROM_CACHE: &str = "Translation retrieved from cache!";
pub const MSG_APPLIED: &str = "Translation applied.";

/// Translate the current selection into `target_lang` (or the configured
/// target). Returns the success message to show.
pub async fn translate_selection(
    session: &mut PageSession,
    target_lang: Option<&str>,
) -> AppResult<String> {
    session.originals.prune(&session.document);

    let range = session
        .document
        .selection()
        .range_at(0)
        .ok_or(AppError::NoSelection)?;
    let raw_text = range.to_string(&session.document)?;
    if raw_text.trim().is_empty() {
        return Err(AppError::EmptySelection);
    }
    let container = range.common_ancestor_container(&session.document);

    // the original is kept verbatim; only the provider sees it normalised
    let source_text = resolve_source_text(session, container, &raw_text);

    let settings = session.settings.get().await?;
    let target = target_lang
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .or_else(|| Some(settings.target_lang.trim()).filter(|lang| !lang.is_empty()))
        .unwrap_or(config::DEFAULT_TARGET_LANG)
        .to_string();

    if is_same_language_family(Some(settings.source_lang.as_str()), Some(target.as_str())) {
        if let Some(record) = session.originals.get(container).cloned() {
            restore_original(session, range, &record)?;
            info!(target_lang = %target, "same language requested, original restored");
            return Ok(MSG_RESTORED.to_string());
        }
        // the snapshot still enables a later revert
        snapshot_original(session, container, range, &source_text)?;
        return Err(AppError::SameLanguage);
    }

    snapshot_original(session, container, range, &source_text)?;

    let response = session
        .translator
        .translate(&normalize_text(&source_text), &target)
        .await
        .map_err(|e| {
            warn!(error = %e, target_lang = %target, "translation request failed");
            e
        })?;

    let matched = substitute::substitute_lines(
        &mut session.document,
        container,
        &raw_text,
        &response.translated_text,
    )?;

    if matched > 0 {
        debug!(lines = matched, "translation applied in place");
        session.last_translated = Some(range);
    } else {
        replace_whole_range(
            session,
            range,
            &raw_text,
            &source_text,
            &target,
            &response.translated_text,
        )?;
    }

    session.document.selection_mut().remove_all_ranges();
    info!(
        target_lang = %target,
        from_cache = response.from_cache,
        in_place = matched > 0,
        "translation applied"
    );

    Ok(if response.from_cache {
        MSG_FROM_CACHE.to_string()
    } else {
        MSG_APPLIED.to_string()
    })
}

/// The stored original of the container, else the text from before the
/// outermost translation around it, else the live selection as selected.
fn resolve_source_text(session: &PageSession, container: NodeId, selected: &str) -> String {
    if let Some(record) = session.originals.get(container) {
        return record.text.clone();
    }
    closest_marker(&session.document, container)
        .and_then(|marker| find_original_text(&session.document, marker).original_text)
        .unwrap_or_else(|| selected.to_string())
}

fn snapshot_original(
    session: &mut PageSession,
    container: NodeId,
    range: Range,
    text: &str,
) -> AppResult<()> {
    if session.originals.contains(container) {
        return Ok(());
    }
    let node = range.clone_contents(&mut session.document)?;
    session.originals.insert_if_absent(
        container,
        OriginalContent {
            text: text.to_string(),
            node,
        },
    );
    debug!(?container, "recorded original content");
    Ok(())
}

fn restore_original(
    session: &mut PageSession,
    mut range: Range,
    record: &OriginalContent,
) -> AppResult<()> {
    let doc = &mut session.document;
    range.delete_contents(doc)?;
    let copy = doc.deep_clone(record.node);
    range.insert_node(doc, copy)?;
    doc.selection_mut().remove_all_ranges();
    Ok(())
}

/// Swap the whole selection for one marked element and remember it
fn replace_whole_range(
    session: &mut PageSession,
    mut range: Range,
    raw_text: &str,
    original_text: &str,
    target: &str,
    translated: &str,
) -> AppResult<()> {
    let indent = split_lines(raw_text)
        .into_iter()
        .find(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .unwrap_or_default()
        .to_string();

    let id = session.history.next_id();
    let doc = &mut session.document;
    let element = doc.create_element(config::TRANSLATED_ELEMENT_TAG);
    let content = doc.create_text(reindent(translated, &indent));
    doc.append_child(element, content)?;
    doc.set_attr(element, ORIGINAL_ATTR, original_text)?;
    doc.set_attr(element, TARGET_LANG_ATTR, target)?;
    doc.set_attr(element, TRANSLATION_ID_ATTR, &id)?;

    range.delete_contents(doc)?;
    range.insert_node(doc, element)?;

    debug!(%id, "inserted translated element");
    session.history.push(HistoryEntry {
        id,
        element,
        original_text: original_text.to_string(),
        translated_text: translated.to_string(),
        target_lang: target.to_string(),
        created_at: Utc::now(),
    });
    Ok(())
}
