//! Translator configuration registry
//!
//! Centralized constants for the page session, the provider endpoints and the
//! trigger layer (menu entries and keyboard commands).

use std::time::Duration;

/// Maximum number of undoable translations kept per page
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// How long a notification stays on screen
pub const NOTIFICATION_DISMISS_AFTER: Duration = Duration::from_millis(3000);

/// Tag of the element created by whole-range replacement
pub const TRANSLATED_ELEMENT_TAG: &str = "span";

pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
pub const DEEPL_PRO_ENDPOINT: &str = "https://api.deepl.com/v2/translate";

/// Environment variable consulted when no API key is stored
pub const API_KEY_ENV: &str = "DEEPL_API_KEY";

pub const DEFAULT_SOURCE_LANG: &str = "PT";
pub const DEFAULT_TARGET_LANG: &str = "EN-US";

/// Sentinel meaning "let the provider detect the source language"
pub const AUTO_SOURCE_LANG: &str = "auto";

/// Context-menu id prefix for "translate to <LANG>" entries
pub const MENU_TRANSLATE_PREFIX: &str = "translate_";
pub const MENU_REVERT_ID: &str = "revert";

pub const SHORTCUT_TRANSLATE: &str = "translate-selection";
pub const SHORTCUT_REVERT: &str = "revert-translation";

/// A target language offered in the "Translate to" menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLanguage {
    pub code: &'static str,
    pub title: &'static str,
}

pub const MENU_LANGUAGES: &[MenuLanguage] = &[
    MenuLanguage { code: "EN-US", title: "English (American)" },
    MenuLanguage { code: "EN-GB", title: "English (British)" },
    MenuLanguage { code: "PT-BR", title: "Portuguese" },
    MenuLanguage { code: "ES", title: "Spanish" },
    MenuLanguage { code: "FR", title: "French" },
    MenuLanguage { code: "DE", title: "German" },
    MenuLanguage { code: "JA", title: "Japanese" },
];

/// Menu item id for a language entry, e.g. `translate_PT-BR`
pub fn menu_item_id(lang: &MenuLanguage) -> String {
    format!("{}{}", MENU_TRANSLATE_PREFIX, lang.code)
}

/// Look up a menu language by its code (case-insensitive)
pub fn menu_language(code: &str) -> Option<&'static MenuLanguage> {
    MENU_LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code))
}
