//! Text helpers shared by translation and revert: normalisation, language
//! family checks and the line-level "key: value" handling.

use regex::Regex;
use std::sync::OnceLock;

static KEY_VALUE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn key_value_pattern() -> &'static Regex {
    KEY_VALUE_PATTERN.get_or_init(|| {
        Regex::new(r"^(\s*)([^\s:]+):(\s*)(.*)$").expect("Invalid key/value regex")
    })
}

/// Trim the text and collapse whitespace runs inside each line. Line breaks
/// survive so translated lines can be paired with original ones.
pub fn normalize_text(text: &str) -> String {
    text.trim()
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `source` equals the primary subtag of `target`, ignoring case
/// (`PT` vs `PT-BR`). False when either side is missing.
pub fn is_same_language_family(source: Option<&str>, target: Option<&str>) -> bool {
    let (Some(source), Some(target)) = (source, target) else {
        return false;
    };
    let source = source.trim();
    let primary = target.trim().split('-').next().unwrap_or_default();
    !source.is_empty() && source.eq_ignore_ascii_case(primary)
}

/// Split on newlines, dropping the `\r` of CRLF endings
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// A line shaped like `  key: value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValue<'a> {
    pub indent: &'a str,
    pub key: &'a str,
    pub separator: &'a str,
    pub value: &'a str,
}

pub fn key_value(line: &str) -> Option<KeyValue<'_>> {
    let caps = key_value_pattern().captures(line)?;
    Some(KeyValue {
        indent: caps.get(1)?.as_str(),
        key: caps.get(2)?.as_str(),
        separator: caps.get(3)?.as_str(),
        value: caps.get(4)?.as_str(),
    })
}

/// Replacement for `original` built from `translated`.
///
/// A `key: value` original keeps its key, colon and spacing and takes only
/// the value from the translation; any other line gets the translation with
/// the original indentation.
pub fn substitute_line(original: &str, translated: &str) -> String {
    let translated = translated.trim();
    match key_value(original) {
        Some(kv) => {
            let value = key_value(translated)
                .map(|t| t.value.trim())
                .unwrap_or(translated);
            format!("{}{}:{}{}", kv.indent, kv.key, kv.separator, value)
        }
        None => format!("{}{}", leading_whitespace(original), translated),
    }
}

/// Every line trimmed and prefixed with `indent`
pub fn reindent(text: &str, indent: &str) -> String {
    split_lines(text)
        .iter()
        .map(|line| format!("{}{}", indent, line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_lines() {
        assert_eq!(normalize_text("  Hello   big \t world  "), "Hello big world");
        assert_eq!(normalize_text("\n  a  b\n    c\n"), "a b\nc");
    }

    #[test]
    fn test_language_family() {
        assert!(is_same_language_family(Some("PT"), Some("PT-BR")));
        assert!(is_same_language_family(Some("en"), Some("EN-US")));
        assert!(is_same_language_family(Some("DE"), Some("de")));
        assert!(!is_same_language_family(Some("PT"), Some("EN-US")));
        assert!(!is_same_language_family(Some("auto"), Some("EN-US")));
        assert!(!is_same_language_family(None, Some("EN")));
        assert!(!is_same_language_family(Some("EN"), None));
        assert!(!is_same_language_family(Some(""), Some("")));
    }

    #[test]
    fn test_key_value_detection() {
        let kv = key_value("    name:  Alice Smith").unwrap();
        assert_eq!(kv.indent, "    ");
        assert_eq!(kv.key, "name");
        assert_eq!(kv.separator, "  ");
        assert_eq!(kv.value, "Alice Smith");

        assert!(key_value("full name: Alice").is_none());
        assert!(key_value("no colon here").is_none());
    }

    #[test]
    fn test_substitute_keeps_key() {
        assert_eq!(substitute_line("name: Alice", "Nome: Alice traduzido"), "name: Alice traduzido");
        assert_eq!(substitute_line("  title: Hi", "  Olá  "), "  title: Olá");
    }

    #[test]
    fn test_substitute_plain_line_reindents() {
        assert_eq!(substitute_line("    Good morning", "Bom dia "), "    Bom dia");
        assert_eq!(substitute_line("Good morning", "Bom dia"), "Bom dia");
    }

    #[test]
    fn test_reindent() {
        assert_eq!(reindent("one\n  two\r\nthree", "  "), "  one\n  two\n  three");
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("\t  x "), "\t  ");
        assert_eq!(leading_whitespace("x"), "");
        assert_eq!(leading_whitespace("   "), "   ");
    }
}
