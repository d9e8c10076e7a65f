use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Result of a provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_text: String,
    /// Served from the text+language cache instead of the network
    pub from_cache: bool,
}

impl TranslationResponse {
    pub fn fresh(translated_text: impl Into<String>) -> Self {
        Self {
            translated_text: translated_text.into(),
            from_cache: false,
        }
    }
}

pub type TranslatorResult<T> = Result<T, AppError>;

/// Body of a DeepL `/v2/translate` call
#[derive(Debug, Clone, Serialize)]
pub struct DeepLRequest<'a> {
    pub text: Vec<&'a str>,
    pub target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_lang: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeepLResponse {
    #[serde(default)]
    pub translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeepLTranslation {
    pub text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeepLErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_auto_source() {
        let body = DeepLRequest {
            text: vec!["Hello"],
            target_lang: "PT-BR",
            source_lang: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "text": ["Hello"], "target_lang": "PT-BR" }));
    }

    #[test]
    fn test_response_parses() {
        let raw = r#"{"translations":[{"detected_source_language":"EN","text":"Olá"}]}"#;
        let parsed: DeepLResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.translations[0].text, "Olá");
        assert_eq!(parsed.translations[0].detected_source_language.as_deref(), Some("EN"));
    }
}
