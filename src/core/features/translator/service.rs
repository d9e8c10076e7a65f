use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::types::{
    DeepLErrorBody, DeepLRequest, DeepLResponse, TranslationResponse, TranslatorResult,
};
use crate::core::matching::normalize_text;
use crate::shared::error::AppError;
use crate::shared::settings::SettingsProvider;

/// The translation provider as seen by the page session
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> TranslatorResult<TranslationResponse>;
}

/// Cache key for a text+language pair
pub fn cache_key(text: &str, target_lang: &str) -> String {
    format!("{}|{}", normalize_text(text), target_lang)
}

/// DeepL REST client with an in-memory response cache
pub struct DeepLService {
    http: Client,
    settings: Arc<dyn SettingsProvider>,
    endpoint: Option<String>,
    cache: Mutex<HashMap<String, String>>,
}

impl DeepLService {
    pub fn new(settings: Arc<dyn SettingsProvider>) -> TranslatorResult<Self> {
        let http = Client::builder()
            .user_agent("page-translator/deepl")
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            http,
            settings,
            endpoint: None,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Send requests to `endpoint` instead of the plan's DeepL URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn cached(&self, key: &str) -> Option<String> {
        let cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("[Translator] cache mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };
        cache.get(key).cloned()
    }

    fn store(&self, key: String, translated: &str) {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(key, translated.to_string());
    }

    pub fn cache_len(&self) -> usize {
        match self.cache.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    async fn fetch_translation(&self, text: &str, target_lang: &str) -> TranslatorResult<String> {
        let settings = self.settings.get().await?;
        if !settings.has_api_key() {
            return Err(AppError::SettingsMissing("API key not configured".to_string()));
        }

        let target_code = if target_lang.trim().is_empty() {
            settings.target_lang.as_str()
        } else {
            target_lang
        };
        let body = DeepLRequest {
            text: vec![text],
            target_lang: target_code,
            source_lang: settings.explicit_source_lang(),
        };
        let endpoint = self
            .endpoint
            .as_deref()
            .unwrap_or_else(|| settings.api_type.endpoint());

        debug!(endpoint, target_code, "requesting translation");
        let response = self
            .http
            .post(endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("DeepL-Auth-Key {}", settings.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<DeepLErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| "API error".to_string());
            warn!(%status, %message, "translation API returned an error");
            return Err(AppError::Provider(message));
        }

        let parsed: DeepLResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse translation response: {}", e)))?;

        parsed
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .ok_or_else(|| AppError::Provider("missing translation text".to_string()))
    }
}

#[async_trait]
impl TranslationService for DeepLService {
    async fn translate(&self, text: &str, target_lang: &str) -> TranslatorResult<TranslationResponse> {
        let key = cache_key(text, target_lang);
        if let Some(hit) = self.cached(&key) {
            debug!(target_lang, "translation served from cache");
            return Ok(TranslationResponse {
                translated_text: hit,
                from_cache: true,
            });
        }

        let translated = self.fetch_translation(text, target_lang).await?;
        info!(target_lang, chars = translated.chars().count(), "translation received");
        self.store(key, &translated);
        Ok(TranslationResponse::fresh(translated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::settings::{StaticSettings, UserSettings};
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn settings(api_key: &str, source_lang: &str) -> Arc<dyn SettingsProvider> {
        Arc::new(StaticSettings(UserSettings {
            api_key: api_key.to_string(),
            source_lang: source_lang.to_string(),
            ..UserSettings::default()
        }))
    }

    #[test]
    fn test_cache_key_normalizes_text() {
        assert_eq!(cache_key("  Hello   world ", "DE"), "Hello world|DE");
    }

    #[tokio::test]
    async fn test_translate_success_then_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v2/translate"))
            .and(matchers::header("Authorization", "DeepL-Auth-Key test-key"))
            .and(matchers::body_json(serde_json::json!({
                "text": ["Hello"],
                "target_lang": "PT-BR",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "translations": [{ "detected_source_language": "EN", "text": "Olá" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let service = DeepLService::new(settings("test-key", "auto"))
            .unwrap()
            .with_endpoint(format!("{}/v2/translate", mock_server.uri()));

        let first = service.translate("Hello", "PT-BR").await.unwrap();
        assert_eq!(first, TranslationResponse::fresh("Olá"));

        let second = service.translate(" Hello ", "PT-BR").await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.translated_text, "Olá");
        assert_eq!(service.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_sends_explicit_source_lang() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::body_json(serde_json::json!({
                "text": ["Hello"],
                "target_lang": "DE",
                "source_lang": "EN",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "translations": [{ "text": "Hallo" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let service = DeepLService::new(settings("k", "EN"))
            .unwrap()
            .with_endpoint(mock_server.uri());

        let response = service.translate("Hello", "DE").await.unwrap();
        assert_eq!(response.translated_text, "Hallo");
    }

    #[tokio::test]
    async fn test_provider_error_message_passes_through() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(456)
                    .set_body_json(serde_json::json!({ "message": "Quota exceeded" })),
            )
            .mount(&mock_server)
            .await;

        let service = DeepLService::new(settings("k", "auto"))
            .unwrap()
            .with_endpoint(mock_server.uri());

        let err = service.translate("Hello", "DE").await.unwrap_err();
        assert_eq!(err, AppError::Provider("Quota exceeded".to_string()));
        assert_eq!(service.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_without_body_uses_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let service = DeepLService::new(settings("k", "auto"))
            .unwrap()
            .with_endpoint(mock_server.uri());

        let err = service.translate("Hello", "DE").await.unwrap_err();
        assert_eq!(err, AppError::Provider("API error".to_string()));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let service = DeepLService::new(settings("", "auto"))
            .unwrap()
            .with_endpoint("http://127.0.0.1:9");

        let err = service.translate("Hello", "DE").await.unwrap_err();
        assert!(matches!(err, AppError::SettingsMissing(_)));
    }
}
