use serde::Serialize;
use thiserror::Error;

/// Every failure a translate or revert action can end in.
///
/// None of these escape the session entry points; they are turned into an
/// error notification there.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Select some text to translate.")]
    NoSelection,

    #[error("Select a valid text.")]
    EmptySelection,

    #[error("Cannot translate into the same language as the original text.")]
    SameLanguage,

    #[error("Settings Error: {0}")]
    SettingsMissing(String),

    #[error("Translation error: {0}")]
    Provider(String),

    #[error("No translated text found to revert.")]
    RevertNotFound,

    #[error("DOM Error: {0}")]
    Dom(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Settings Error: {0}")]
    Settings(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_passes_through() {
        let err = AppError::Provider("Quota exceeded".to_string());
        assert_eq!(err.to_string(), "Translation error: Quota exceeded");
    }

    #[test]
    fn test_serializes_tagged() {
        let json = serde_json::to_value(AppError::Dom("detached".to_string())).unwrap();
        assert_eq!(json["type"], "Dom");
        assert_eq!(json["message"], "detached");

        let json = serde_json::to_value(AppError::RevertNotFound).unwrap();
        assert_eq!(json["type"], "RevertNotFound");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(AppError::from(io), AppError::Io(msg) if msg == "gone"));
    }
}
