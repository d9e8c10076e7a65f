use serde::{Deserialize, Serialize};

/// Message sent by the trigger layer (context menu or keyboard shortcut)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Message {
    Translate {
        #[serde(
            rename = "targetLang",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        target_lang: Option<String>,
    },
    Revert,
}

impl Message {
    pub fn translate(target_lang: impl Into<String>) -> Self {
        Message::Translate {
            target_lang: Some(target_lang.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translate_with_lang() {
        let msg: Message = serde_json::from_str(r#"{"action":"translate","targetLang":"PT-BR"}"#).unwrap();
        assert_eq!(msg, Message::translate("PT-BR"));
    }

    #[test]
    fn test_parse_translate_without_lang() {
        let msg: Message = serde_json::from_str(r#"{"action":"translate"}"#).unwrap();
        assert_eq!(msg, Message::Translate { target_lang: None });

        let msg: Message = serde_json::from_str(r#"{"action":"translate","targetLang":null}"#).unwrap();
        assert_eq!(msg, Message::Translate { target_lang: None });
    }

    #[test]
    fn test_revert_round_trip() {
        let json = serde_json::to_string(&Message::Revert).unwrap();
        assert_eq!(json, r#"{"action":"revert"}"#);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(serde_json::from_str::<Message>(r#"{"action":"explode"}"#).is_err());
    }
}
