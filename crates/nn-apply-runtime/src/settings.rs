use derive_more::Deref;
use serde_json::{Map, Value};

/// Free-form inference settings forwarded to the model with each prediction request.
///
/// The text comes from the UI and is parsed as YAML on every call. Missing text or text that
/// fails to parse degrades to an empty mapping and records the reason in `fallback_reason`.
#[derive(Debug, Clone, PartialEq, Deref)]
pub struct InferenceSettings {
    #[deref]
    value: Value,
    fallback_reason: Option<String>,
}

impl InferenceSettings {
    pub fn empty() -> Self {
        Self {
            value: Value::Object(Map::new()),
            fallback_reason: None,
        }
    }

    /// Settings from the UI state, where `None` stands for a `null` settings field.
    pub fn from_state(text: Option<&str>) -> Self {
        match text {
            Some(text) => Self::parse(text),
            None => Self::fallback("settings are null".to_string()),
        }
    }

    pub fn parse(text: &str) -> Self {
        if is_blank_document(text) {
            return Self::empty();
        }

        match serde_yaml::from_str::<Value>(text) {
            Ok(Value::Null) => Self::empty(),
            Ok(value) => Self {
                value,
                fallback_reason: None,
            },
            Err(e) => Self::fallback(e.to_string()),
        }
    }

    fn fallback(reason: String) -> Self {
        Self {
            fallback_reason: Some(reason),
            ..Self::empty()
        }
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }
}

fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn parses_nested_yaml() {
        let settings = InferenceSettings::parse("conf_thres: 0.25\nclasses:\n  - car\n  - person\n");

        assert_eq!(settings.fallback_reason(), None);
        assert_eq!(
            *settings,
            json!({"conf_thres": 0.25, "classes": ["car", "person"]})
        );
    }

    #[rstest]
    #[case("")]
    #[case("# only a comment\n")]
    fn empty_documents_are_empty_settings(#[case] text: &str) {
        let settings = InferenceSettings::parse(text);
        assert_eq!(settings.fallback_reason(), None);
        assert_eq!(settings, InferenceSettings::empty());
    }

    #[rstest]
    #[case("conf_thres: [0.25")]
    #[case("a: b: c")]
    #[case("key: 'unterminated")]
    fn malformed_yaml_falls_back_to_empty(#[case] text: &str) {
        let settings = InferenceSettings::parse(text);

        assert!(settings.fallback_reason().is_some());
        assert_eq!(*settings, json!({}));
    }

    #[test]
    fn null_settings_fall_back_to_empty() {
        let settings = InferenceSettings::from_state(None);

        assert_eq!(settings.fallback_reason(), Some("settings are null"));
        assert_eq!(*settings, json!({}));
    }

    #[test]
    fn state_text_is_parsed() {
        let settings = InferenceSettings::from_state(Some("iou_thres: 0.5"));

        assert_eq!(settings.fallback_reason(), None);
        assert_eq!(*settings, json!({"iou_thres": 0.5}));
    }
}
