use nn_apply_api::schemas::{ProjectInfoSchema, TaskField};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gallery::Gallery;

pub const DEFAULT_SETTINGS: &str = "# Inference settings of the connected model (YAML)\n";
pub const DEFAULT_SUFFIX: &str = "model";

/// How a prediction is combined with the image's existing annotation.
///
/// Only the literal `merge` merges; every other value, `null` included, replaces.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "Option<String>", into = "String")]
pub enum AddMode {
    #[default]
    Merge,
    Replace,
}

impl From<Option<String>> for AddMode {
    fn from(value: Option<String>) -> Self {
        value.map_or(AddMode::Replace, AddMode::from)
    }
}

impl From<String> for AddMode {
    fn from(value: String) -> Self {
        AddMode::from(value.as_str())
    }
}

impl From<&str> for AddMode {
    fn from(value: &str) -> Self {
        match value {
            "merge" => AddMode::Merge,
            _ => AddMode::Replace,
        }
    }
}

impl From<AddMode> for String {
    fn from(mode: AddMode) -> Self {
        match mode {
            AddMode::Merge => "merge".to_string(),
            AddMode::Replace => "replace".to_string(),
        }
    }
}

/// UI state fields read by the handlers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    /// YAML text; `None` when the UI sends `null`.
    pub settings: Option<String>,
    pub session_id: Option<u64>,
    pub add_mode: AddMode,
    /// One flag per model class, in model order. Empty selects every class.
    pub classes: Vec<bool>,
    /// One flag per model tag meta, in model order. Empty selects every tag.
    pub tags: Vec<bool>,
    pub suffix: String,
    pub processing: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            settings: Some(DEFAULT_SETTINGS.to_string()),
            session_id: None,
            add_mode: AddMode::Merge,
            classes: Vec::new(),
            tags: Vec::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
            processing: false,
        }
    }
}

/// Data fields reset on disconnect.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub connected: bool,
    pub connection_error: String,
    pub model_info: Value,
    pub model_meta: Value,
    pub rollback_ids: Vec<u64>,
    pub gallery: Option<Gallery>,
}

/// Data fields published once when the application starts.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartupData {
    #[serde(flatten)]
    pub session: SessionData,
    pub owner_id: u64,
    pub team_id: u64,
    pub empty_gallery: Gallery,
    pub project_id: u64,
    pub project_name: String,
    pub project_items_count: u64,
    pub project_preview_url: Option<String>,
}

impl StartupData {
    pub fn new(owner_id: u64, team_id: u64, project: &ProjectInfoSchema) -> Self {
        Self {
            session: SessionData::default(),
            owner_id,
            team_id,
            empty_gallery: Gallery::empty(),
            project_id: project.id,
            project_name: project.name.clone(),
            project_items_count: project.item_count(),
            project_preview_url: project.reference_image_url.clone(),
        }
    }
}

/// Field updates a handler wants pushed to the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiUpdate {
    fields: Vec<TaskField>,
}

impl UiUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, payload: Value) -> Self {
        self.fields.push(TaskField::new(field.to_string(), payload));
        self
    }

    pub fn append(mut self, field: &str, payload: Value) -> Self {
        self.fields
            .push(TaskField::new(field.to_string(), payload).appended());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| &f.payload)
    }

    pub fn fields(&self) -> &[TaskField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<TaskField> {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("merge"), AddMode::Merge)]
    #[case(json!("replace"), AddMode::Replace)]
    #[case(json!("Merge"), AddMode::Replace)]
    #[case(json!(""), AddMode::Replace)]
    #[case(Value::Null, AddMode::Replace)]
    fn add_mode_only_merges_on_exact_value(#[case] raw: Value, #[case] expected: AddMode) {
        let state: UiState = serde_json::from_value(json!({"addMode": raw})).unwrap();
        assert_eq!(state.add_mode, expected);
    }

    #[test]
    fn null_settings_are_kept_as_none() {
        let state: UiState =
            serde_json::from_value(json!({"settings": null, "sessionId": 3})).unwrap();

        assert_eq!(state.settings, None);
        assert_eq!(state.session_id, Some(3));
    }

    #[test]
    fn missing_state_fields_take_defaults() {
        let state: UiState = serde_json::from_value(json!({"sessionId": 42})).unwrap();

        assert_eq!(state.session_id, Some(42));
        assert_eq!(state.add_mode, AddMode::Merge);
        assert_eq!(state.suffix, DEFAULT_SUFFIX);
        assert_eq!(state.settings.as_deref(), Some(DEFAULT_SETTINGS));
        assert!(state.classes.is_empty());
    }

    #[test]
    fn default_state_serializes_with_ui_keys() {
        let value = serde_json::to_value(UiState::default()).unwrap();

        assert_eq!(value["addMode"], "merge");
        assert_eq!(value["sessionId"], Value::Null);
        assert_eq!(value["processing"], false);
    }

    #[test]
    fn startup_data_flattens_session_fields() {
        let project: ProjectInfoSchema =
            serde_json::from_value(json!({"id": 3, "name": "roads", "itemsCount": 20})).unwrap();

        let value = serde_json::to_value(StartupData::new(1, 2, &project)).unwrap();

        assert_eq!(value["connected"], false);
        assert_eq!(value["rollbackIds"], json!([]));
        assert_eq!(value["projectName"], "roads");
        assert_eq!(value["projectItemsCount"], 20);
        assert_eq!(value["emptyGallery"]["content"]["layout"], json!([]));
    }

    #[test]
    fn update_keeps_field_order_and_append_flags() {
        let update = UiUpdate::new()
            .append("data", json!({}))
            .set("state.processing", json!(false));

        let fields = update.fields();
        assert_eq!(fields[0].append, Some(true));
        assert_eq!(fields[1].append, None);
        assert_eq!(update.get("state.processing"), Some(&json!(false)));
    }
}
