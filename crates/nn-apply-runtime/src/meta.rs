use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An object class of a schema. Keys the platform sends beyond the ones modelled here are kept
/// so the schema survives a round trip unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ObjClass {
    pub title: String,
    pub shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ObjClass {
    pub fn new(title: impl Into<String>, shape: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            shape: shape.into(),
            color: None,
            extra: Map::new(),
        }
    }

    pub fn renamed(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TagMeta {
    pub name: String,
    pub value_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TagMeta {
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            color: None,
            extra: Map::new(),
        }
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Schema of a project: the object classes and tag metas its annotations may use.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ProjectMeta {
    #[serde(default)]
    pub classes: Vec<ObjClass>,
    #[serde(default)]
    pub tags: Vec<TagMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Classes and tags a remote model can output. Same shape as a project schema.
pub type ModelMeta = ProjectMeta;

impl ProjectMeta {
    pub fn new(classes: Vec<ObjClass>, tags: Vec<TagMeta>) -> Self {
        Self {
            classes,
            tags,
            extra: Map::new(),
        }
    }

    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn obj_class(&self, title: &str) -> Option<&ObjClass> {
        self.classes.iter().find(|class| class.title == title)
    }

    pub fn tag_meta(&self, name: &str) -> Option<&TagMeta> {
        self.tags.iter().find(|tag| tag.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let raw = json!({
            "classes": [{"title": "car", "shape": "rectangle", "color": "#FF0000", "id": 11, "hotkey": ""}],
            "tags": [{"name": "reviewed", "value_type": "none", "color": "#00FF00", "applicable_type": "all"}],
            "projectType": "images"
        });

        let meta = ProjectMeta::from_json(raw.clone()).unwrap();

        assert_eq!(meta.obj_class("car").map(|c| c.shape.as_str()), Some("rectangle"));
        assert!(meta.tag_meta("reviewed").is_some());
        assert_eq!(meta.to_json().unwrap(), raw);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let meta = ProjectMeta::from_json(json!({})).unwrap();
        assert!(meta.classes.is_empty());
        assert!(meta.tags.is_empty());
    }
}
