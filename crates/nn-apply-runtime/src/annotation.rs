use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::meta::ProjectMeta;

#[derive(thiserror::Error, Debug)]
pub enum AnnotationError {
    #[error("Malformed annotation: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Object class '{0}' is not defined in the schema")]
    UnknownClass(String),
    #[error("Tag '{0}' is not defined in the schema")]
    UnknownTag(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            extra: Map::new(),
        }
    }

    fn same_key(&self, other: &Tag) -> bool {
        self.name == other.name && self.value == other.value
    }
}

/// A labeled region. Geometry is carried as-is; only the class and tags are interpreted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Label {
    #[serde(rename = "classTitle")]
    pub class_title: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(flatten)]
    pub geometry: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

/// Labels and image-level tags attached to one image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Annotation {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size: ImageSize,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, rename = "objects")]
    pub labels: Vec<Label>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    /// Parse an annotation and check that every class and tag it uses exists in `meta`.
    pub fn from_json(value: Value, meta: &ProjectMeta) -> Result<Self, AnnotationError> {
        let annotation: Annotation = serde_json::from_value(value)?;
        annotation.validate(meta)?;
        Ok(annotation)
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn validate(&self, meta: &ProjectMeta) -> Result<(), AnnotationError> {
        for label in &self.labels {
            if meta.obj_class(&label.class_title).is_none() {
                return Err(AnnotationError::UnknownClass(label.class_title.clone()));
            }
        }

        let label_tags = self.labels.iter().flat_map(|label| label.tags.iter());
        for tag in self.tags.iter().chain(label_tags) {
            if meta.tag_meta(&tag.name).is_none() {
                return Err(AnnotationError::UnknownTag(tag.name.clone()));
            }
        }

        Ok(())
    }

    /// Labels of `self` followed by the labels of `other`. Image tags are unioned on
    /// (name, value).
    pub fn merge(&self, other: &Annotation) -> Annotation {
        let mut merged = self.clone();
        merged.labels.extend(other.labels.iter().cloned());

        for tag in &other.tags {
            if !merged.tags.iter().any(|existing| existing.same_key(tag)) {
                merged.tags.push(tag.clone());
            }
        }

        merged
    }

    /// Keep only the labels and tags present in the mappings, renamed to their mapped names.
    ///
    /// Platform ids (`id`, `classId`, `tagId`) refer to the source schema and are dropped.
    pub fn remap(
        self,
        classes: &HashMap<String, String>,
        tags: &HashMap<String, String>,
    ) -> Annotation {
        let remap_tags = |tag_list: Vec<Tag>| -> Vec<Tag> {
            tag_list
                .into_iter()
                .filter_map(|mut tag| {
                    let name = tags.get(&tag.name)?;
                    tag.name = name.clone();
                    tag.extra.remove("id");
                    tag.extra.remove("tagId");
                    Some(tag)
                })
                .collect()
        };

        let labels = self
            .labels
            .into_iter()
            .filter_map(|mut label| {
                let title = classes.get(&label.class_title)?;
                label.class_title = title.clone();
                label.geometry.remove("id");
                label.geometry.remove("classId");
                label.tags = remap_tags(std::mem::take(&mut label.tags));
                Some(label)
            })
            .collect();

        Annotation {
            labels,
            tags: remap_tags(self.tags),
            ..self
        }
    }
}
