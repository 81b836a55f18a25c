//! Payload of the side-by-side image grid widget.
//!
//! The widget reads these keys verbatim, so names and the fixed option values must not change.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::annotation::{Annotation, Label};
use crate::meta::ProjectMeta;

pub const ORIGINAL_PANE: &str = "original";
pub const PREDICTION_PANE: &str = "prediction";

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub opacity: f64,
    pub fill_rectangle: bool,
    pub enable_zoom: bool,
    pub sync_views: bool,
    pub show_preview: bool,
    pub selectable: bool,
}

pub const IMAGE_GRID_OPTIONS: GridOptions = GridOptions {
    opacity: 0.5,
    fill_rectangle: false,
    enable_zoom: true,
    sync_views: true,
    show_preview: true,
    selectable: false,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PaneInfo {
    pub title: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GalleryPane {
    pub url: Option<String>,
    pub figures: Vec<Label>,
    pub info: PaneInfo,
}

impl GalleryPane {
    fn new(title: &str, url: Option<&str>, annotation: &Annotation) -> Self {
        Self {
            url: url.map(str::to_string),
            figures: annotation.labels.clone(),
            info: PaneInfo {
                title: title.to_string(),
            },
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryContent {
    pub project_meta: Value,
    pub annotations: BTreeMap<String, GalleryPane>,
    pub layout: Vec<Vec<String>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Gallery {
    pub content: GalleryContent,
    pub options: GridOptions,
}

impl Gallery {
    pub fn empty() -> Self {
        Self {
            content: GalleryContent {
                project_meta: Value::Object(Map::new()),
                annotations: BTreeMap::new(),
                layout: Vec::new(),
            },
            options: IMAGE_GRID_OPTIONS,
        }
    }

    /// Two panes on one row: the image's current annotation and the annotation that applying the
    /// prediction would produce.
    pub fn comparison(
        project_meta: &ProjectMeta,
        image_url: Option<&str>,
        original: &Annotation,
        prediction: &Annotation,
    ) -> Result<Self, serde_json::Error> {
        let annotations = BTreeMap::from([
            (
                ORIGINAL_PANE.to_string(),
                GalleryPane::new(ORIGINAL_PANE, image_url, original),
            ),
            (
                PREDICTION_PANE.to_string(),
                GalleryPane::new(PREDICTION_PANE, image_url, prediction),
            ),
        ]);

        Ok(Self {
            content: GalleryContent {
                project_meta: project_meta.to_json()?,
                annotations,
                layout: vec![vec![ORIGINAL_PANE.to_string(), PREDICTION_PANE.to_string()]],
            },
            options: IMAGE_GRID_OPTIONS,
        })
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
