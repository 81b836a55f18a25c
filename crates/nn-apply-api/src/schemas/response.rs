use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfoSchema {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<u64>,
    #[serde(default)]
    pub images_count: Option<u64>,
    #[serde(default)]
    pub items_count: Option<u64>,
    #[serde(default)]
    pub reference_image_url: Option<String>,
}

impl ProjectInfoSchema {
    /// Number of items in the project, whichever counter the server filled in.
    pub fn item_count(&self) -> u64 {
        self.items_count.or(self.images_count).unwrap_or_default()
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfoSchema {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub images_count: Option<u64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfoSchema {
    pub id: u64,
    pub name: String,
    pub dataset_id: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub full_storage_url: Option<String>,
}

/// Page of a paginated list endpoint.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageSchema<T> {
    pub entities: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages_count: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationInfoSchema {
    pub image_id: u64,
    #[serde(default)]
    pub image_name: Option<String>,
    pub annotation: serde_json::Value,
}
