use derive_new::new;
use serde::Serialize;

#[derive(Serialize)]
pub struct IdParamsSchema {
    pub id: u64,
}

#[derive(Serialize)]
pub struct UpdateProjectMetaSchema {
    pub id: u64,
    pub meta: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetListParamsSchema {
    pub project_id: u64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageListParamsSchema {
    pub dataset_id: u64,
    pub page: u32,
    pub per_page: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationInfoParamsSchema {
    pub image_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotationSchema {
    pub image_id: u64,
    pub annotation: serde_json::Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationBulkAddSchema {
    pub dataset_id: u64,
    pub annotations: Vec<ImageAnnotationSchema>,
}

/// One UI field update. `field` is a dotted path such as `state.processing`.
#[derive(new, Serialize, Debug, Clone, PartialEq)]
pub struct TaskField {
    pub field: String,
    pub payload: serde_json::Value,
    #[new(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,
}

impl TaskField {
    /// Merge the payload into the existing value instead of replacing it.
    pub fn appended(mut self) -> Self {
        self.append = Some(true);
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTaskFieldsSchema {
    pub task_id: u64,
    pub payload: Vec<TaskField>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestSchema {
    pub task_id: u64,
    pub command: String,
    pub context: serde_json::Value,
    pub state: serde_json::Value,
    pub skip_response: bool,
    pub timeout: u64,
}
