use nn_apply_api::schemas::{DatasetInfoSchema, ImageInfoSchema, ProjectInfoSchema, TaskField};
use nn_apply_api::{Client, ClientError};
use serde_json::Value;

/// Operations the handlers need from the annotation platform and the model sessions it relays
/// requests to.
pub trait Platform {
    fn project_info(&self, project_id: u64) -> Result<ProjectInfoSchema, ClientError>;

    fn project_meta(&self, project_id: u64) -> Result<Value, ClientError>;

    fn update_project_meta(&self, project_id: u64, meta: Value) -> Result<(), ClientError>;

    fn datasets(&self, project_id: u64) -> Result<Vec<DatasetInfoSchema>, ClientError>;

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfoSchema>, ClientError>;

    /// Raw annotation JSON of an image.
    fn download_annotation(&self, image_id: u64) -> Result<Value, ClientError>;

    fn upload_annotation(&self, image_id: u64, annotation: Value) -> Result<(), ClientError>;

    fn set_fields(&self, task_id: u64, fields: Vec<TaskField>) -> Result<(), ClientError>;

    /// Send `command` to a running model session and return its response.
    fn send_request(
        &self,
        session_id: u64,
        command: &str,
        data: Value,
    ) -> Result<Value, ClientError>;
}

impl Platform for Client {
    fn project_info(&self, project_id: u64) -> Result<ProjectInfoSchema, ClientError> {
        self.get_project_info(project_id)
    }

    fn project_meta(&self, project_id: u64) -> Result<Value, ClientError> {
        self.get_project_meta(project_id)
    }

    fn update_project_meta(&self, project_id: u64, meta: Value) -> Result<(), ClientError> {
        Client::update_project_meta(self, project_id, meta)
    }

    fn datasets(&self, project_id: u64) -> Result<Vec<DatasetInfoSchema>, ClientError> {
        self.list_datasets(project_id)
    }

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfoSchema>, ClientError> {
        self.list_images(dataset_id)
    }

    fn download_annotation(&self, image_id: u64) -> Result<Value, ClientError> {
        Client::download_annotation(self, image_id).map(|info| info.annotation)
    }

    fn upload_annotation(&self, image_id: u64, annotation: Value) -> Result<(), ClientError> {
        Client::upload_annotation(self, image_id, annotation)
    }

    fn set_fields(&self, task_id: u64, fields: Vec<TaskField>) -> Result<(), ClientError> {
        Client::set_fields(self, task_id, fields)
    }

    fn send_request(
        &self,
        session_id: u64,
        command: &str,
        data: Value,
    ) -> Result<Value, ClientError> {
        Client::send_request(self, session_id, command, data)
    }
}
