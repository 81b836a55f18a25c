use std::cell::RefCell;
use std::collections::HashMap;

use nn_apply_api::ClientError;
use nn_apply_api::schemas::{DatasetInfoSchema, ImageInfoSchema, ProjectInfoSchema, TaskField};
use serde_json::{Value, json};

use crate::platform::Platform;

/// In-memory platform that records every write and request.
#[derive(Default)]
pub struct MockPlatform {
    pub project: Option<ProjectInfoSchema>,
    pub project_meta: RefCell<Value>,
    pub datasets: Vec<DatasetInfoSchema>,
    pub images: HashMap<u64, Vec<ImageInfoSchema>>,
    pub annotations: RefCell<HashMap<u64, Value>>,
    /// Responses keyed by request command.
    pub responses: HashMap<String, Value>,
    pub requests: RefCell<Vec<(u64, String, Value)>>,
    pub uploads: RefCell<Vec<(u64, Value)>>,
    pub fields: RefCell<Vec<(u64, Vec<TaskField>)>>,
    pub meta_updates: RefCell<Vec<Value>>,
}

impl MockPlatform {
    pub fn meta_updates(&self) -> Vec<Value> {
        self.meta_updates.borrow().clone()
    }

    pub fn requests_for(&self, command: &str) -> Vec<Value> {
        self.requests
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == command)
            .map(|(_, _, data)| data.clone())
            .collect()
    }

    /// Payload of the last push of `field`.
    pub fn last_field(&self, field: &str) -> Option<Value> {
        self.fields
            .borrow()
            .iter()
            .flat_map(|(_, fields)| fields.iter())
            .filter(|f| f.field == field)
            .last()
            .map(|f| f.payload.clone())
    }
}

impl Platform for MockPlatform {
    fn project_info(&self, project_id: u64) -> Result<ProjectInfoSchema, ClientError> {
        self.project
            .clone()
            .filter(|project| project.id == project_id)
            .ok_or(ClientError::NotFound)
    }

    fn project_meta(&self, _project_id: u64) -> Result<Value, ClientError> {
        Ok(self.project_meta.borrow().clone())
    }

    fn update_project_meta(&self, _project_id: u64, meta: Value) -> Result<(), ClientError> {
        self.meta_updates.borrow_mut().push(meta.clone());
        *self.project_meta.borrow_mut() = meta;
        Ok(())
    }

    fn datasets(&self, _project_id: u64) -> Result<Vec<DatasetInfoSchema>, ClientError> {
        Ok(self.datasets.clone())
    }

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfoSchema>, ClientError> {
        Ok(self.images.get(&dataset_id).cloned().unwrap_or_default())
    }

    fn download_annotation(&self, image_id: u64) -> Result<Value, ClientError> {
        self.annotations
            .borrow()
            .get(&image_id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    fn upload_annotation(&self, image_id: u64, annotation: Value) -> Result<(), ClientError> {
        self.uploads.borrow_mut().push((image_id, annotation.clone()));
        self.annotations.borrow_mut().insert(image_id, annotation);
        Ok(())
    }

    fn set_fields(&self, task_id: u64, fields: Vec<TaskField>) -> Result<(), ClientError> {
        self.fields.borrow_mut().push((task_id, fields));
        Ok(())
    }

    fn send_request(
        &self,
        session_id: u64,
        command: &str,
        data: Value,
    ) -> Result<Value, ClientError> {
        self.requests
            .borrow_mut()
            .push((session_id, command.to_string(), data));
        self.responses
            .get(command)
            .cloned()
            .ok_or_else(|| ClientError::UnknownError(format!("no response for '{command}'")))
    }
}

pub fn empty_annotation() -> Value {
    json!({
        "description": "",
        "size": {"height": 100, "width": 100},
        "tags": [],
        "objects": []
    })
}
