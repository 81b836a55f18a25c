use nn_apply_api::ClientError;

use crate::annotation::AnnotationError;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("Handler '{0}' not found")]
    HandlerNotFound(String),
    #[error("Model is not connected, call 'connect' first")]
    ModelNotConnected,
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid UI state: {0}")]
    InvalidState(String),
    #[error("Project has no images to sample from")]
    EmptyProject,
    #[error("Cannot reconcile schemas: {0}")]
    SchemaConflict(String),
    #[error("Invalid annotation: {0}")]
    Annotation(#[from] AnnotationError),
    #[error("Platform API call failed: {0}")]
    Platform(#[from] ClientError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
