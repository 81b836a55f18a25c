use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Deserialize, Debug)]
pub struct ApiErrorBody {
    #[serde(alias = "error", default = "unknown_message")]
    pub message: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

fn unknown_message() -> String {
    "An unknown error occurred".to_string()
}

impl Default for ApiErrorBody {
    fn default() -> Self {
        ApiErrorBody {
            message: unknown_message(),
            details: serde_json::Value::Null,
        }
    }
}

impl Display for ApiErrorBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.details.is_null() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} ({})", self.message, self.details)
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Resource not found")]
    NotFound,
    #[error("Unauthorized access")]
    Unauthorized,
    #[error("Forbidden access")]
    Forbidden,
    #[error("Internal server error")]
    InternalServerError,
    #[error("Api error {status}: {body}")]
    ApiError {
        status: StatusCode,
        body: ApiErrorBody,
    },
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Unknown Error: {0}")]
    UnknownError(String),
}

impl ClientError {
    pub fn is_login_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::Forbidden)
    }
}
