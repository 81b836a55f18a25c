use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::credentials::ApiCredentials;
use crate::error::{ApiErrorBody, ClientError};
use crate::schemas::{
    AnnotationBulkAddSchema, AnnotationInfoParamsSchema, AnnotationInfoSchema,
    DatasetInfoSchema, DatasetListParamsSchema, IdParamsSchema, ImageAnnotationSchema,
    ImageInfoSchema, ImageListParamsSchema, PageSchema, ProjectInfoSchema, SendRequestSchema,
    SetTaskFieldsSchema, TaskField, UpdateProjectMetaSchema,
};

const API_PREFIX: &str = "public/api/v3/";
const API_KEY_HEADER: &str = "x-api-key";
const PAGE_SIZE: u32 = 500;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => ClientError::ApiError {
                status,
                body: ApiErrorBody {
                    message: error.to_string(),
                    ..Default::default()
                },
            },
            None => ClientError::UnknownError(error.to_string()),
        }
    }
}

trait ResponseExt {
    fn map_to_platform_err(self) -> Result<reqwest::blocking::Response, ClientError>;
}

impl ResponseExt for reqwest::blocking::Response {
    fn map_to_platform_err(self) -> Result<reqwest::blocking::Response, ClientError> {
        if self.status().is_success() {
            Ok(self)
        } else {
            match self.status() {
                reqwest::StatusCode::NOT_FOUND => Err(ClientError::NotFound),
                reqwest::StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                reqwest::StatusCode::FORBIDDEN => Err(ClientError::Forbidden),
                reqwest::StatusCode::INTERNAL_SERVER_ERROR => Err(ClientError::InternalServerError),
                _ => Err(ClientError::ApiError {
                    status: self.status(),
                    body: self
                        .text()
                        .map_err(|e| ClientError::UnknownError(e.to_string()))?
                        .parse::<serde_json::Value>()
                        .and_then(serde_json::from_value::<ApiErrorBody>)
                        .unwrap_or_else(|e| ApiErrorBody {
                            message: e.to_string(),
                            ..Default::default()
                        }),
                }),
            }
        }
    }
}

/// A client for making HTTP requests to the annotation platform API.
///
/// Every endpoint of the public API is a `POST` with a JSON body, so the client only needs one
/// request path. The API token is sent with each request.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::blocking::Client,
    base_url: Url,
    api_token: String,
    request_timeout: Duration,
}

impl Client {
    /// Create a new client for the platform listening on `server_address`.
    pub fn new(server_address: &str, credentials: &ApiCredentials) -> Result<Self, ClientError> {
        let mut server = server_address.trim_end_matches('/').to_string();
        server.push('/');

        let base_url = Url::parse(&server)
            .and_then(|url| url.join(API_PREFIX))
            .map_err(|e| ClientError::InvalidUrl(format!("{server_address}: {e}")))?;

        Ok(Client {
            http_client: reqwest::blocking::Client::new(),
            base_url,
            api_token: credentials.token().to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Timeout applied to requests relayed to other tasks.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, ClientError>
    where
        T: serde::Serialize,
        R: DeserializeOwned,
    {
        let response = self.req(path, body, None)?;
        let json = response.json::<R>()?;
        Ok(json)
    }

    fn post<T>(&self, path: &str, body: &T) -> Result<(), ClientError>
    where
        T: serde::Serialize,
    {
        self.req(path, body, None).map(|_| ())
    }

    fn req<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        let url = self.join(path)?;
        log::trace!("POST {url}");

        let mut request_builder = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, &self.api_token)
            .json(body);

        if let Some(timeout) = timeout {
            request_builder = request_builder.timeout(timeout);
        }

        let response = request_builder.send()?.map_to_platform_err()?;

        Ok(response)
    }

    /// Join the given path to the base URL.
    fn join(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Walk every page of a paginated list endpoint.
    fn list_all<T, P>(&self, path: &str, params: impl Fn(u32) -> P) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned,
        P: serde::Serialize,
    {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let response: PageSchema<T> = self.post_json(path, &params(page))?;
            let pages_count = response.pages_count;
            items.extend(response.entities);
            if page >= pages_count {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    pub fn get_project_info(&self, project_id: u64) -> Result<ProjectInfoSchema, ClientError> {
        self.post_json("projects.info", &IdParamsSchema { id: project_id })
    }

    /// Fetch the raw JSON schema (classes and tag metas) of a project.
    pub fn get_project_meta(&self, project_id: u64) -> Result<serde_json::Value, ClientError> {
        self.post_json("projects.meta", &IdParamsSchema { id: project_id })
    }

    pub fn update_project_meta(
        &self,
        project_id: u64,
        meta: serde_json::Value,
    ) -> Result<(), ClientError> {
        self.post(
            "projects.meta.update",
            &UpdateProjectMetaSchema {
                id: project_id,
                meta,
            },
        )
    }

    pub fn list_datasets(&self, project_id: u64) -> Result<Vec<DatasetInfoSchema>, ClientError> {
        self.list_all("datasets.list", |page| DatasetListParamsSchema {
            project_id,
            page,
            per_page: PAGE_SIZE,
        })
    }

    pub fn list_images(&self, dataset_id: u64) -> Result<Vec<ImageInfoSchema>, ClientError> {
        self.list_all("images.list", |page| ImageListParamsSchema {
            dataset_id,
            page,
            per_page: PAGE_SIZE,
        })
    }

    pub fn get_image_info(&self, image_id: u64) -> Result<ImageInfoSchema, ClientError> {
        self.post_json("images.info", &IdParamsSchema { id: image_id })
    }

    pub fn download_annotation(&self, image_id: u64) -> Result<AnnotationInfoSchema, ClientError> {
        self.post_json("annotations.info", &AnnotationInfoParamsSchema { image_id })
    }

    /// Replace the annotation of an image.
    ///
    /// The bulk endpoint is scoped by dataset, so the image is looked up first.
    pub fn upload_annotation(
        &self,
        image_id: u64,
        annotation: serde_json::Value,
    ) -> Result<(), ClientError> {
        let image = self.get_image_info(image_id)?;

        self.post(
            "annotations.bulk.add",
            &AnnotationBulkAddSchema {
                dataset_id: image.dataset_id,
                annotations: vec![ImageAnnotationSchema {
                    image_id,
                    annotation,
                }],
            },
        )
    }

    /// Push UI field updates for the given task.
    pub fn set_fields(&self, task_id: u64, fields: Vec<TaskField>) -> Result<(), ClientError> {
        self.post(
            "tasks.data.set",
            &SetTaskFieldsSchema {
                task_id,
                payload: fields,
            },
        )
    }

    /// Send a named request to another running task and wait for its response.
    pub fn send_request(
        &self,
        task_id: u64,
        command: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        log::debug!("Sending request '{command}' to task {task_id}");

        let body = SendRequestSchema {
            task_id,
            command: command.to_string(),
            context: serde_json::json!({}),
            state: data,
            skip_response: false,
            timeout: self.request_timeout.as_secs(),
        };

        let response = self.req("tasks.request.direct", &body, Some(self.request_timeout))?;
        let json = response.json::<serde_json::Value>()?;
        Ok(json)
    }
}
