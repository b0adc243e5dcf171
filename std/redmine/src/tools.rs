//! Tool implementations for the Redmine MCP server.
//!
//! Every tool returns encoded text and never fails at the protocol level:
//! bad input, upstream errors and local I/O problems all come back as an
//! envelope with a non-empty `error`.

use crate::{
    RedmineServer,
    client::{ApiRequest, RedmineClient},
    config::Settings,
    envelope::{Body, Envelope},
    error::Error,
    openapi::PathSpecs,
};
use rmcp::{
    handler::server::wrapper::Parameters,
    schemars::{self, JsonSchema},
    tool, tool_router,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Parameters for a raw API request.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RequestParams {
    /// API endpoint path (e.g. '/issues.json').
    pub path: String,
    /// HTTP method to use (default: 'get').
    #[serde(default = "default_method")]
    pub method: String,
    /// JSON request body (for POST/PUT).
    pub data: Option<Value>,
    /// Query parameters.
    pub params: Option<Map<String, Value>>,
}

fn default_method() -> String {
    "get".into()
}

/// Parameters for looking up path specifications.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct PathsInfoParams {
    /// Path templates as listed by `redmine_paths_list`.
    pub path_templates: Vec<String>,
}

/// Parameters for uploading a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadParams {
    /// Fully qualified path of the file to upload.
    pub file_path: String,
    /// Optional description stored with the attachment.
    pub description: Option<String>,
}

/// Parameters for downloading an attachment.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadParams {
    /// Id of the attachment.
    pub attachment_id: u64,
    /// Fully qualified path the content is written to.
    pub save_path: String,
    /// Attachment filename; looked up from the attachment metadata when omitted.
    pub filename: Option<String>,
}

#[tool_router]
impl RedmineServer {
    /// Create a server talking to the Redmine instance described by `settings`.
    pub fn new(settings: &Settings, paths: PathSpecs) -> Result<Self, Error> {
        let mut tool_router = Self::tool_router();
        if !settings.request_instructions.is_empty() {
            if let Some(route) = tool_router.map.get_mut("redmine_request") {
                let base = route.attr.description.clone().unwrap_or_default();
                route.attr.description =
                    Some(format!("{base}\n\n{}", settings.request_instructions).into());
            }
        }
        Ok(Self {
            client: RedmineClient::new(settings)?,
            paths: Arc::new(paths),
            format: settings.response_format,
            tool_router,
        })
    }

    /// Make a request to the Redmine API.
    #[tool(
        description = "Make a request to the Redmine API\n\nArgs:\n    path: API endpoint path (e.g. '/issues.json')\n    method: HTTP method to use (default: 'get')\n    data: Dictionary for request body (for POST/PUT)\n    params: Dictionary for query parameters\n\nReturns:\n    str: YAML (or JSON) string containing response status code, body and error message"
    )]
    async fn redmine_request(&self, Parameters(params): Parameters<RequestParams>) -> String {
        let request = ApiRequest::new(params.path)
            .method(params.method)
            .data(params.data)
            .params(params.params);
        self.format.encode(&self.client.request(request).await)
    }

    /// List the API path templates.
    #[tool(description = "Return a list of available API paths from OpenAPI spec")]
    async fn redmine_paths_list(&self) -> String {
        self.format.encode(&self.paths.templates())
    }

    /// Look up the specification of path templates.
    #[tool(description = "Get full path information for given path templates")]
    async fn redmine_paths_info(&self, Parameters(params): Parameters<PathsInfoParams>) -> String {
        self.format.encode(&self.paths.info(&params.path_templates))
    }

    /// Upload a local file.
    #[tool(description = "Upload a file to Redmine and return the attachment token")]
    async fn redmine_upload(&self, Parameters(params): Parameters<UploadParams>) -> String {
        let envelope = self
            .upload(params)
            .await
            .unwrap_or_else(|err| Envelope::failure(&err));
        self.format.encode(&envelope)
    }

    /// Download an attachment to a local file.
    #[tool(description = "Download an attachment from Redmine and save it locally")]
    async fn redmine_download(&self, Parameters(params): Parameters<DownloadParams>) -> String {
        let envelope = self
            .download(params)
            .await
            .unwrap_or_else(|err| Envelope::failure(&err));
        self.format.encode(&envelope)
    }
}

impl RedmineServer {
    async fn upload(&self, params: UploadParams) -> Result<Envelope, Error> {
        let path = local_path(&params.file_path)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => return Err(Error::IsDirectory(path)),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::NotFound(path)),
            Err(e) => return Err(e.into()),
        }

        let mut query = Map::new();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        query.insert("filename".into(), Value::String(filename));
        if let Some(description) = params.description.filter(|d| !d.is_empty()) {
            query.insert("description".into(), Value::String(description));
        }

        let content = tokio::fs::read(&path).await?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "uploading file");
        let request = ApiRequest::new("uploads.json")
            .method("post")
            .params(Some(query))
            .content_type("application/octet-stream")
            .content(content);
        Ok(self.client.request(request).await)
    }

    async fn download(&self, params: DownloadParams) -> Result<Envelope, Error> {
        let path = local_path(&params.save_path)?;
        if tokio::fs::metadata(&path).await.is_ok_and(|meta| meta.is_dir()) {
            return Err(Error::IsDirectory(path));
        }

        let id = params.attachment_id;
        let filename = match params.filename.filter(|f| !f.is_empty()) {
            Some(filename) => filename,
            None => {
                let metadata = self
                    .client
                    .request(ApiRequest::new(format!("attachments/{id}.json")))
                    .await;
                if metadata.status_code != 200 {
                    return Ok(metadata);
                }
                attachment_filename(&metadata.body).ok_or(Error::MissingFilename)?
            }
        };

        let response = self
            .client
            .request(
                ApiRequest::new(format!("attachments/download/{id}/{filename}"))
                    .content_type("application/octet-stream")
                    .raw(),
            )
            .await;
        if response.status_code != 200 || response.body.is_empty() {
            return Ok(response);
        }
        let Body::Raw(content) = &response.body else {
            return Ok(response);
        };

        tokio::fs::write(&path, content).await?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "saved attachment");
        Ok(Envelope::success(
            200,
            Body::Json(json!({
                "saved_to": path.display().to_string(),
                "filename": filename,
            })),
        ))
    }
}

/// `attachment.filename` from an attachment metadata document.
fn attachment_filename(body: &Body) -> Option<String> {
    body.as_json()?
        .get("attachment")?
        .get("filename")?
        .as_str()
        .map(str::to_string)
}

/// Expand a leading `~` and require the result to be absolute.
fn local_path(raw: &str) -> Result<PathBuf, Error> {
    let path = expand_home(raw);
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(Error::RelativePath(PathBuf::from(raw)))
    }
}

fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };
    match (rest, std::env::var_os("HOME")) {
        (Some(rest), Some(home)) if !rest.is_empty() => Path::new(&home).join(rest),
        (Some(_), Some(home)) => PathBuf::from(home),
        _ => PathBuf::from(raw),
    }
}
