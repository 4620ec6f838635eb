//! Slice backend abstraction and its HTTP implementation.
//!
//! Endpoints (JSON over HTTP):
//! - `GET /images`
//! - `GET /slices`
//! - `POST /slices/create`
//! - `POST /slices/deploy/{slice_id}`
//! - `POST /login` (form encoded, served by the auth service)

use crate::{Result, SlicerError, config::BackendConfig, image::Image, log_debug};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait SliceBackend: Send + Sync {
    async fn fetch_images(&self) -> Result<Vec<Image>>;

    async fn create_slice(&self, payload: &SlicePayload) -> Result<CreateSliceResponse>;

    async fn deploy_slice(&self, slice_id: u64) -> Result<DeployResponse>;

    async fn list_slices(&self) -> Result<SliceListing>;

    /// Exchange credentials for a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /slices/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlicePayload {
    pub name: String,
    pub nodes: Vec<NodePayload>,
    pub links: Vec<LinkPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePayload {
    pub label: String,
    pub cpu: u32,
    pub ram: u32,
    pub disk: u32,
    pub image_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPayload {
    pub from_vm: String,
    pub to_vm: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSliceResponse {
    pub slice_id: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Deployment result; only `slice_id` has a known shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployResponse {
    #[serde(default)]
    pub slice_id: Option<u64>,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceListing {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub slices: Vec<SliceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceSummary {
    pub slice_id: u64,
    #[serde(default)]
    pub slice_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Comma separated VM ids
    #[serde(default)]
    pub vms: Option<String>,
}

/// `/images` is served either as a bare array or wrapped in `{"images": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageListResponse {
    Bare(Vec<Image>),
    Wrapped { images: Vec<Image> },
}

impl From<ImageListResponse> for Vec<Image> {
    fn from(response: ImageListResponse) -> Self {
        match response {
            ImageListResponse::Bare(images) => images,
            ImageListResponse::Wrapped { images } => images,
        }
    }
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
    auth_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("slicer/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = config.url.trim_end_matches('/').to_string();
        let auth_url = config
            .auth_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| base_url.clone());

        Ok(Self {
            client,
            base_url,
            auth_url,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        log_debug!("GET {}", url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        handle_response(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(path);
        log_debug!("POST {}", url);
        let mut request = self.authorize(self.client.post(&url));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(SlicerError::Api {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(SlicerError::from)
}

#[async_trait]
impl SliceBackend for HttpBackend {
    async fn fetch_images(&self) -> Result<Vec<Image>> {
        let response: ImageListResponse = self.get("/images").await?;
        Ok(response.into())
    }

    async fn create_slice(&self, payload: &SlicePayload) -> Result<CreateSliceResponse> {
        self.post("/slices/create", Some(payload)).await
    }

    async fn deploy_slice(&self, slice_id: u64) -> Result<DeployResponse> {
        self.post::<(), _>(&format!("/slices/deploy/{}", slice_id), None)
            .await
    }

    async fn list_slices(&self) -> Result<SliceListing> {
        self.get("/slices").await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = format!("{}/login", self.auth_url);
        log_debug!("POST {} (user {})", url, username);
        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        handle_response(response).await
    }
}
