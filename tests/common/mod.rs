// Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use slicer::{
    Image, Result, SlicerError,
    backend::{
        CreateSliceResponse, DeployResponse, LoginResponse, SliceBackend, SliceListing,
        SlicePayload,
    },
};
use std::sync::Mutex;

/// In-memory backend that records every call it receives.
#[derive(Default)]
pub struct RecordingBackend {
    pub images: Vec<Image>,
    pub fail_images: bool,
    pub fail_create: bool,
    pub fail_deploy: bool,
    pub next_slice_id: Mutex<u64>,
    pub created: Mutex<Vec<SlicePayload>>,
    pub deployed: Mutex<Vec<u64>>,
    pub image_fetches: Mutex<usize>,
    pub logins: Mutex<Vec<(String, String)>>,
}

impl RecordingBackend {
    pub fn with_images(images: Vec<Image>) -> Self {
        Self {
            images,
            next_slice_id: Mutex::new(41),
            ..Default::default()
        }
    }

    pub fn ubuntu() -> Self {
        Self::with_images(vec![Image::new(1, "ubuntu")])
    }

    pub fn create_calls(&self) -> Vec<SlicePayload> {
        self.created.lock().unwrap().clone()
    }

    pub fn deploy_calls(&self) -> Vec<u64> {
        self.deployed.lock().unwrap().clone()
    }

    pub fn image_fetch_count(&self) -> usize {
        *self.image_fetches.lock().unwrap()
    }

    pub fn login_calls(&self) -> Vec<(String, String)> {
        self.logins.lock().unwrap().clone()
    }
}

fn server_error() -> SlicerError {
    SlicerError::Api {
        status: 500,
        body: "internal error".into(),
    }
}

#[async_trait]
impl SliceBackend for RecordingBackend {
    async fn fetch_images(&self) -> Result<Vec<Image>> {
        *self.image_fetches.lock().unwrap() += 1;
        if self.fail_images {
            return Err(server_error());
        }
        Ok(self.images.clone())
    }

    async fn create_slice(&self, payload: &SlicePayload) -> Result<CreateSliceResponse> {
        self.created.lock().unwrap().push(payload.clone());
        if self.fail_create {
            return Err(server_error());
        }
        let mut next = self.next_slice_id.lock().unwrap();
        *next += 1;
        Ok(CreateSliceResponse {
            slice_id: *next,
            message: Some(format!("Slice {} saved", payload.name)),
            owner: None,
        })
    }

    async fn deploy_slice(&self, slice_id: u64) -> Result<DeployResponse> {
        self.deployed.lock().unwrap().push(slice_id);
        if self.fail_deploy {
            return Err(server_error());
        }
        Ok(DeployResponse {
            slice_id: Some(slice_id),
            result: serde_json::json!({"status": "ok"}),
            owner: None,
        })
    }

    async fn list_slices(&self) -> Result<SliceListing> {
        Ok(SliceListing::default())
    }

    /// Any non-empty password is accepted.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        self.logins
            .lock()
            .unwrap()
            .push((username.to_string(), password.to_string()));
        if password.is_empty() {
            return Err(SlicerError::Api {
                status: 401,
                body: r#"{"detail":"Invalid credentials"}"#.into(),
            });
        }
        Ok(LoginResponse {
            access_token: format!("token-for-{}", username),
            token_type: Some("bearer".into()),
            role: Some("user".into()),
        })
    }
}
