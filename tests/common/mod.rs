#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use chini_api::config::{AppConfig, Environment};
use chini_api::database::models::{Membership, Role, User};
use chini_api::database::{MemoryDocumentStore, Record};
use chini_api::services::user_service::LoginUser;
use chini_api::{app, AppState};

pub const PASSWORD: &str = "correct-horse";

/// In-process application over a fresh in-memory store and a temporary uploads directory
pub struct TestApp {
    pub state: AppState,
    pub uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_config(|_| {})
    }

    /// Like `new`, with a chance to adjust the test configuration first
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create uploads dir")?;

        let mut config = AppConfig::for_environment(Environment::Development);
        config.database.url = None;
        config.api.enable_request_logging = false;
        config.security.jwt_secret = "integration-test-secret".to_string();
        config.security.bcrypt_cost = 4;
        config.uploads.dir = uploads.path().to_path_buf();
        config.uploads.public_base_url = String::new();
        adjust(&mut config);

        let state = AppState::new(config, Arc::new(MemoryDocumentStore::new()));
        Ok(Self { state, uploads })
    }

    pub async fn seed_user(&self, email: &str, role: Option<Role>) -> Result<Record<User>> {
        let user = User {
            first_name: "Test".into(),
            last_name: email.split('@').next().unwrap_or("user").into(),
            name: String::new(),
            email: email.into(),
            phone_number: "555-0100".into(),
            address: "1 Market St".into(),
            avatar: None,
            bio: None,
            role,
            membership: Membership::Free,
            expiration_date: None,
            password: String::new(),
        };
        Ok(self.state.users().create_with_password(user, PASSWORD).await?)
    }

    pub async fn token_for(&self, email: &str) -> Result<String> {
        let outcome = self
            .state
            .users()
            .login(LoginUser {
                email: Some(email.into()),
                password: Some(PASSWORD.into()),
            })
            .await?;
        Ok(outcome.token)
    }

    /// Seed an admin and return a token for it
    pub async fn admin_token(&self) -> Result<String> {
        self.seed_user("admin@example.com", Some(Role::Admin)).await?;
        self.token_for("admin@example.com").await
    }

    /// Seed a non-admin member and return a token for it
    pub async fn member_token(&self, email: &str) -> Result<String> {
        self.seed_user(email, Some(Role::Leader)).await?;
        self.token_for(email).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = app(self.state.clone()).oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        Ok(TestResponse { status, body })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// POST a multipart body with one part per `(field, file name, bytes)`
    pub async fn upload(
        &self,
        uri: &str,
        token: Option<&str>,
        files: &[(&str, &str, &[u8])],
    ) -> Result<TestResponse> {
        let boundary = "chini-test-boundary";
        let mut body = Vec::new();
        for (field, file_name, data) in files {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    field, file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body))?).await
    }
}

/// `result.id` of a response, as a string
pub fn result_id(response: &TestResponse) -> String {
    response.body["result"]["id"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}
