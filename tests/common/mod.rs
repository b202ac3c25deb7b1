#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use cafe_api::{config::AppConfig, db, services::ServiceSettings, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness for spinning up the application against a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`] but lets the caller tweak the configuration first.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let db_path = dir.path().join("cafes_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            15_001,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        tweak(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = cafe_api::app_router(state.clone());

        Self {
            router,
            state,
            _dir: dir,
        }
    }

    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings::from(&self.state.config)
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    /// Send a raw body with the given content type.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates a cafe through the API and returns its id.
    pub async fn create_cafe(&self, name: &str, location: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/cafe",
                Some(json!({
                    "name": name,
                    "description": format!("{name} serves coffee"),
                    "location": location,
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "creating cafe {name}");
        let body = response_json(response).await;
        body["id"].as_str().expect("cafe id").to_string()
    }

    /// Creates an employee through the API and returns its id.
    pub async fn create_employee(
        &self,
        name: &str,
        email: &str,
        cafe_id: &str,
        start_date: &str,
    ) -> String {
        let response = self
            .request(
                Method::POST,
                "/employee",
                Some(json!({
                    "name": name,
                    "email_address": email,
                    "phone_number": "91234567",
                    "gender": "Female",
                    "cafe_id": cafe_id,
                    "start_date": start_date,
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "creating employee {email}");
        let body = response_json(response).await;
        body["id"].as_str().expect("employee id").to_string()
    }
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes")
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    let bytes = response_bytes(response).await;
    serde_json::from_slice(&bytes).expect("json response")
}
