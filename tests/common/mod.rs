#![allow(dead_code)]

use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ranklane::router::init_router;
use ranklane::state::AppState;
use ranklane_auth::create_access_token;
use ranklane_config::{JwtConfig, StoreBackend, StoreConfig};
use ranklane_models::{Actor, OrganizationId, Role, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "ranklane-test-secret";

pub fn jwt_config() -> JwtConfig {
    JwtConfig::with_secret(TEST_SECRET)
}

pub fn generate_unique_email() -> String {
    format!("test_{}@example.com", Uuid::new_v4())
}

/// A router over a fresh in-memory engine.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::from_state(AppState::in_memory(jwt_config()))
    }

    /// A router over the JSON file store rooted at `dir`.
    pub fn with_file_store(dir: &Path) -> Self {
        let store_config = StoreConfig {
            backend: StoreBackend::File {
                dir: dir.to_path_buf(),
            },
        };
        Self::from_state(AppState::with_store(&store_config, jwt_config()))
    }

    fn from_state(state: AppState) -> Self {
        Self {
            router: init_router(state.clone()),
            state,
        }
    }

    pub fn token(&self, actor: &Actor) -> String {
        create_access_token(actor, &generate_unique_email(), &self.state.jwt_config).unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, actor: &Actor, uri: &str) -> (StatusCode, Value) {
        let token = self.token(actor);
        self.send("GET", uri, Some(&token), None).await
    }

    pub async fn post(&self, actor: &Actor, uri: &str, body: Value) -> (StatusCode, Value) {
        let token = self.token(actor);
        self.send("POST", uri, Some(&token), Some(body)).await
    }

    pub async fn put(&self, actor: &Actor, uri: &str, body: Value) -> (StatusCode, Value) {
        let token = self.token(actor);
        self.send("PUT", uri, Some(&token), Some(body)).await
    }

    pub async fn delete(&self, actor: &Actor, uri: &str) -> (StatusCode, Value) {
        let token = self.token(actor);
        self.send("DELETE", uri, Some(&token), None).await
    }

    /// Creates a user through the API and returns them as an actor.
    pub async fn create_user(
        &self,
        creator: &Actor,
        role: Role,
        parent: Option<UserId>,
    ) -> Actor {
        let (status, body) = self
            .post(
                creator,
                "/api/users",
                json!({
                    "role": role,
                    "name": format!("Test {}", role),
                    "email": generate_unique_email(),
                    "parent_id": parent,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create_user failed: {}", body);
        Actor::new(user_id(&body["user_id"]), role, creator.organization_id)
    }

    /// One admin, one supervisor under them, a teacher under the supervisor
    /// and a student under the teacher.
    pub async fn school(&self) -> School {
        let admin = Actor::new(UserId::new(), Role::Admin, OrganizationId::new());
        let supervisor = self.create_user(&admin, Role::Supervisor, None).await;
        let teacher = self.create_user(&supervisor, Role::Teacher, None).await;
        let student = self
            .create_user(&supervisor, Role::Student, Some(teacher.user_id))
            .await;
        School {
            admin,
            supervisor,
            teacher,
            student,
        }
    }
}

pub struct School {
    pub admin: Actor,
    pub supervisor: Actor,
    pub teacher: Actor,
    pub student: Actor,
}

pub fn user_id(value: &Value) -> UserId {
    UserId::from_uuid(value.as_str().unwrap().parse().unwrap())
}

pub fn ids(values: &Value, field: &str) -> Vec<String> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|value| value[field].as_str().unwrap().to_string())
        .collect()
}
