mod common;

use std::io;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use common::{TestApp, generate_unique_email};
use ranklane_models::Role;
use serde_json::{Value, json};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Captured {
    fn events(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

#[tokio::test]
async fn test_denied_request_is_logged_with_caller() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_writer(captured.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = TestApp::new();
    let school = app.school().await;

    let (status, _) = app
        .post(
            &school.teacher,
            "/api/users",
            json!({
                "role": Role::Student,
                "name": "Unlisted",
                "email": generate_unique_email(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let events = captured.events();
    let denied = events
        .iter()
        .find(|event| event["fields"]["message"] == "Request denied")
        .expect("no denial logged");
    assert_eq!(denied["fields"]["status"], 403);
    assert_eq!(denied["span"]["name"], "request");
    assert_eq!(
        denied["span"]["actor"],
        json!(school.teacher.user_id.to_string())
    );
    assert_eq!(
        denied["span"]["org"],
        json!(school.teacher.organization_id.to_string())
    );
}

#[tokio::test]
async fn test_unauthenticated_request_has_no_caller() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_writer(captured.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = TestApp::new();
    let (status, _) = app.send("GET", "/api/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let events = captured.events();
    let denied = events
        .iter()
        .find(|event| event["fields"]["message"] == "Request denied")
        .expect("no denial logged");
    assert_eq!(denied["fields"]["status"], 401);
    assert!(denied["span"].get("actor").is_none());
}
