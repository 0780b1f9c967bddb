mod common;

use axum::http::StatusCode;
use common::TestApp;
use ranklane_models::Role;
use serde_json::json;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_writes_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let app = TestApp::with_file_store(dir.path());
    let school = app.school().await;

    let (status, class) = app
        .post(
            &school.supervisor,
            "/api/classes",
            json!({ "class_name": "Statistics", "teacher_id": school.teacher.user_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!(
        "/api/classes/{}/students",
        class["class_id"].as_str().unwrap()
    );

    let first = app
        .create_user(&school.supervisor, Role::Student, None)
        .await;
    let second = app
        .create_user(&school.supervisor, Role::Student, None)
        .await;

    let (a, b, c) = tokio::join!(
        app.post(&school.supervisor, &uri, json!({ "student_id": school.student.user_id })),
        app.post(&school.supervisor, &uri, json!({ "student_id": first.user_id })),
        app.post(&school.supervisor, &uri, json!({ "student_id": second.user_id })),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_eq!(c.0, StatusCode::OK);

    let partition = dir
        .path()
        .join(format!("{}.json", school.admin.organization_id));
    assert!(partition.exists());

    let restarted = TestApp::with_file_store(dir.path());
    let (status, body) = restarted.get(&school.supervisor, "/api/classes").await;
    assert_eq!(status, StatusCode::OK);
    let classes = body.as_array().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["students"].as_array().unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reparented_teacher_cannot_take_old_branch_students() {
    let dir = tempfile::tempdir().unwrap();
    let app = TestApp::with_file_store(dir.path());
    let school = app.school().await;
    let second = app
        .create_user(&school.admin, Role::Supervisor, None)
        .await;

    let (_, class) = app
        .post(
            &school.supervisor,
            "/api/classes",
            json!({ "class_name": "Ethics", "teacher_id": school.teacher.user_id }),
        )
        .await;
    let class_id = class["class_id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(
            &school.admin,
            &format!("/api/users/{}/parent", school.teacher.user_id),
            json!({ "parent_id": second.user_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The student stays under the original supervisor's branch.
    let stray = app
        .create_user(&school.supervisor, Role::Student, None)
        .await;
    let (status, _) = app
        .post(
            &second,
            &format!("/api/classes/{}/students", class_id),
            json!({ "student_id": stray.user_id }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let restarted = TestApp::with_file_store(dir.path());
    let (_, body) = restarted.get(&second, "/api/classes").await;
    assert_eq!(body[0]["supervisor_id"], json!(second.user_id));
    let (_, body) = restarted.get(&school.supervisor, "/api/classes").await;
    assert!(body.as_array().unwrap().is_empty());
}
