mod common;

use api_lib::web::{self, protocol::ServerMessage, state::ConnectionHandle};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{fields, TestApp};
use inspection_core::Role;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

const BOUNDARY: &str = "XBOUNDARYX";

fn app_router(app: &TestApp) -> Router {
    web::router(app.state.clone()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_submit(token: &str, text_fields: &[(&str, &str)], document: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in text_fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = document {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/test/submissions")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn register_ignores_client_supplied_role() {
    let app = TestApp::new().await;
    let router = app_router(&app);

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"name": "Rina", "email": "rina@example.com", "password": "pw", "role": "ahli"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &router,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"email": "rina@example.com", "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn register_rejects_missing_fields_and_duplicates() {
    let app = TestApp::new().await;
    let router = app_router(&app);

    let (status, _) = send(
        &router,
        json_request(Method::POST, "/api/auth/register", None, json!({"name": "Rina"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({"name": "Rina", "email": "rina@example.com", "password": "pw"});
    let (status, _) = send(
        &router,
        json_request(Method::POST, "/api/auth/register", None, body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &router,
        json_request(Method::POST, "/api/auth/register", None, body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failure_codes() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    app.user("Sari").await;

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"email": "nobody@example.com", "password": "password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"email": "sari@example.com", "password": "nope"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_and_invalid_credentials_differ() {
    let app = TestApp::new().await;
    let router = app_router(&app);

    let (status, _) = send(&router, get("/api/test/submissions/mine", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, get("/api/test/submissions/mine", Some("garbage"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn multipart_submit_then_list_mine() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    let owner = app.user("Sari").await;
    let token = app.token_for(&owner).await;

    let request = multipart_submit(
        &token,
        &[
            ("service_type", "riksa uji"),
            ("company_name", "PT Satu"),
            ("equipment_type", "boiler"),
            ("inspection_location", "Gresik"),
        ],
        Some(("izin.pdf", &b"%PDF"[..])),
    );
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(&router, get("/api/test/submissions/mine", Some(token.as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["status"], "pending");
    assert_eq!(list[0]["company_name"], "PT Satu");
    assert_eq!(list[0]["equipment_type"], "boiler");
    assert!(list[0]["document_path"].as_str().unwrap().ends_with(".pdf"));
}

#[tokio::test]
async fn list_all_is_for_experts_only() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    let owner = app.user("Sari").await;
    let expert = app.ahli("Eko").await;
    app.state
        .submissions
        .submit(owner.user_id, fields("PT Satu"), None)
        .await
        .unwrap();

    let owner_token = app.token_for(&owner).await;
    let (status, _) = send(&router, get("/api/test/submissions/all", Some(owner_token.as_str()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let expert_token = app.token_for(&expert).await;
    let (status, body) = send(&router, get("/api/test/submissions/all", Some(expert_token.as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["user_name"], "Sari");
    assert_eq!(body[0]["company_name"], "PT Satu");
}

#[tokio::test]
async fn edit_delete_and_status_codes() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    let owner = app.user("A").await;
    let stranger = app.user("B").await;
    let expert = app.ahli("E").await;
    let id = app
        .state
        .submissions
        .submit(owner.user_id, fields("PT Satu"), None)
        .await
        .unwrap();
    let stranger_token = app.token_for(&stranger).await;
    let expert_token = app.token_for(&expert).await;
    let owner_token = app.token_for(&owner).await;
    let uri = format!("/api/test/submissions/{}", id);
    let missing = format!("/api/test/submissions/{}", uuid::Uuid::new_v4());

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &missing, Some(stranger_token.as_str()), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &uri, Some(stranger_token.as_str()), json!({"details": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &uri, Some(owner_token.as_str()), json!({"details": "updated", "company_name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &format!("{uri}/status"), Some(expert_token.as_str()), json!({"status": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &format!("{uri}/status"), Some(owner_token.as_str()), json!({"status": "terjadwal"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, &format!("{uri}/status"), Some(expert_token.as_str()), json!({"status": "terjadwal"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, get("/api/test/submissions/mine", Some(owner_token.as_str()))).await;
    assert_eq!(body[0]["status"], "terjadwal");
    assert_eq!(body[0]["details"], "updated");
    assert_eq!(body[0]["company_name"], "PT Satu");

    let delete = |token: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&router, delete(&stranger_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&router, delete(&expert_token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, delete(&expert_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_uuid_ids_are_not_found() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    let expert = app.ahli("E").await;
    let token = app.token_for(&expert).await;

    let (status, body) = send(
        &router,
        json_request(Method::PATCH, "/api/test/submissions/123", Some(token.as_str()), json!({"details": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, body) = send(
        &router,
        json_request(Method::PATCH, "/api/test/submissions/123/status", Some(token.as_str()), json!({"status": "terjadwal"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &router,
        json_request(Method::PATCH, "/api/test/submissions/123/status", Some(token.as_str()), json!({"status": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri("/api/test/submissions/123")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn bodiless_edit_changes_nothing() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    let owner = app.user("A").await;
    let id = app
        .state
        .submissions
        .submit(owner.user_id, fields("PT Satu"), None)
        .await
        .unwrap();
    let token = app.token_for(&owner).await;

    let request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/api/test/submissions/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, get("/api/test/submissions/mine", Some(token.as_str()))).await;
    assert_eq!(body[0]["company_name"], "PT Satu");
    assert_eq!(body[0]["details"], "periodic inspection");
    assert_eq!(body[0]["status"], "pending");
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    let owner = app.user("A").await;
    let expert = app.ahli("E").await;
    let id = app
        .state
        .submissions
        .submit(owner.user_id, fields("PT Satu"), None)
        .await
        .unwrap();
    let token = app.token_for(&expert).await;

    for uri in [
        format!("/api/test/submissions/{}", id),
        format!("/api/test/submissions/{}/status", id),
    ] {
        let request = Request::builder()
            .method(Method::PATCH)
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "request body is malformed");
    }

    let truncated = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"details\"\r\n\r\nhalf a val"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/test/submissions")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(truncated))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn status_change_notifies_online_owner() {
    let app = TestApp::new().await;
    let router = app_router(&app);
    let owner = app.user("Sari").await;
    let expert = app.ahli("Eko").await;
    assert_eq!(expert.role, Role::Ahli);
    let id = app
        .state
        .submissions
        .submit(owner.user_id, fields("PT Satu"), None)
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    app.state
        .presence
        .join(&owner.user_id.to_string(), ConnectionHandle::new(tx))
        .await;

    let token = app.token_for(&expert).await;
    let (status, _) = send(
        &router,
        json_request(
            Method::PATCH,
            &format!("/api/test/submissions/{}/status", id),
            Some(token.as_str()),
            json!({"status": "selesai_layak"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        rx.recv().await,
        Some(ServerMessage::StatusChanged {
            submission_id: id,
            status: "selesai_layak".to_string(),
        })
    );
}

#[tokio::test]
async fn second_join_survives_first_disconnect() {
    let app = TestApp::new().await;
    let (tx1, _rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    let first = ConnectionHandle::new(tx1);
    let second = ConnectionHandle::new(tx2);

    app.state.presence.join("42", first.clone()).await;
    app.state.presence.join("42", second.clone()).await;
    app.state.presence.on_disconnect(&first).await;

    let current = app.state.presence.lookup("42").await.unwrap();
    assert_eq!(current, second);
    assert_eq!(current.id, second.id);
}
