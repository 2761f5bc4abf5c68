use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use keyward_core::{AuthCrypto, HashCost, Identity, SessionLifetime};
use keyward_server::{AppState, create_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const UNKNOWN_TOKEN: &str = "0123456789abcdef0123456789abcdef";

fn app() -> (Router, Identity) {
    let crypto = Arc::new(
        AuthCrypto::with_cost("test-pepper", "test-key", HashCost::minimal())
            .expect("crypto"),
    );
    let lifetime = SessionLifetime::from_secs(600).expect("lifetime");
    let identity = Identity::new(crypto, lifetime);
    (create_router(AppState::new(identity.clone())), identity)
}

struct Reply {
    status: StatusCode,
    token_header: Option<String>,
    body: Value,
}

async fn post(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Reply {
    let mut request =
        Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header("token", token);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let token_header = response
        .headers()
        .get("token")
        .map(|value| value.to_str().unwrap().to_owned());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        token_header,
        body,
    }
}

async fn create_user(app: &Router, username: &str, password: &str) -> Reply {
    let body = json!({ "username": username, "password": password });
    post(app, "/user/create", None, body).await
}

async fn create_role(app: &Router, role: &str) -> Reply {
    post(app, "/role/create", None, json!({ "role": role })).await
}

async fn add_role(app: &Router, username: &str, role: &str) -> Reply {
    let body = json!({ "username": username, "role": role });
    post(app, "/user/addRole", None, body).await
}

async fn request_token(app: &Router, username: &str, password: &str) -> Reply {
    let body = json!({ "username": username, "password": password });
    post(app, "/auth/token", None, body).await
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let reply = request_token(app, username, password).await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    reply.token_header.expect("token header")
}

async fn list_roles(app: &Router, token: &str) -> Reply {
    post(app, "/user/roles", Some(token), json!({})).await
}

async fn check_role(app: &Router, token: &str, role: &str) -> Reply {
    let body = json!({ "role": role });
    post(app, "/user/checkRole", Some(token), body).await
}

#[tokio::test]
async fn full_account_and_role_flow() {
    let (app, _) = app();

    let reply = create_user(&app, "Alice", "secret1").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "success");

    for role in ["ops", "dev"] {
        assert_eq!(create_role(&app, role).await.status, StatusCode::OK);
        assert_eq!(add_role(&app, "alice", role).await.status, StatusCode::OK);
    }

    let token = login(&app, "ALICE", "secret1").await;
    assert_eq!(token.len(), 32);

    let reply = list_roles(&app, &token).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"], json!(["dev", "ops"]));

    let reply = check_role(&app, &token, "OPS").await;
    assert_eq!(reply.body["data"], json!(true));

    create_role(&app, "audit").await;
    let reply = check_role(&app, &token, "audit").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"], json!(false));

    post(&app, "/role/delete", None, json!({ "role": "ops" })).await;
    let reply = list_roles(&app, &token).await;
    assert_eq!(reply.body["data"], json!(["dev"]));
    let reply = check_role(&app, &token, "ops").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = post(&app, "/auth/logout", Some(&token), json!({})).await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = list_roles(&app, &token).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "invalid token");
}

#[tokio::test]
async fn token_is_returned_in_header_and_body() {
    let (app, _) = app();
    create_user(&app, "bob", "secret1").await;

    let reply = request_token(&app, "bob", "secret1").await;
    let header = reply.token_header.expect("token header");
    assert_eq!(reply.body["data"]["token"], header);
    assert_eq!(reply.body["data"]["username"], "bob");
    assert!(reply.body["data"].get("account_id").is_none());
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let (app, _) = app();
    create_user(&app, "bob", "secret1").await;
    let token = login(&app, "bob", "secret1").await;

    let request = Request::post("/user/roles")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let (app, _) = app();
    create_user(&app, "carol", "secret1").await;

    let wrong_password = request_token(&app, "carol", "secret2").await;
    let unknown_user = request_token(&app, "nobody", "secret1").await;

    for reply in [wrong_password, unknown_user] {
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body["error"], "invalid username or password");
        assert!(reply.token_header.is_none());
    }
}

#[tokio::test]
async fn gate_reports_each_token_outcome() {
    let (app, _) = app();

    let missing = post(&app, "/user/roles", None, json!({})).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "token required");

    let malformed = list_roles(&app, "abc").await;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);
    assert_eq!(malformed.body["error"], "malformed token");

    let unknown = list_roles(&app, UNKNOWN_TOKEN).await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["error"], "invalid token");
}

#[tokio::test]
async fn deleting_the_account_invalidates_its_token() {
    let (app, identity) = app();
    create_user(&app, "dave", "secret1").await;
    let token = login(&app, "dave", "secret1").await;

    let body = json!({ "username": "dave" });
    let reply = post(&app, "/user/delete", None, body).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = list_roles(&app, &token).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "account no longer exists");

    let reply = list_roles(&app, &token).await;
    assert_eq!(reply.body["error"], "invalid token");
    assert!(identity.sessions().is_empty());
}

#[tokio::test]
async fn status_codes_follow_core_outcomes() {
    let (app, _) = app();

    let created = create_user(&app, "erin", "secret1").await;
    assert_eq!(created.status, StatusCode::OK);
    let duplicate = create_user(&app, " ERIN ", "secret1").await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let body = json!({ "username": "nobody" });
    let missing_user = post(&app, "/user/delete", None, body).await;
    assert_eq!(missing_user.status, StatusCode::NOT_FOUND);

    let missing_role = add_role(&app, "erin", "ghost").await;
    assert_eq!(missing_role.status, StatusCode::NOT_FOUND);

    create_role(&app, "ops").await;
    let duplicate_role = create_role(&app, "OPS").await;
    assert_eq!(duplicate_role.status, StatusCode::CONFLICT);
    let missing_account = add_role(&app, "nobody", "ops").await;
    assert_eq!(missing_account.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_the_core() {
    let (app, identity) = app();

    let short_name = create_user(&app, "ab", "secret1").await;
    assert_eq!(short_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_name.body["status"], "error");

    let short_password = create_user(&app, "frank", "pw").await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);

    let bad_role = create_role(&app, "r0le").await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);

    let body = json!({ "username": "frank" });
    let missing_field = post(&app, "/user/create", None, body).await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_field.body["status"], "error");

    assert!(identity.credentials().is_empty());
    assert!(identity.roles().is_empty());
}
