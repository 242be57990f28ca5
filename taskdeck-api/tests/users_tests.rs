/// Integration tests for the user resource
///
/// Covers registration with the uniqueness pre-check, pagination, the
/// self-only ownership rule on PUT/DELETE, and the reactive conflict on
/// update.

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::json;

fn user_body(username: &str, email: &str, password: &str) -> serde_json::Value {
    json!({"username": username, "email": email, "password": password})
}

#[tokio::test]
async fn test_create_user_returns_public_projection() {
    let ctx = TestContext::new().await.unwrap();

    // Derive unique values from the seeded user to avoid cross-run collisions
    let username = format!("{}-new", ctx.user.username);
    let email = format!("new-{}", ctx.user.email);

    let (status, body) = ctx
        .send_json(
            "POST",
            "/users/",
            None,
            Some(user_body(&username, &email, "secret")),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["email"], email.as_str());
    assert!(body["id"].is_i64());

    // The password (and its hash) never appear in responses
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    // Registered users can log in with the plaintext they supplied
    let form = format!("username={}&password=secret", email);
    let (status, login) = ctx.send_form("/auth/token", &form).await;
    assert_eq!(status, StatusCode::OK);
    assert!(login["token_access"].is_string());

    taskdeck_shared::models::user::User::delete(&ctx.db, body["id"].as_i64().unwrap())
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_duplicate_username() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json(
            "POST",
            "/users/",
            None,
            Some(user_body(
                &ctx.user.username,
                "different@example.com",
                "secret",
            )),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Username already exists");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json(
            "POST",
            "/users/",
            None,
            Some(user_body("different-name", &ctx.user.email, "secret")),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Email already exists");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_duplicate_both_reports_username_first() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json(
            "POST",
            "/users/",
            None,
            Some(user_body(&ctx.user.username, &ctx.user.email, "secret")),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Username already exists");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_invalid_email() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send_json(
            "POST",
            "/users/",
            None,
            Some(user_body("someone", "not-an-email", "secret")),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_list_users_respects_limit() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json("GET", "/users/?limit=2", Some(&ctx.jwt_token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert!(users.len() <= 2);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_list_users_rejects_negative_offset() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send_json("GET", "/users/?offset=-1", Some(&ctx.jwt_token), None)
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_list_users_rejects_non_numeric_limit() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json("GET", "/users/?limit=ten", Some(&ctx.jwt_token), None)
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_read_user_by_id() {
    let ctx = TestContext::new().await.unwrap();

    let uri = format!("/users/{}", ctx.user.id);
    let (status, body) = ctx.send_json("GET", &uri, Some(&ctx.jwt_token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], ctx.user.id);
    assert_eq!(body["username"], ctx.user.username.as_str());
    assert_eq!(body["email"], ctx.user.email.as_str());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_read_user_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send_json("GET", "/users/0", Some(&ctx.jwt_token), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_own_user() {
    let ctx = TestContext::new().await.unwrap();

    let new_username = format!("{}-renamed", ctx.user.username);
    let uri = format!("/users/{}", ctx.user.id);
    let (status, body) = ctx
        .send_json(
            "PUT",
            &uri,
            Some(&ctx.jwt_token),
            Some(user_body(&new_username, &ctx.user.email, "new-password")),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], new_username.as_str());

    // The new password is live immediately
    let form = format!("username={}&password=new-password", ctx.user.email);
    let (status, _) = ctx.send_form("/auth/token", &form).await;
    assert_eq!(status, StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_other_user_is_forbidden() {
    let ctx = TestContext::new().await.unwrap();
    let (other, _) = ctx.create_other_user().await.unwrap();

    let uri = format!("/users/{}", other.id);
    let (status, body) = ctx
        .send_json(
            "PUT",
            &uri,
            Some(&ctx.jwt_token),
            Some(user_body("hijacked", "hijacked@example.com", "pw")),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Not enough permissions");

    taskdeck_shared::models::user::User::delete(&ctx.db, other.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_update_to_taken_email_conflicts() {
    let ctx = TestContext::new().await.unwrap();
    let (other, _) = ctx.create_other_user().await.unwrap();

    // Collision detected reactively at commit, not pre-checked
    let uri = format!("/users/{}", ctx.user.id);
    let (status, body) = ctx
        .send_json(
            "PUT",
            &uri,
            Some(&ctx.jwt_token),
            Some(user_body(&ctx.user.username, &other.email, "pw")),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Username or Email already exists");

    taskdeck_shared::models::user::User::delete(&ctx.db, other.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_other_user_is_forbidden() {
    let ctx = TestContext::new().await.unwrap();
    let (other, _) = ctx.create_other_user().await.unwrap();

    let uri = format!("/users/{}", other.id);
    let (status, body) = ctx.send_json("DELETE", &uri, Some(&ctx.jwt_token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Not enough permissions");

    taskdeck_shared::models::user::User::delete(&ctx.db, other.id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_own_user() {
    let ctx = TestContext::new().await.unwrap();
    let (other, other_token) = ctx.create_other_user().await.unwrap();

    let uri = format!("/users/{}", other.id);
    let (status, body) = ctx.send_json("DELETE", &uri, Some(&other_token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");

    // The record is gone
    let (status, _) = ctx.send_json("GET", &uri, Some(&ctx.jwt_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}
