//! Integration tests for campaign CRUD, ownership rules and participation.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tavern::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();

    let state = tavern::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    tavern::api::router(state)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref());
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn send_empty(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register a user and log them in, returning (user id, bearer token).
async fn save_and_authorize(app: &Router, email: &str) -> (i64, String) {
    let (status, user) = send_json(
        app,
        "POST",
        "/api/users/register",
        None,
        serde_json::json!({ "email": email, "password": "spiderPass00" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {user}");

    let (status, token) = send_json(
        app,
        "POST",
        "/api/users/login",
        None,
        serde_json::json!({ "email": email, "password": "spiderPass00" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {token}");

    (
        user["id"].as_i64().unwrap(),
        token["token"].as_str().unwrap().to_string(),
    )
}

async fn create_campaign(app: &Router, token: &str, name: &str) -> serde_json::Value {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/campaigns",
        Some(token),
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "campaign creation failed: {body}");
    body
}

#[tokio::test]
async fn creation_with_full_content() {
    let app = spawn_app().await;
    let (host_id, token) = save_and_authorize(&app, "spiderman@email.example").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token),
        serde_json::json!({ "name": "Glorious adventure 3", "accessibilityInt": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].as_i64().unwrap() >= 1);
    assert_eq!(body["name"], "Glorious adventure 3");
    assert_eq!(body["hostId"].as_i64().unwrap(), host_id);
    assert_eq!(body["accessibilityInt"], 1);

    let started = chrono::DateTime::parse_from_rfc3339(body["startDate"].as_str().unwrap())
        .expect("startDate must be RFC 3339");
    assert!(started < chrono::Utc::now());
}

#[tokio::test]
async fn creation_defaults_to_private() {
    let app = spawn_app().await;
    let (_, token) = save_and_authorize(&app, "gm@table.example").await;

    let body = create_campaign(&app, &token, "Tentacle clash XII").await;
    assert_eq!(body["accessibilityInt"], 0);
}

#[tokio::test]
async fn creation_forces_host_to_caller() {
    let app = spawn_app().await;
    let (host_id, token) = save_and_authorize(&app, "host@table.example").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token),
        serde_json::json!({ "name": "Stolen throne", "hostId": 12345 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hostId"].as_i64().unwrap(), host_id);
}

#[tokio::test]
async fn creation_unauthorized() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/campaigns",
        None,
        serde_json::json!({ "name": "Glorious adventure 4" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
    assert_eq!(body["reason"], "User has not been authenticated.");
}

#[tokio::test]
async fn creation_with_invalid_content() {
    let app = spawn_app().await;
    let (_, token) = save_and_authorize(&app, "picky@table.example").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token),
        serde_json::json!({ "name": "&&%#($#0#)0  ", "accessibilityInt": 888 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    let violations = body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0]["field"], "name");
    assert_eq!(violations[1]["field"], "accessibilityInt");
}

#[tokio::test]
async fn creation_without_name() {
    let app = spawn_app().await;
    let (_, token) = save_and_authorize(&app, "nameless@table.example").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token),
        serde_json::json!({ "accessibilityInt": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "Campaign name is missing");
}

#[tokio::test]
async fn get_campaign_is_public() {
    let app = spawn_app().await;
    let (host_id, token) = save_and_authorize(&app, "public@table.example").await;
    let created = create_campaign(&app, &token, "Open table night").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_empty(&app, "GET", &format!("/api/campaigns/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Open table night");
    assert_eq!(body["hostId"].as_i64().unwrap(), host_id);

    let (status, body) = send_empty(&app, "GET", "/api/campaigns/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "No Campaign with specified id");
}

#[tokio::test]
async fn update_by_host_applies_partial_patch() {
    let app = spawn_app().await;
    let (_, token) = save_and_authorize(&app, "editor@table.example").await;
    let created = create_campaign(&app, &token, "Working title").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/campaigns/{id}"),
        Some(&token),
        serde_json::json!({ "name": "Final title" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Final title");
    assert_eq!(body["hostId"], created["hostId"]);
    assert_eq!(body["accessibilityInt"], created["accessibilityInt"]);

    let (_, fetched) = send_empty(&app, "GET", &format!("/api/campaigns/{id}"), None).await;
    assert_eq!(fetched["name"], "Final title");
}

#[tokio::test]
async fn update_rejects_empty_patch() {
    let app = spawn_app().await;
    let (_, token) = save_and_authorize(&app, "empty@table.example").await;
    let created = create_campaign(&app, &token, "Quiet table").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/campaigns/{id}"),
        Some(&token),
        serde_json::json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "No updatable Campaign fields provided");
}

#[tokio::test]
async fn update_by_non_host_is_forbidden() {
    let app = spawn_app().await;
    let (_, host_token) = save_and_authorize(&app, "owner@table.example").await;
    let (_, other_token) = save_and_authorize(&app, "intruder@table.example").await;
    let created = create_campaign(&app, &host_token, "Guarded gate").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/campaigns/{id}"),
        Some(&other_token),
        serde_json::json!({ "name": "Hijacked" }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "User is not able to modify specified Campaign");

    let (_, fetched) = send_empty(&app, "GET", &format!("/api/campaigns/{id}"), None).await;
    assert_eq!(fetched["name"], "Guarded gate");
}

#[tokio::test]
async fn update_unknown_campaign_is_not_found() {
    let app = spawn_app().await;
    let (_, token) = save_and_authorize(&app, "lost@table.example").await;

    let (status, body) = send_json(
        &app,
        "PUT",
        "/api/campaigns/424242",
        Some(&token),
        serde_json::json!({ "name": "Ghost town" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "No Campaign with specified id");
}

#[tokio::test]
async fn host_change_requires_existing_target() {
    let app = spawn_app().await;
    let (host_id, token) = save_and_authorize(&app, "current@table.example").await;
    let created = create_campaign(&app, &token, "Succession crisis").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/campaigns/{id}"),
        Some(&token),
        serde_json::json!({ "hostId": 424242 }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "User to become Campaign Host not found");

    // stored host must be unchanged after the failed transfer
    let (_, fetched) = send_empty(&app, "GET", &format!("/api/campaigns/{id}"), None).await;
    assert_eq!(fetched["hostId"].as_i64().unwrap(), host_id);
}

#[tokio::test]
async fn host_change_hands_over_control() {
    let app = spawn_app().await;
    let (_, old_token) = save_and_authorize(&app, "old-host@table.example").await;
    let (new_host_id, _) = save_and_authorize(&app, "new-host@table.example").await;
    let created = create_campaign(&app, &old_token, "Handover").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/campaigns/{id}"),
        Some(&old_token),
        serde_json::json!({ "hostId": new_host_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hostId"].as_i64().unwrap(), new_host_id);

    // the previous host lost their mutation rights
    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/campaigns/{id}"),
        Some(&old_token),
        serde_json::json!({ "name": "Too late" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_is_host_only() {
    let app = spawn_app().await;
    let (_, host_token) = save_and_authorize(&app, "keeper@table.example").await;
    let (_, other_token) = save_and_authorize(&app, "vandal@table.example").await;
    let created = create_campaign(&app, &host_token, "Doomed campaign").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) =
        send_empty(&app, "DELETE", &format!("/api/campaigns/{id}"), Some(&other_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "User is not able to delete specified Campaign");

    let (status, _) = send_empty(&app, "DELETE", &format!("/api/campaigns/{id}"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        send_empty(&app, "DELETE", &format!("/api/campaigns/{id}"), Some(&host_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_empty(&app, "GET", &format!("/api/campaigns/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        send_empty(&app, "DELETE", "/api/campaigns/424242", Some(&host_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn participants_join_and_leave() {
    let app = spawn_app().await;
    let (host_id, host_token) = save_and_authorize(&app, "dm@table.example").await;
    let (player_id, player_token) = save_and_authorize(&app, "player@table.example").await;
    let created = create_campaign(&app, &host_token, "Night raid").await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send_empty(
        &app,
        "POST",
        &format!("/api/campaigns/{id}/participants"),
        Some(&player_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // joining twice is a no-op
    let (status, _) = send_empty(
        &app,
        "POST",
        &format!("/api/campaigns/{id}/participants"),
        Some(&player_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_empty(
        &app,
        "GET",
        &format!("/api/campaigns/{id}/participants"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let participants = body.as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["id"].as_i64().unwrap(), player_id);
    // hosting does not imply participation
    assert!(
        participants
            .iter()
            .all(|p| p["id"].as_i64().unwrap() != host_id)
    );

    let (status, body) = send_empty(
        &app,
        "GET",
        &format!("/api/users/{player_id}/participations"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"].as_i64().unwrap(), id);

    let (status, _) = send_empty(
        &app,
        "DELETE",
        &format!("/api/campaigns/{id}/participants"),
        Some(&player_token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send_empty(
        &app,
        "GET",
        &format!("/api/campaigns/{id}/participants"),
        None,
    )
    .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn participation_routes_check_campaign_existence() {
    let app = spawn_app().await;
    let (_, token) = save_and_authorize(&app, "joiner@table.example").await;

    let (status, body) =
        send_empty(&app, "POST", "/api/campaigns/424242/participants", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "No Campaign with specified id");

    let (status, _) = send_empty(&app, "GET", "/api/campaigns/424242/participants", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hosted_campaigns_are_listed_per_user() {
    let app = spawn_app().await;
    let (host_id, token) = save_and_authorize(&app, "prolific@table.example").await;
    create_campaign(&app, &token, "First table").await;
    create_campaign(&app, &token, "Second table").await;

    let (status, body) =
        send_empty(&app, "GET", &format!("/api/users/{host_id}/campaigns"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send_empty(&app, "GET", "/api/users/424242/campaigns", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_campaign_cascades_participant_rows() {
    let app = spawn_app().await;
    let (_, host_token) = save_and_authorize(&app, "sweeper@table.example").await;
    let (player_id, player_token) = save_and_authorize(&app, "swept@table.example").await;
    let created = create_campaign(&app, &host_token, "Short lived").await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send_empty(
        &app,
        "POST",
        &format!("/api/campaigns/{id}/participants"),
        Some(&player_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        send_empty(&app, "DELETE", &format!("/api/campaigns/{id}"), Some(&host_token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send_empty(
        &app,
        "GET",
        &format!("/api/users/{player_id}/participations"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}
