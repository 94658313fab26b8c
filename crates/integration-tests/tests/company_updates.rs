//! Company announcements, the dashboard, and service endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use taskie_integration_tests::{TestContext, task_body};
use taskie_server::middleware::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_q3_update_lifecycle() {
    let ctx = TestContext::new();
    let admin = ctx.admin("admin@example.com").await;
    let member = ctx.user("member@example.com").await;

    let posted = ctx
        .post(
            "/addUpdate",
            Some(&admin.token),
            json!({ "title": "Q3", "description": "meeting" }),
        )
        .await;
    assert_eq!(posted.status, StatusCode::CREATED);
    let id = posted.body["id"].as_i64().unwrap();

    let listed = ctx.get("/updates", None).await;
    assert!(
        listed
            .body
            .as_array()
            .unwrap()
            .iter()
            .any(|u| u["title"] == "Q3" && u["description"] == "meeting")
    );

    let path = format!("/deleteUpdate/{id}");
    let denied = ctx.delete(&path, Some(&member.token)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(ctx.count("/updates").await, 1);

    let removed = ctx.delete(&path, Some(&admin.token)).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(ctx.count("/updates").await, 0);
}

#[tokio::test]
async fn test_posting_updates_requires_admin() {
    let ctx = TestContext::new();
    let member = ctx.user("member@example.com").await;
    let body = json!({ "title": "Hi", "description": "there" });

    assert_eq!(
        ctx.post("/addUpdate", None, body.clone()).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        ctx.post("/addUpdate", Some(&member.token), body).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(ctx.count("/updates").await, 0);
}

#[tokio::test]
async fn test_update_validation_and_unknown_delete() {
    let ctx = TestContext::new();
    let admin = ctx.admin("admin@example.com").await;

    let response = ctx
        .post("/addUpdate", Some(&admin.token), json!({ "title": "Q3" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "description");

    let response = ctx.delete("/deleteUpdate/777", Some(&admin.token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_updates_listed_newest_first() {
    let ctx = TestContext::new();
    let admin = ctx.admin("admin@example.com").await;
    for title in ["Q1", "Q2", "Q3"] {
        ctx.post(
            "/addUpdate",
            Some(&admin.token),
            json!({ "title": title, "description": "review" }),
        )
        .await;
    }

    let listed = ctx.get("/updates", None).await;
    let titles: Vec<_> = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["title"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(titles, ["Q3", "Q2", "Q1"]);
}

#[tokio::test]
async fn test_dashboard_requires_auth_and_counts() {
    let ctx = TestContext::new();
    let admin = ctx.admin("admin@example.com").await;
    ctx.post("/createTask", Some(&admin.token), task_body("Audit"))
        .await;
    ctx.post(
        "/addUpdate",
        Some(&admin.token),
        json!({ "title": "Q3", "description": "meeting" }),
    )
    .await;

    assert_eq!(
        ctx.get("/dashboard", None).await.status,
        StatusCode::UNAUTHORIZED
    );

    let dashboard = ctx.get("/dashboard", Some(&admin.token)).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(dashboard.body["tasks"], 1);
    assert_eq!(dashboard.body["locations"], 0);
    assert_eq!(dashboard.body["updates"], 1);
    assert_eq!(dashboard.body["recent_updates"][0]["title"], "Q3");
}

#[tokio::test]
async fn test_service_endpoints() {
    let ctx = TestContext::new();

    let banner = ctx.get("//", None).await;
    assert_eq!(banner.status, StatusCode::OK);
    assert_eq!(banner.body["success"], true);

    let health = ctx.get("//health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");

    let ready = ctx.get("//health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert!(ready.headers.contains_key(REQUEST_ID_HEADER));
}
