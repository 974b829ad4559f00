/// Integration tests for the TrackDesk API
///
/// These tests verify the full system works end-to-end:
/// - Registration with the age and consent rules
/// - Token obtain/refresh flow
/// - Membership and authorship enforcement across projects, issues, comments
/// - Contributor management (author-only, duplicate detection)
/// - Assignee validation
///
/// They require a running PostgreSQL database (DATABASE_URL) and a
/// JWT_SECRET of at least 32 characters in the environment.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use common::{send, TestContext, TEST_PASSWORD};
use serde_json::json;
use trackdesk_shared::models::contributor::Contributor;
use trackdesk_shared::models::user::User;
use uuid::Uuid;

/// Test registration followed by login with the same credentials
#[tokio::test]
async fn test_register_and_obtain_token() {
    let ctx = TestContext::new().await.unwrap();

    let username = format!("alice-{}", Uuid::new_v4());
    let (status, body) = send(
        &ctx,
        "POST",
        "/v1/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": TEST_PASSWORD,
            "birthdate": "1990-06-15"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

    // The stored hash must never appear on the wire.
    assert!(body.get("password_hash").is_none());
    // Consent flags default to true for an adult.
    assert_eq!(body["can_be_contacted"], true);
    assert_eq!(body["can_be_shared"], true);

    let (status, tokens) = send(
        &ctx,
        "POST",
        "/v1/auth/token",
        None,
        Some(json!({ "username": username, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(tokens["access"].is_string());
    assert!(tokens["refresh"].is_string());

    // Wrong password and unknown username answer identically.
    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/auth/token",
        None,
        Some(json!({ "username": username, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, refreshed) = send(
        &ctx,
        "POST",
        "/v1/auth/token/refresh",
        None,
        Some(json!({ "refresh": tokens["refresh"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed["access"].is_string());

    let user = User::find_by_username(&ctx.db, &username)
        .await
        .unwrap()
        .unwrap();
    ctx.cleanup_user(&user).await.unwrap();
}

/// Test that under-age registration is rejected with a field-scoped error
#[tokio::test]
async fn test_register_under_minimum_age() {
    let ctx = TestContext::new().await.unwrap();

    let today = Utc::now().date_naive();
    let fourteen_years_ago = today.with_year(today.year() - 14).unwrap();

    let username = format!("kid-{}", Uuid::new_v4());
    let (status, body) = send(
        &ctx,
        "POST",
        "/v1/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": TEST_PASSWORD,
            "birthdate": fourteen_years_ago.to_string()
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "birthdate");

    // A birthdate in the future is rejected the same way.
    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/users",
        None,
        Some(json!({
            "username": format!("future-{}", Uuid::new_v4()),
            "email": format!("future-{}@example.com", Uuid::new_v4()),
            "password": TEST_PASSWORD,
            "birthdate": "2999-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

/// Test that missing or invalid tokens answer 401, without leaking
/// whether the addressed resource exists
#[tokio::test]
async fn test_unauthenticated_requests_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = send(&ctx, "GET", "/v1/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Same answer for an id that exists and one that cannot.
    let (status, _) = send(&ctx, "GET", "/v1/projects/999999999", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/projects",
        Some("not-a-jwt"),
        Some(json!({ "name": "x", "kind": "backend" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Test project creation, author auto-enrollment, and membership scoping
#[tokio::test]
async fn test_project_visibility_scoped_to_members() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let alice_token = ctx.token_for(&alice).unwrap();
    let bob_token = ctx.token_for(&bob).unwrap();

    let (status, project) = send(
        &ctx,
        "POST",
        "/v1/projects",
        Some(&alice_token),
        Some(json!({
            "name": format!("Alpha {}", Uuid::new_v4()),
            "description": "visibility test",
            "kind": "backend"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", project);
    let project_id = project["id"].as_i64().unwrap();
    assert_eq!(project["author_id"].as_i64().unwrap(), alice.id);

    // Creation enrolled the author without a separate call.
    assert!(Contributor::is_member(&ctx.db, project_id, alice.id)
        .await
        .unwrap());

    let (status, list) = send(&ctx, "GET", "/v1/projects", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"].as_i64() == Some(project_id)));

    // Bob is not a member: the project is absent from his list and direct
    // access is forbidden, read included.
    let (status, list) = send(&ctx, "GET", "/v1/projects", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());

    let uri = format!("/v1/projects/{}", project_id);
    let (status, _) = send(&ctx, "GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup_user(&alice).await.unwrap();
    ctx.cleanup_user(&bob).await.unwrap();
}

/// Test contributor management: author-only mutation and duplicate detection
#[tokio::test]
async fn test_contributor_management() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let carol = ctx.create_user("carol").await.unwrap();
    let alice_token = ctx.token_for(&alice).unwrap();
    let bob_token = ctx.token_for(&bob).unwrap();

    let project = ctx.create_project(&alice).await.unwrap();

    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/contributors",
        Some(&alice_token),
        Some(json!({ "project": project.id, "user": bob.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Adding the same pair again is a conflict, not a second row.
    let (status, body) = send(
        &ctx,
        "POST",
        "/v1/contributors",
        Some(&alice_token),
        Some(json!({ "project": project.id, "user": bob.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "expected 409: {}", body);

    // Bob is a plain contributor, not the project author; he cannot extend
    // the membership.
    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/contributors",
        Some(&bob_token),
        Some(json!({ "project": project.id, "user": carol.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // But membership now grants him read access.
    let uri = format!("/v1/projects/{}", project.id);
    let (status, _) = send(&ctx, "GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, contributors) = send(
        &ctx,
        "GET",
        &format!("/v1/contributors?project={}", project.id),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contributors.as_array().unwrap().len(), 2);

    // Adding an unknown user is not-found, not a silent success.
    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/contributors",
        Some(&alice_token),
        Some(json!({ "project": project.id, "user": 999999999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &ctx,
        "DELETE",
        &format!("/v1/contributors/{}/{}", project.id, bob.id),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&ctx, "GET", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup_user(&alice).await.unwrap();
    ctx.cleanup_user(&bob).await.unwrap();
    ctx.cleanup_user(&carol).await.unwrap();
}

/// Test issue creation, assignee validation, and authorship enforcement
#[tokio::test]
async fn test_issue_authorization() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let carol = ctx.create_user("carol").await.unwrap();
    let alice_token = ctx.token_for(&alice).unwrap();
    let bob_token = ctx.token_for(&bob).unwrap();
    let carol_token = ctx.token_for(&carol).unwrap();

    let project = ctx.create_project(&alice).await.unwrap();
    Contributor::add(&ctx.db, project.id, bob.id).await.unwrap();

    // Assigning to a non-contributor fails on the assign_to field.
    let (status, body) = send(
        &ctx,
        "POST",
        "/v1/issues",
        Some(&bob_token),
        Some(json!({
            "project": project.id,
            "assign_to": carol.id,
            "name": "Broken build"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "assign_to");

    let (status, issue) = send(
        &ctx,
        "POST",
        "/v1/issues",
        Some(&bob_token),
        Some(json!({
            "project": project.id,
            "assign_to": alice.id,
            "name": "Broken build",
            "priority": "high",
            "tag": "bug"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", issue);
    let issue_id = issue["id"].as_i64().unwrap();
    assert_eq!(issue["status"], "to-do");
    assert_eq!(issue["priority"], "high");
    assert_eq!(issue["tag"], "bug");

    // Referencing an unknown project is not-found, before any insert.
    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/issues",
        Some(&bob_token),
        Some(json!({
            "project": 999999999,
            "assign_to": bob.id,
            "name": "Orphan"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/v1/issues/{}", issue_id);

    // Alice is a contributor so she reads the issue, but she is not its
    // author so she cannot mutate it.
    let (status, _) = send(&ctx, "GET", &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(&alice_token),
        Some(json!({ "status": "finished" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&ctx, "DELETE", &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Carol is no contributor at all; even reading is forbidden.
    let (status, _) = send(&ctx, "GET", &uri, Some(&carol_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Bob authored the issue: update and delete are his.
    let (status, updated) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(&bob_token),
        Some(json!({ "status": "in-progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "in-progress");

    // Reassigning to a non-contributor is rejected on update too.
    let (status, _) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(&bob_token),
        Some(json!({ "assign_to": carol.id })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&ctx, "DELETE", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    ctx.cleanup_user(&alice).await.unwrap();
    ctx.cleanup_user(&bob).await.unwrap();
    ctx.cleanup_user(&carol).await.unwrap();
}

/// Test comment creation and authorship enforcement two levels deep
#[tokio::test]
async fn test_comment_authorization() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let carol = ctx.create_user("carol").await.unwrap();
    let alice_token = ctx.token_for(&alice).unwrap();
    let bob_token = ctx.token_for(&bob).unwrap();
    let carol_token = ctx.token_for(&carol).unwrap();

    let project = ctx.create_project(&alice).await.unwrap();
    Contributor::add(&ctx.db, project.id, bob.id).await.unwrap();

    let (status, issue) = send(
        &ctx,
        "POST",
        "/v1/issues",
        Some(&alice_token),
        Some(json!({
            "project": project.id,
            "assign_to": alice.id,
            "name": "Discussion thread"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let issue_id = issue["id"].as_i64().unwrap();

    // Bob comments on Alice's issue; membership is what matters.
    let (status, comment) = send(
        &ctx,
        "POST",
        "/v1/comments",
        Some(&bob_token),
        Some(json!({ "issue": issue_id, "description": "Reproduced on main" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", comment);
    let comment_id = comment["id"].as_i64().unwrap();
    assert!(comment["uuid"].is_string());

    // Commenting on an unknown issue is not-found.
    let (status, _) = send(
        &ctx,
        "POST",
        "/v1/comments",
        Some(&bob_token),
        Some(json!({ "issue": 999999999, "description": "lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/v1/comments/{}", comment_id);

    // Membership resolves through the issue to the project: Alice reads,
    // Carol does not, anonymous is 401.
    let (status, _) = send(&ctx, "GET", &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&ctx, "GET", &uri, Some(&carol_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&ctx, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Only the comment's author edits it, even against the project author.
    let (status, _) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(&alice_token),
        Some(json!({ "description": "edited by someone else" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(&bob_token),
        Some(json!({ "description": "Reproduced on main and develop" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "Reproduced on main and develop");

    let (status, _) = send(&ctx, "DELETE", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    ctx.cleanup_user(&alice).await.unwrap();
    ctx.cleanup_user(&bob).await.unwrap();
    ctx.cleanup_user(&carol).await.unwrap();
}

/// Test that account mutation is restricted to the account owner
#[tokio::test]
async fn test_account_self_service_only() {
    let ctx = TestContext::new().await.unwrap();
    let alice = ctx.create_user("alice").await.unwrap();
    let bob = ctx.create_user("bob").await.unwrap();
    let alice_token = ctx.token_for(&alice).unwrap();
    let bob_token = ctx.token_for(&bob).unwrap();

    let uri = format!("/v1/users/{}", alice.id);

    let (status, _) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(&bob_token),
        Some(json!({ "can_be_contacted": false })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &ctx,
        "PATCH",
        &uri,
        Some(&alice_token),
        Some(json!({ "can_be_contacted": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["can_be_contacted"], false);

    let (status, _) = send(&ctx, "DELETE", &uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&ctx, "DELETE", &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Tokens for the deleted account stop working at the next lookup.
    let (status, _) = send(&ctx, "GET", &uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup_user(&bob).await.unwrap();
}
