use axum::http::StatusCode;

use crate::helpers::{PASSWORD, spawn_app};

#[tokio::test]
async fn register_creates_account_and_redirects_to_login() {
    let app = spawn_app().await;

    let response = app.register("ana@example.com", PASSWORD, PASSWORD).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login/");
    assert_eq!(app.user_count().await, 1);

    let page = app.server.get("/login/").await;
    assert!(page.text().contains("Account successfully created"));
}

#[tokio::test]
async fn stored_password_is_never_the_plaintext() {
    let app = spawn_app().await;
    app.register("ana@example.com", PASSWORD, PASSWORD).await;

    let stored: String = sqlx::query_scalar(r#"SELECT pwd FROM "user" WHERE email = ?"#)
        .bind("ana@example.com")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    assert_ne!(stored, PASSWORD);
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = spawn_app().await;
    app.register("ana@example.com", PASSWORD, PASSWORD).await;

    let response = app.register("ana@example.com", "another-pass", "another-pass").await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert!(response.text().contains("User already exists!"));
    assert_eq!(app.user_count().await, 1);
}

#[tokio::test]
async fn mismatched_confirmation_creates_nothing() {
    let app = spawn_app().await;

    let response = app.register("ana@example.com", "secret1", "secret2").await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("Passwords must match !"));
    assert_eq!(app.user_count().await, 0);
}

#[tokio::test]
async fn login_grants_access_to_protected_routes() {
    let app = spawn_app().await;
    app.register("ana@example.com", PASSWORD, PASSWORD).await;

    let response = app.login("ana@example.com", PASSWORD).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");

    let home = app.server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::OK);
    assert!(home.text().contains("ana@example.com"));
}

#[tokio::test]
async fn wrong_password_does_not_log_in() {
    let app = spawn_app().await;
    app.register("ana@example.com", PASSWORD, PASSWORD).await;

    let response = app.login("ana@example.com", "not-the-password").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(response.text().contains("Invalid Username or password!"));

    let home = app.server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(home.header("location"), "/login/");
}

#[tokio::test]
async fn unknown_email_gets_the_same_answer_as_a_wrong_password() {
    let app = spawn_app().await;

    let response = app.login("nobody@example.com", PASSWORD).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(response.text().contains("Invalid Username or password!"));
}

#[tokio::test]
async fn anonymous_requests_are_sent_to_login() {
    let app = spawn_app().await;

    for path in ["/", "/list_events/", "/add_event/", "/logout"] {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.header("location"), "/login/", "{path}");
    }
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = spawn_app().await;
    app.register("ana@example.com", PASSWORD, PASSWORD).await;
    let login = app.login("ana@example.com", PASSWORD).await;
    let session = login.cookie("session");

    let response = app.server.get("/logout").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login/");

    let home = app.server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::SEE_OTHER);

    // Replaying the old token does not bring the session back.
    let replay = app
        .server
        .get("/")
        .clear_cookies()
        .add_cookie(session)
        .await;
    assert_eq!(replay.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(replay.header("location"), "/login/");
}

#[tokio::test]
async fn idle_session_expires() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;

    sqlx::query("UPDATE session SET expires_at = ?")
        .bind(chrono::Utc::now().timestamp() - 1)
        .execute(&app.pool)
        .await
        .unwrap();

    let home = app.server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(home.header("location"), "/login/");
}

#[tokio::test]
async fn each_request_slides_the_expiry_forward() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;

    let soon = chrono::Utc::now().timestamp() + 60;
    sqlx::query("UPDATE session SET expires_at = ?")
        .bind(soon)
        .execute(&app.pool)
        .await
        .unwrap();

    let home = app.server.get("/").await;
    assert_eq!(home.status_code(), StatusCode::OK);

    let expires_at: i64 = sqlx::query_scalar("SELECT expires_at FROM session")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(expires_at >= soon + 25 * 60);
}

#[tokio::test]
async fn routes_answer_with_and_without_trailing_slash() {
    let app = spawn_app().await;

    assert_eq!(app.server.get("/login").await.status_code(), StatusCode::OK);
    assert_eq!(app.server.get("/login/").await.status_code(), StatusCode::OK);
    assert_eq!(app.server.get("/register").await.status_code(), StatusCode::OK);
}
