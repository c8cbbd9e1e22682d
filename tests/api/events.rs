use axum::http::StatusCode;
use chrono::NaiveDateTime;
use serde_json::Value;

use crate::helpers::{TestApp, event_form, spawn_app};

fn id_of(event: &Value) -> i64 {
    event["id"].as_i64().unwrap()
}

#[tokio::test]
async fn create_then_list_returns_the_stored_event() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;

    let response = app.add_event(&event_form("RustConf", "conferencia")).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/add_event/");

    let events = app.list_events().await;
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event["name"], "RustConf");
    assert_eq!(event["category"], "conferencia");
    assert_eq!(event["place"], "Aula Magna");
    assert_eq!(event["address"], "Calle Mayor 1");
    assert_eq!(event["start_datetime"], "2024-06-01 09:00:00");
    assert_eq!(event["end_datetime"], "2024-06-01 17:30:00");
    assert_eq!(event["is_virtual"], false);

    let start = event["start_datetime"].as_str().unwrap();
    assert!(NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[tokio::test]
async fn creation_flash_is_shown_on_the_next_page() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;

    let page = app.server.get("/add_event/").await;
    assert_eq!(page.status_code(), StatusCode::OK);
    assert!(page.text().contains("Entry successfully created"));

    let again = app.server.get("/add_event/").await;
    assert!(!again.text().contains("Entry successfully created"));
}

#[tokio::test]
async fn checked_virtual_box_is_stored() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    let mut form = event_form("Webinar", "curso");
    form.push(("is_virtual", "y"));

    app.add_event(&form).await;

    let events = app.list_events().await;
    assert_eq!(events[0]["is_virtual"], true);
}

#[tokio::test]
async fn invalid_category_is_rejected() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;

    let response = app.add_event(&event_form("Party", "fiesta")).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.event_count().await, 0);
}

#[tokio::test]
async fn missing_fields_are_reported_per_field() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;

    let response = app
        .add_event(&[("name", ""), ("category", "curso")])
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("This field is required."));
    assert_eq!(app.event_count().await, 0);
}

#[tokio::test]
async fn list_only_shows_own_events() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;

    app.sign_in("bob@example.com").await;
    assert!(app.list_events().await.is_empty());

    app.add_event(&event_form("Taller", "curso")).await;
    let events = app.list_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "Taller");
}

#[tokio::test]
async fn api_returns_event_by_id() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;
    let id = id_of(&app.list_events().await[0]);

    let response = app.server.get(&format!("/api/event/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let event: Value = response.json();
    assert_eq!(id_of(&event), id);
    assert_eq!(event["name"], "RustConf");

    let detail = app.server.get(&format!("/event/{id}/")).await;
    assert_eq!(detail.status_code(), StatusCode::OK);
    assert!(detail.text().contains("RustConf"));
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let app = spawn_app().await;

    assert_eq!(
        app.server.get("/api/event/999").await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.server.get("/event/999").await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.server.get("/event/999/delete").await.status_code(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn deleted_event_is_gone() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;
    let id = id_of(&app.list_events().await[0]);

    let response = app.server.get(&format!("/event/{id}/delete")).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/");

    assert_eq!(
        app.server.get(&format!("/api/event/{id}")).await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.event_count().await, 0);
}

#[tokio::test]
async fn update_overwrites_fields_and_keeps_identity() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;
    let before = app.list_events().await.remove(0);
    let id = id_of(&before);

    let edit = app.server.get(&format!("/event/{id}/update")).await;
    assert_eq!(edit.status_code(), StatusCode::OK);
    assert!(edit.text().contains("2024-06-01T09:00"));

    let response = app
        .server
        .post(&format!("/event/{id}/update"))
        .form(&[
            ("name", "RustConf 2025"),
            ("category", "congreso"),
            ("place", "Palacio"),
            ("address", "Gran Via 2"),
            ("start_datetime", "2025-09-01T10:00"),
            ("end_datetime", "2025-09-03T18:00"),
            ("is_virtual", "y"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), format!("/event/{id}"));

    let after: Value = app.server.get(&format!("/api/event/{id}")).await.json();
    assert_eq!(after["id"], before["id"]);
    assert_eq!(after["user_id"], before["user_id"]);
    assert_eq!(after["name"], "RustConf 2025");
    assert_eq!(after["category"], "congreso");
    assert_eq!(after["place"], "Palacio");
    assert_eq!(after["address"], "Gran Via 2");
    assert_eq!(after["start_datetime"], "2025-09-01 10:00:00");
    assert_eq!(after["end_datetime"], "2025-09-03 18:00:00");
    assert_eq!(after["is_virtual"], true);

    let detail = app.server.get(&format!("/event/{id}")).await;
    assert!(detail.text().contains("Entry successfully updated"));
}

#[tokio::test]
async fn invalid_update_leaves_event_untouched() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;
    let before = app.list_events().await.remove(0);
    let id = id_of(&before);

    let response = app
        .server
        .post(&format!("/event/{id}/update"))
        .form(&event_form("RustConf", "fiesta"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let after: Value = app.server.get(&format!("/api/event/{id}")).await.json();
    assert_eq!(after, before);
}

#[tokio::test]
async fn events_of_other_users_cannot_be_updated() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;
    let id = id_of(&app.list_events().await[0]);

    app.sign_in("bob@example.com").await;
    let page = app.server.get(&format!("/event/{id}/update")).await;
    assert_eq!(page.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .post(&format!("/event/{id}/update"))
        .form(&event_form("Hijacked", "curso"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let event: Value = app.server.get(&format!("/api/event/{id}")).await.json();
    assert_eq!(event["name"], "RustConf");
}

#[tokio::test]
async fn anonymous_users_cannot_create_events() {
    let app = spawn_app().await;

    let response = app.add_event(&event_form("RustConf", "conferencia")).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login/");
    assert_eq!(app.event_count().await, 0);
}

#[tokio::test]
async fn non_numeric_ids_are_not_found() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;

    for path in [
        "/api/event/abc",
        "/event/abc",
        "/event/abc/delete",
        "/event/abc/update",
    ] {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn saving_the_prefilled_form_keeps_every_field() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    let mut form = event_form("RustConf", "seminario");
    form[4] = ("start_datetime", "2024-06-01 09:00:45");
    form[5] = ("end_datetime", "2024-06-01 17:30:05");
    app.add_event(&form).await;
    let before = app.list_events().await.remove(0);
    let id = id_of(&before);

    let edit = app.server.get(&format!("/event/{id}/update")).await;
    assert!(edit.text().contains(r#"value="2024-06-01T09:00:45""#));
    assert!(edit.text().contains(r#"value="2024-06-01T17:30:05""#));

    let response = app
        .server
        .post(&format!("/event/{id}/update"))
        .form(&[
            ("name", "RustConf"),
            ("category", "seminario"),
            ("place", "Aula Magna"),
            ("address", "Calle Mayor 1"),
            ("start_datetime", "2024-06-01T09:00:45"),
            ("end_datetime", "2024-06-01T17:30:05"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let after: Value = app.server.get(&format!("/api/event/{id}")).await.json();
    assert_eq!(after, before);
    assert_eq!(after["start_datetime"], "2024-06-01 09:00:45");
}

async fn reject_writes(app: &TestApp, on: &str) {
    sqlx::query(&format!(
        "CREATE TRIGGER reject_{on} BEFORE {on} ON event BEGIN SELECT RAISE(ABORT, 'store unavailable'); END"
    ))
    .execute(&app.pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn failed_insert_is_reported_on_the_form() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    reject_writes(&app, "INSERT").await;

    let response = app.add_event(&event_form("RustConf", "conferencia")).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let page = response.text();
    assert!(page.contains("Something went wrong!"));
    assert!(page.contains(r#"value="RustConf""#));
    assert_eq!(app.event_count().await, 0);
}

#[tokio::test]
async fn failed_update_is_reported_and_rolled_back() {
    let app = spawn_app().await;
    app.sign_in("ana@example.com").await;
    app.add_event(&event_form("RustConf", "conferencia")).await;
    let before = app.list_events().await.remove(0);
    let id = id_of(&before);
    reject_writes(&app, "UPDATE").await;

    let response = app
        .server
        .post(&format!("/event/{id}/update"))
        .form(&event_form("Renamed", "curso"))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("Something went wrong!"));

    let after: Value = app.server.get(&format!("/api/event/{id}")).await.json();
    assert_eq!(after, before);
}
