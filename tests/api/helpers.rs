use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use eventos::configuration::{ApplicationSettings, DatabaseSettings, SessionSettings, Settings};
use eventos::startup::{AppState, get_connection_pool, router};
use sqlx::SqlitePool;

pub const PASSWORD: &str = "s3cret-pass";

pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
}

pub async fn spawn_app() -> TestApp {
    let settings = Settings {
        database: DatabaseSettings {
            path: ":memory:".into(),
            create_if_missing: true,
            max_connections: 1,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        session: SessionSettings::default(),
    };
    let pool = get_connection_pool(&settings.database)
        .await
        .expect("Failed to open test database");
    let state = AppState::new(pool.clone(), &settings);
    let server = TestServer::builder()
        .save_cookies()
        .build(router(state))
        .expect("Failed to start test server");

    TestApp { server, pool }
}

pub fn event_form<'a>(name: &'a str, category: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("category", category),
        ("place", "Aula Magna"),
        ("address", "Calle Mayor 1"),
        ("start_datetime", "2024-06-01 09:00:00"),
        ("end_datetime", "2024-06-01T17:30"),
    ]
}

impl TestApp {
    pub async fn register(&self, email: &str, password: &str, confirm: &str) -> TestResponse {
        self.server
            .post("/register/")
            .form(&[("email", email), ("pwd", password), ("confirm_pwd", confirm)])
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/login/")
            .form(&[("email", email), ("pwd", password)])
            .await
    }

    /// Registers `email` and logs in as that user.
    pub async fn sign_in(&self, email: &str) {
        self.register(email, PASSWORD, PASSWORD).await;
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    }

    pub async fn add_event(&self, form: &[(&str, &str)]) -> TestResponse {
        self.server.post("/add_event/").form(form).await
    }

    pub async fn list_events(&self) -> Vec<serde_json::Value> {
        self.server.get("/list_events/").await.json()
    }

    pub async fn user_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "user""#)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn event_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
