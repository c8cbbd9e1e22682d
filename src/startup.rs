use std::time::Duration;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{MethodRouter, get},
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::configuration::{DatabaseSettings, Settings};
use crate::middleware::{SessionCookies, refresh_session};
use crate::routes::auth::{login_page, login_post, logout, register_page, register_post};
use crate::routes::dashboard::home;
use crate::routes::events::{
    add_event_page, add_event_post, delete_event, list_events, show_event, show_event_api,
    update_event_page, update_event_post,
};
use crate::services::{AuthService, EventService};
use crate::store::{EventRepository, SessionRepository, UserRepository};

/// Application context, built once at startup and handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub auth_service: AuthService,
    pub event_service: EventService,
    pub session_cookies: SessionCookies,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: &Settings) -> Self {
        let auth_service = AuthService::new(
            UserRepository::new(pool.clone()),
            SessionRepository::new(pool.clone()),
            settings.session.idle_timeout(),
        );
        let event_service = EventService::new(EventRepository::new(pool));
        Self {
            auth_service,
            event_service,
            session_cookies: SessionCookies::new(&settings.session),
        }
    }
}

pub async fn get_connection_pool(settings: &DatabaseSettings) -> Result<SqlitePool, sqlx::Error> {
    let options = settings.connect_options()?;
    let pool = if settings.is_in_memory() {
        // Every connection to `:memory:` is a separate database; keep exactly one alive.
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(2))
            .connect_with(options)
            .await?
    };
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Registers `handler` under `path` and under `path` with a trailing slash.
fn route_both(
    router: Router<AppState>,
    path: &str,
    handler: MethodRouter<AppState>,
) -> Router<AppState> {
    if path == "/" {
        return router.route(path, handler);
    }
    let path = path.trim_end_matches('/');
    router
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}

pub fn router(state: AppState) -> Router {
    let routes = [
        ("/login", get(login_page).post(login_post)),
        ("/register", get(register_page).post(register_post)),
        ("/add_event", get(add_event_page).post(add_event_post)),
        ("/list_events", get(list_events).post(list_events)),
        ("/api/event/{id}", get(show_event_api).post(show_event_api)),
        ("/event/{id}", get(show_event).post(show_event)),
        ("/event/{id}/delete", get(delete_event).post(delete_event)),
        ("/event/{id}/update", get(update_event_page).post(update_event_post)),
        ("/", get(home).post(home)),
        ("/logout", get(logout)),
    ];

    let router = routes
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| {
            route_both(router, path, handler)
        });

    router
        .nest_service("/assets", ServeDir::new("public"))
        .layer(from_fn_with_state(state.clone(), refresh_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let pool = get_connection_pool(&settings.database).await?;
        let state = AppState::new(pool, &settings);

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(&address).await?;
        let port = listener.local_addr()?.port();
        tracing::info!(%address, "Listening");

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
