use crate::{
    errors::AppError,
    flash::{self, Flash},
    models::{CurrentUser, EventModel},
    routes::render,
    startup::AppState,
};
use askama::Template;
use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    title: &'static str,
    email: String,
    events: Vec<EventModel>,
    messages: Vec<Flash>,
}

pub async fn home(
    State(state): State<AppState>,
    user: CurrentUser, // Authenticated user
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    // 1. Fetch user events from DB
    let events = state.event_service.list_for(user.id).await?;

    // 2. Render Template
    let (jar, messages) = flash::take(jar);
    let template = HomeTemplate {
        title: "Home",
        email: user.email,
        events,
        messages,
    };
    Ok((jar, render(&template)?))
}
