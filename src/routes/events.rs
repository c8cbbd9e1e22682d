use askama::Template;
use axum::Form;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use super::render;
use crate::errors::AppError;
use crate::flash::{self, Flash};
use crate::forms::{EventForm, FormErrors, Submission};
use crate::models::{Category, CurrentUser, EventModel};
use crate::startup::AppState;

struct CategoryOption {
    value: &'static str,
    selected: &'static str,
}

#[derive(Template)]
#[template(path = "event_form.html")]
struct EventFormTemplate {
    title: &'static str,
    text: &'static str,
    btn_action: &'static str,
    action: String,
    form: EventForm,
    categories: Vec<CategoryOption>,
    virtual_checked: &'static str,
    errors: FormErrors,
    messages: Vec<Flash>,
}

impl EventFormTemplate {
    fn new(form: EventForm, errors: FormErrors, messages: Vec<Flash>) -> Self {
        let categories = Category::ALL
            .iter()
            .map(|c| CategoryOption {
                value: c.as_str(),
                selected: if form.category == c.as_str() { "selected" } else { "" },
            })
            .collect();
        let virtual_checked = if form.is_virtual() { "checked" } else { "" };
        Self {
            title: "Add event",
            text: "Add event",
            btn_action: "Add event",
            action: "/add_event/".into(),
            form,
            categories,
            virtual_checked,
            errors,
            messages,
        }
    }

    fn update(id: i64, form: EventForm, errors: FormErrors, messages: Vec<Flash>) -> Self {
        Self {
            title: "Update event",
            text: "Update event",
            btn_action: "Update event",
            action: format!("/event/{id}/update"),
            ..Self::new(form, errors, messages)
        }
    }
}

#[derive(Template)]
#[template(path = "event_detail.html")]
struct EventDetailTemplate {
    title: String,
    event: EventModel,
    messages: Vec<Flash>,
}

/// Event ids arrive as raw path segments; anything that is not a row id is missing.
fn event_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

pub async fn add_event_page(_user: CurrentUser, jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    let (jar, messages) = flash::take(jar);
    let page = EventFormTemplate::new(EventForm::default(), FormErrors::default(), messages);
    Ok((jar, render(&page)?))
}

#[instrument(name = "Web: Add event POST", skip(state, jar, form), fields(user_id = user.id))]
pub async fn add_event_post(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let fields = match form.validated() {
        Ok(fields) => fields,
        Err(errors) => {
            let page = EventFormTemplate::new(form, errors, Vec::new());
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response());
        }
    };

    match state.event_service.create(user.id, &fields).await {
        Ok(event) => {
            tracing::info!(event_id = event.id, "Event created");
            let jar = flash::push(jar, Flash::success("Entry successfully created"));
            Ok((jar, Redirect::to("/add_event/")).into_response())
        }
        Err(e) => {
            tracing::error!("Failed to create event: {:?}", e);
            let page = EventFormTemplate::new(form, FormErrors::default(), vec![e.flash()]);
            Ok((e.status(), render(&page)?).into_response())
        }
    }
}

#[instrument(name = "HTTP: List events", skip(state), fields(user_id = user.id))]
pub async fn list_events(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<EventModel>>, AppError> {
    let events = state.event_service.list_for(user.id).await?;
    Ok(Json(events))
}

#[instrument(name = "HTTP: Show event", skip(state))]
pub async fn show_event_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventModel>, AppError> {
    let event = state.event_service.get(event_id(&id)?).await?;
    Ok(Json(event))
}

pub async fn show_event(
    state: State<AppState>,
    id: Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let Json(event) = show_event_api(state, id).await?;
    let (jar, messages) = flash::take(jar);
    let page = EventDetailTemplate {
        title: event.name.clone(),
        event,
        messages,
    };
    Ok((jar, render(&page)?))
}

#[instrument(name = "Web: Delete event", skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = event_id(&id)?;
    state.event_service.delete(id).await?;
    tracing::info!(event_id = id, "Event deleted");
    Ok(Redirect::to("/"))
}

pub async fn update_event_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let id = event_id(&id)?;
    let event = state.event_service.get_owned(id, user.id).await?;
    let (jar, messages) = flash::take(jar);
    let page = EventFormTemplate::update(id, EventForm::from(&event), FormErrors::default(), messages);
    Ok((jar, render(&page)?))
}

#[instrument(name = "Web: Update event POST", skip(state, jar, form), fields(user_id = user.id))]
pub async fn update_event_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let id = event_id(&id)?;
    state.event_service.get_owned(id, user.id).await?;

    let fields = match form.validated() {
        Ok(fields) => fields,
        Err(errors) => {
            let page = EventFormTemplate::update(id, form, errors, Vec::new());
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response());
        }
    };

    match state.event_service.update(id, user.id, &fields).await {
        Ok(_) => {
            tracing::info!(event_id = id, "Event updated");
            let jar = flash::push(jar, Flash::success("Entry successfully updated"));
            Ok((jar, Redirect::to(&format!("/event/{id}"))).into_response())
        }
        Err(e) => {
            tracing::error!("Failed to update event: {:?}", e);
            let page = EventFormTemplate::update(id, form, FormErrors::default(), vec![e.flash()]);
            Ok((e.status(), render(&page)?).into_response())
        }
    }
}
