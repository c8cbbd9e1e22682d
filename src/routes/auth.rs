use askama::Template;
use axum::Form;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use super::{LOGIN_PATH, render};
use crate::errors::AppError;
use crate::flash::{self, Flash};
use crate::forms::{FormErrors, LoginForm, RegisterForm, Submission};
use crate::models::user::CurrentUser;
use crate::startup::AppState;

#[derive(Template)]
#[template(path = "auth.html")]
struct AuthTemplate {
    title: &'static str,
    text: &'static str,
    btn_action: &'static str,
    action: &'static str,
    confirm: bool,
    email: String,
    errors: FormErrors,
    messages: Vec<Flash>,
}

impl AuthTemplate {
    fn login(email: String, errors: FormErrors, messages: Vec<Flash>) -> Self {
        Self {
            title: "Login",
            text: "Login",
            btn_action: "Login",
            action: LOGIN_PATH,
            confirm: false,
            email,
            errors,
            messages,
        }
    }

    fn register(email: String, errors: FormErrors, messages: Vec<Flash>) -> Self {
        Self {
            title: "Register",
            text: "Create account",
            btn_action: "Register account",
            action: "/register/",
            confirm: true,
            email,
            errors,
            messages,
        }
    }
}

pub async fn login_page(jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    let (jar, messages) = flash::take(jar);
    let page = AuthTemplate::login(String::new(), FormErrors::default(), messages);
    Ok((jar, render(&page)?))
}

pub async fn register_page(jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    let (jar, messages) = flash::take(jar);
    let page = AuthTemplate::register(String::new(), FormErrors::default(), messages);
    Ok((jar, render(&page)?))
}

#[instrument(name = "Web: Login POST", skip(state, jar, form))]
pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let credentials = match form.validated() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = AuthTemplate::login(form.email, errors, Vec::new());
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response());
        }
    };

    match state.auth_service.login(&credentials).await {
        Ok(token) => {
            let jar = jar.add(state.session_cookies.issue(token));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(e) => {
            let page = AuthTemplate::login(form.email, FormErrors::default(), vec![e.flash()]);
            Ok((e.status(), render(&page)?).into_response())
        }
    }
}

#[instrument(name = "Web: Register POST", skip(state, jar, form))]
pub async fn register_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let credentials = match form.validated() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = AuthTemplate::register(form.email, errors, Vec::new());
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)?).into_response());
        }
    };

    match state.auth_service.register(&credentials).await {
        Ok(_) => {
            let jar = flash::push(jar, Flash::success("Account successfully created"));
            Ok((jar, Redirect::to(LOGIN_PATH)).into_response())
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            let page = AuthTemplate::register(form.email, FormErrors::default(), vec![e.flash()]);
            Ok((e.status(), render(&page)?).into_response())
        }
    }
}

#[instrument(name = "Web: Logout GET", skip(state, jar), fields(user_id = user.id))]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let cookies = &state.session_cookies;
    if let Some(token) = cookies.token(&jar) {
        state.auth_service.logout(&token).await?;
    }
    let updated_jar = jar.remove(cookies.clear());
    Ok((updated_jar, Redirect::to(LOGIN_PATH)))
}

/// Login-required gate: resolves the identity the session middleware attached
/// to the request, or sends the browser to the login page.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            tracing::info!(path = %parts.uri.path(), "Anonymous request to protected route");
            Redirect::to(LOGIN_PATH)
        })
    }
}
