//! Per-request session handling.
//!
//! Every request passes through [`refresh_session`] before reaching its handler:
//! a live session cookie is resolved to a [`CurrentUser`](crate::models::CurrentUser)
//! stored in the request extensions, its server-side expiry slides forward and
//! the cookie is re-issued with a fresh `Max-Age`. Stale cookies are cleared.

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::configuration::SessionSettings;
use crate::startup::AppState;

/// Builds the cookies that carry a session token.
#[derive(Clone, Debug)]
pub struct SessionCookies {
    name: String,
    secure: bool,
    max_age: chrono::Duration,
}

impl SessionCookies {
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            name: settings.cookie_name.clone(),
            secure: settings.secure_cookie,
            max_age: settings.idle_timeout(),
        }
    }

    pub fn token(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(cookie_duration(self.max_age))
            .build()
    }

    pub fn clear(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }

    /// Whether the handler already set or cleared the session cookie itself.
    fn written_by(&self, response: &Response) -> bool {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| {
                v.strip_prefix(self.name.as_str())
                    .is_some_and(|rest| rest.starts_with('='))
            })
    }
}

fn cookie_duration(d: chrono::Duration) -> time::Duration {
    time::Duration::seconds(d.num_seconds())
}

pub async fn refresh_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let cookies = &state.session_cookies;
    let Some(token) = cookies.token(&jar) else {
        return next.run(req).await;
    };

    let outcome = match state.auth_service.resolve(&token).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = user.id, "Session resolved");
            req.extensions_mut().insert(user);
            Some(jar.add(cookies.issue(token)))
        }
        Ok(None) => {
            tracing::info!("Session expired or unknown");
            Some(jar.remove(cookies.clear()))
        }
        Err(e) => {
            // Leave the cookie alone; the store may be back on the next request.
            tracing::error!("Failed to resolve session: {:?}", e);
            None
        }
    };

    let response = next.run(req).await;
    match outcome {
        Some(jar) if !cookies.written_by(&response) => (jar, response).into_response(),
        _ => response,
    }
}
