pub mod auth;
pub mod dashboard;
pub mod events;

use askama::Template;
use axum::response::Html;

use crate::errors::AppError;

pub const LOGIN_PATH: &str = "/login/";

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}
