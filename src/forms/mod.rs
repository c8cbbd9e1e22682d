//! Submitted forms and their validation rules.
//!
//! Each form is deserialized leniently (missing fields become empty) and then
//! checked with its `#[validate(...)]` rules. A valid form converts into the
//! typed values the services work with; an invalid one yields [`FormErrors`].

pub mod auth;
pub mod event;

use std::borrow::Cow;
use std::collections::BTreeMap;

use validator::{ValidationError, ValidationErrors};

pub use auth::{Credentials, LoginForm, RegisterForm};
pub use event::EventForm;

const REQUIRED: &str = "required";
pub(crate) const REQUIRED_MESSAGE: &str = "This field is required.";

/// Per-field validation messages, ready to be shown next to each input.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, errors) in errors.field_errors() {
            // An empty field only reports that it is required.
            let required = errors.iter().find(|e| e.code == REQUIRED);
            let errors: Vec<&ValidationError> = match required {
                Some(e) => vec![e],
                None => errors.iter().collect(),
            };
            for error in errors {
                let message = error
                    .message
                    .clone()
                    .unwrap_or_else(|| Cow::Owned(format!("Invalid value ({}).", error.code)));
                out.add(&field, message);
            }
        }
        out
    }
}

/// A form that can be checked and turned into typed values.
pub trait Submission {
    type Output;

    fn validated(&self) -> Result<Self::Output, FormErrors>;
}

pub(crate) fn required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(REQUIRED).with_message(REQUIRED_MESSAGE.into()));
    }
    Ok(())
}
