use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use super::{FormErrors, REQUIRED_MESSAGE, Submission, required};
use crate::models::{Category, EventFields, EventModel};

/// Formats accepted for the timestamp inputs, tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Value of a `datetime-local` input with `step="1"`.
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const INVALID_DATETIME: &str = "Not a valid datetime value.";

/// Checkbox values that still mean "unchecked".
const FALSE_VALUES: [&str; 2] = ["", "false"];

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct EventForm {
    #[validate(
        custom(function = "required"),
        length(min = 1, max = 64, message = "Field must be between 1 and 64 characters long.")
    )]
    pub name: String,

    pub category: String,

    #[validate(
        custom(function = "required"),
        length(min = 1, max = 64, message = "Field must be between 1 and 64 characters long.")
    )]
    pub place: String,

    #[validate(
        custom(function = "required"),
        length(min = 1, max = 64, message = "Field must be between 1 and 64 characters long.")
    )]
    pub address: String,

    pub start_datetime: String,
    pub end_datetime: String,

    pub is_virtual: Option<String>,
}

impl EventForm {
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
            .as_deref()
            .is_some_and(|v| !FALSE_VALUES.contains(&v.trim()))
    }
}

impl Submission for EventForm {
    type Output = EventFields;

    /// Runs the declared rules, then parses category and timestamps, collecting
    /// every failure before answering.
    fn validated(&self) -> Result<EventFields, FormErrors> {
        let mut errors = self.validate().err().map(FormErrors::from).unwrap_or_default();

        let category = parse_category(&self.category).map_err(|m| errors.add("category", m));
        let start = parse_datetime(&self.start_datetime)
            .ok_or_else(|| errors.add("start_datetime", INVALID_DATETIME));
        let end = parse_datetime(&self.end_datetime)
            .ok_or_else(|| errors.add("end_datetime", INVALID_DATETIME));

        match (category, start, end) {
            (Ok(category), Ok(start_datetime), Ok(end_datetime)) if errors.is_empty() => {
                Ok(EventFields {
                    name: self.name.clone(),
                    category,
                    place: self.place.clone(),
                    address: self.address.clone(),
                    start_datetime,
                    end_datetime,
                    is_virtual: self.is_virtual(),
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&EventModel> for EventForm {
    fn from(event: &EventModel) -> Self {
        Self {
            name: event.name.clone(),
            category: event.category.to_string(),
            place: event.place.clone(),
            address: event.address.clone(),
            start_datetime: event.start_datetime.format(INPUT_FORMAT).to_string(),
            end_datetime: event.end_datetime.format(INPUT_FORMAT).to_string(),
            is_virtual: event.is_virtual.then(|| "y".to_string()),
        }
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn parse_category(value: &str) -> Result<Category, &'static str> {
    if value.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }
    value.parse().map_err(|_| "Not a valid choice.")
}
