use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Conferencia,
    Seminario,
    Congreso,
    Curso,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Conferencia,
        Category::Seminario,
        Category::Congreso,
        Category::Curso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Conferencia => "conferencia",
            Category::Seminario => "seminario",
            Category::Congreso => "congreso",
            Category::Curso => "curso",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not an event category")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A stored event. Its `Serialize` impl is the JSON contract of the API: a flat
/// object, category as its string value, timestamps as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EventModel {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub category: Category,
    pub place: String,
    pub address: String,
    #[serde(with = "timestamp")]
    pub start_datetime: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub end_datetime: NaiveDateTime,
    pub is_virtual: bool,
}

impl EventModel {
    pub fn start_display(&self) -> String {
        self.start_datetime.format(timestamp::FORMAT).to_string()
    }

    pub fn end_display(&self) -> String {
        self.end_datetime.format(timestamp::FORMAT).to_string()
    }
}

/// Validated field values of an event, before or apart from its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
    pub name: String,
    pub category: Category,
    pub place: String,
    pub address: String,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
    pub is_virtual: bool,
}

pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}
