//! `HH:mm` wall-clock times, the format shifts are configured and shown in.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::AppError;

pub const FORMAT: &str = "%H:%M";

pub fn parse(field: &str, value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value.trim(), FORMAT)
        .map_err(|_| AppError::validation(format!("{field} must use the HH:mm format")))
}

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
}

pub mod option {
    use super::FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_some(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| NaiveTime::parse_from_str(raw.trim(), FORMAT))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
