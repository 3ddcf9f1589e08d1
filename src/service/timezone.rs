//! Time zone resolution for office-local wall clocks.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use derive_more::Display;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::office::Office;

#[derive(Debug, Display)]
pub enum LookupError {
    #[display(fmt = "time zone lookup is not configured")]
    NotConfigured,
    #[display(fmt = "time zone request failed: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "time zone service answered '{}': {}", status, message)]
    Rejected { status: String, message: String },
    #[display(fmt = "unknown time zone '{}'", _0)]
    UnknownZone(String),
}

impl std::error::Error for LookupError {}

/// Coordinates -> IANA zone name.
#[async_trait]
pub trait TimeZoneLookup: Send + Sync {
    async fn zone_name(&self, latitude: f64, longitude: f64) -> Result<String, LookupError>;
}

/// Client for the TimeZoneDB `get-time-zone` endpoint.
pub struct TimeZoneDbClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeZoneDbResponse {
    status: String,
    #[serde(default)]
    message: String,
    zone_name: Option<String>,
}

impl TimeZoneDbClient {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LookupError::Transport)?;

        Ok(Self { http, url, api_key })
    }
}

#[async_trait]
impl TimeZoneLookup for TimeZoneDbClient {
    async fn zone_name(&self, latitude: f64, longitude: f64) -> Result<String, LookupError> {
        let key = self.api_key.as_deref().ok_or(LookupError::NotConfigured)?;
        let lat = latitude.to_string();
        let lng = longitude.to_string();

        let body: TimeZoneDbResponse = self
            .http
            .get(&self.url)
            .query(&[
                ("key", key),
                ("format", "json"),
                ("by", "position"),
                ("lat", lat.as_str()),
                ("lng", lng.as_str()),
            ])
            .send()
            .await
            .map_err(LookupError::Transport)?
            .error_for_status()
            .map_err(LookupError::Transport)?
            .json()
            .await
            .map_err(LookupError::Transport)?;

        match (body.status.as_str(), body.zone_name) {
            ("OK", Some(zone)) if !zone.is_empty() => Ok(zone),
            _ => Err(LookupError::Rejected {
                status: body.status,
                message: body.message,
            }),
        }
    }
}

/// Resolved clock for an office.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Named(Tz),
    /// Lookup failed; wall clock of the server process.
    ServerLocal,
}

impl Zone {
    pub fn name(&self) -> Option<String> {
        match self {
            Zone::Named(tz) => Some(tz.name().to_string()),
            Zone::ServerLocal => None,
        }
    }

    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::Named(tz) => instant.with_timezone(tz).naive_local(),
            Zone::ServerLocal => instant.with_timezone(&Local).naive_local(),
        }
    }
}

pub fn parse_zone(name: &str) -> Result<Tz, LookupError> {
    name.parse::<Tz>()
        .map_err(|_| LookupError::UnknownZone(name.to_string()))
}

/// Stored zone name first, then the live lookup, then server time.
pub async fn resolve_zone(office: &Office, lookup: &dyn TimeZoneLookup) -> Zone {
    if let Some(name) = office.time_zone_name.as_deref() {
        match parse_zone(name) {
            Ok(tz) => return Zone::Named(tz),
            Err(e) => warn!(office_id = office.id, error = %e, "Stored office time zone is invalid"),
        }
    }

    let found = lookup
        .zone_name(office.location.latitude, office.location.longitude)
        .await
        .and_then(|name| parse_zone(&name));

    match found {
        Ok(tz) => {
            debug!(office_id = office.id, zone = tz.name(), "Resolved office time zone by position");
            Zone::Named(tz)
        }
        Err(e) => {
            warn!(
                office_id = office.id,
                error = %e,
                "Time zone lookup failed, falling back to server local time"
            );
            Zone::ServerLocal
        }
    }
}
