use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use strum_macros::{AsRefStr, EnumString};

/// Which shift a punch-out measures worked minutes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PunchOutShift {
    /// The shift id sent with the punch-out request.
    Requested,
    /// The shift recorded on the open record at punch-in.
    Recorded,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Attendance
    pub geofence_radius_meters: f64,
    pub punch_out_shift: PunchOutShift,

    // Time-zone lookup
    pub timezonedb_url: String,
    pub timezonedb_api_key: Option<String>,
    pub timezone_lookup_timeout: Duration,

    pub revocation_purge_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key -> value source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));

        fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: std::fmt::Display,
        {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}")),
                None => Ok(default),
            }
        }

        let geofence_radius_meters: f64 = parsed(&lookup, "GEOFENCE_RADIUS_METERS", 50.0)?;
        if !(geofence_radius_meters.is_finite() && geofence_radius_meters > 0.0) {
            return Err(anyhow!("GEOFENCE_RADIUS_METERS must be a positive number"));
        }

        let revocation_purge_secs: u64 = parsed(&lookup, "REVOCATION_PURGE_INTERVAL_SECS", 3600)?;
        if revocation_purge_secs == 0 {
            return Err(anyhow!("REVOCATION_PURGE_INTERVAL_SECS must be at least 1"));
        }

        let punch_out_shift = match lookup("PUNCH_OUT_SHIFT") {
            Some(raw) => PunchOutShift::from_str(raw.trim())
                .with_context(|| format!("PUNCH_OUT_SHIFT must be 'requested' or 'recorded', got '{raw}'"))?,
            None => PunchOutShift::Requested,
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed(&lookup, "ACCESS_TOKEN_TTL", 86_400)?, // default 1 day

            rate_login_per_min: parsed(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parsed(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            geofence_radius_meters,
            punch_out_shift,

            timezonedb_url: lookup("TIMEZONEDB_URL")
                .unwrap_or_else(|| "http://api.timezonedb.com/v2.1/get-time-zone".to_string()),
            timezonedb_api_key: lookup("TIMEZONEDB_API_KEY").filter(|k| !k.trim().is_empty()),
            timezone_lookup_timeout: Duration::from_secs(parsed(
                &lookup,
                "TIMEZONE_LOOKUP_TIMEOUT_SECS",
                5,
            )?),

            revocation_purge_interval: Duration::from_secs(revocation_purge_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SERVER_ADDR", "127.0.0.1:8080"),
        ("DATABASE_URL", "mysql://localhost/hrm"),
        ("JWT_SECRET", "k"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let config = from_pairs(&REQUIRED).unwrap();

        assert_eq!(config.access_token_ttl, 86_400);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.geofence_radius_meters, 50.0);
        assert_eq!(config.punch_out_shift, PunchOutShift::Requested);
        assert_eq!(config.timezonedb_api_key, None);
        assert_eq!(config.timezone_lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.revocation_purge_interval, Duration::from_secs(3600));
    }

    #[test]
    fn missing_required_var_is_an_error() {
        let err = from_pairs(&REQUIRED[..2]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PUNCH_OUT_SHIFT", "recorded"),
            ("GEOFENCE_RADIUS_METERS", "120.5"),
            ("TIMEZONEDB_API_KEY", "abc"),
        ]);
        let config = from_pairs(&pairs).unwrap();

        assert_eq!(config.punch_out_shift, PunchOutShift::Recorded);
        assert_eq!(config.geofence_radius_meters, 120.5);
        assert_eq!(config.timezonedb_api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PUNCH_OUT_SHIFT", "latest"));
        assert!(from_pairs(&pairs).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ACCESS_TOKEN_TTL", "soon"));
        assert!(from_pairs(&pairs).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GEOFENCE_RADIUS_METERS", "-1"));
        assert!(from_pairs(&pairs).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("REVOCATION_PURGE_INTERVAL_SECS", "0"));
        let err = from_pairs(&pairs).unwrap_err();
        assert!(err.to_string().contains("REVOCATION_PURGE_INTERVAL_SECS"));
    }
}
