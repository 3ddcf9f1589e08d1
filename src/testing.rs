//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveTime, Utc};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::office::{NewOffice, NewShift, Office, Shift};
use crate::model::role::Role;
use crate::model::user::{AssignedShift, NewUser, User};
use crate::service::timezone::{LookupError, TimeZoneLookup};
use crate::store::OfficeStore;
use crate::store::memory::MemoryStore;
use crate::utils::geo::GeoPoint;

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "SERVER_ADDR" => Some("127.0.0.1:0".into()),
        "DATABASE_URL" => Some("mysql://unused".into()),
        "JWT_SECRET" => Some("test-secret".into()),
        _ => None,
    })
    .expect("test config")
}

pub fn hhmm(value: &str) -> NaiveTime {
    crate::utils::hhmm::parse("time", value).expect("HH:mm literal")
}

pub fn user(id: u64, company_id: u64, role: Role) -> User {
    User {
        id,
        company_id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        password: String::new(),
        role,
        office_id: None,
        department_id: None,
        assigned_shifts: Vec::new(),
        active: true,
    }
}

pub fn new_user(company_id: u64, username: &str, role: Role) -> NewUser {
    NewUser {
        company_id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: String::new(),
        role,
        office_id: None,
        department_id: None,
    }
}

pub fn auth_for(user: &User) -> AuthUser {
    AuthUser {
        company_id: user.company_id,
        user_id: user.id,
        role: user.role,
        username: user.username.clone(),
        email: user.email.clone(),
        jti: format!("jti-{}", user.id),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

pub const HANOI: (f64, f64) = (105.8342, 21.0278);

/// Unsaved office at the Hanoi coordinates with one 09:00-18:00 shift.
pub fn hanoi_office(id: u64, time_zone_name: Option<&str>) -> Office {
    Office {
        id,
        company_id: 1,
        name: "Hanoi HQ".into(),
        address: None,
        city: Some("Hanoi".into()),
        shift_window_start: None,
        shift_window_end: None,
        location: GeoPoint {
            longitude: HANOI.0,
            latitude: HANOI.1,
        },
        time_zone_name: time_zone_name.map(str::to_string),
        shifts: vec![Shift {
            id: id * 100,
            office_id: id,
            name: "Day".into(),
            start_time: hhmm("09:00"),
            end_time: hhmm("18:00"),
        }],
    }
}

pub struct Fixture {
    pub office: Office,
    pub shift: Shift,
    pub staff: User,
}

/// Stores the Hanoi office and a staff member assigned to its day shift.
pub async fn seed_hanoi(store: &MemoryStore, time_zone_name: Option<&str>) -> Fixture {
    let template = hanoi_office(0, time_zone_name);
    let office = store
        .insert_office(NewOffice {
            company_id: template.company_id,
            name: template.name,
            address: template.address,
            city: template.city,
            shift_window_start: None,
            shift_window_end: None,
            location: template.location,
            time_zone_name: template.time_zone_name,
            shifts: vec![NewShift {
                name: "Day".into(),
                start_time: hhmm("09:00"),
                end_time: hhmm("18:00"),
            }],
        })
        .await
        .expect("seed office");
    let shift = office.shifts[0].clone();

    let mut staff = user(500, office.company_id, Role::Staff);
    staff.office_id = Some(office.id);
    staff.assigned_shifts = (0..7)
        .map(|day_of_week| AssignedShift {
            day_of_week,
            shift_id: shift.id,
        })
        .collect();
    store.put_user(staff.clone());

    Fixture {
        office,
        shift,
        staff,
    }
}

/// Canned time-zone lookup that counts its calls.
pub struct StubZones {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl StubZones {
    pub fn answering(zone: &str) -> Self {
        Self {
            answer: Some(zone.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeZoneLookup for StubZones {
    async fn zone_name(&self, _latitude: f64, _longitude: f64) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or(LookupError::NotConfigured)
    }
}
