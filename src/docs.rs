use crate::api::attendance::IdsRequest;
use crate::api::off_day::{ApproveOffDaysRequest, DenyOffDayRequest};
use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceRecord, PunchEvent};
use crate::model::off_day::{OffDayPermission, OffDayStatus, Verifier};
use crate::model::office::{Office, Shift};
use crate::model::role::Role;
use crate::model::user::AssignedShift;
use crate::models::{LoginReqDto, LoginResponse};
use crate::service::attendance::PunchCommand;
use crate::service::off_day::OffDayRequest;
use crate::service::office::{
    AssignShiftRequest, CreateOfficeRequest, EditOfficeRequest, ShiftDays, ShiftRequest,
};
use crate::service::staff::AddStaffRequest;
use crate::utils::geo::GeoPoint;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Multi-tenant attendance and off-day management

### Key Features
- **Attendance**
  - Geofenced punch-in / punch-out against the staff member's assigned shift
  - Late and worked minutes computed in the office's local time zone
  - Bulk approval of check-ins by HR
- **Off-days**
  - Staff request off-day permissions, HR approves or denies them
- **Offices and staff**
  - Offices with shifts, weekly shift assignment, staff accounts

### Security
Every endpoint except `/auth/login` expects `Authorization: Bearer <token>`.
Logging out revokes the token until it expires.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::attendance::punch,
        crate::api::attendance::list_own,
        crate::api::attendance::list_for_user,
        crate::api::attendance::approve,
        crate::api::attendance::unapprove,

        crate::api::off_day::create,
        crate::api::off_day::list,
        crate::api::off_day::get,
        crate::api::off_day::approve,
        crate::api::off_day::deny,

        crate::api::office::create,
        crate::api::office::list,
        crate::api::office::edit,
        crate::api::office::add_shift,
        crate::api::office::assign_shifts,

        crate::api::staff::create
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            AuthUser,
            Role,
            GeoPoint,
            PunchCommand,
            PunchEvent,
            AttendanceRecord,
            IdsRequest,
            OffDayRequest,
            OffDayPermission,
            OffDayStatus,
            Verifier,
            ApproveOffDaysRequest,
            DenyOffDayRequest,
            Office,
            Shift,
            ShiftRequest,
            CreateOfficeRequest,
            EditOfficeRequest,
            ShiftDays,
            AssignShiftRequest,
            AssignedShift,
            AddStaffRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, logout and identity"),
        (name = "Attendance", description = "Punch-in / punch-out and approval"),
        (name = "OffDay", description = "Off-day permission workflow"),
        (name = "Office", description = "Offices, shifts and shift assignment"),
        (name = "Staff", description = "Staff accounts"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
