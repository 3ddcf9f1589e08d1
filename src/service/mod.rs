pub mod approval;
pub mod attendance;
pub mod geofence;
pub mod off_day;
pub mod office;
pub mod staff;
pub mod timezone;
