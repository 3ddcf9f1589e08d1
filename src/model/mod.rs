pub mod attendance;
pub mod off_day;
pub mod office;
pub mod revoked_token;
pub mod role;
pub mod user;
