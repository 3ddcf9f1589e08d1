pub mod attendance;
pub mod off_day;
pub mod office;
pub mod staff;
