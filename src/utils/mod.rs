pub mod db_utils;
pub mod geo;
pub mod hhmm;
pub mod revocation_sweep;
