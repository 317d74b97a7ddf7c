mod health;
mod uploads;

pub use health::{health_check, readiness_check, stats};
pub use uploads::{DUMMY_DATA_HEADER, upload};
