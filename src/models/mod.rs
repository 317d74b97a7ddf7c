mod api;
mod report;

pub use api::{HealthResponse, StatsResponse, UploadRequest};
pub use report::Report;
