use crate::error::{AppError, AppResult};
use crate::models::Report;

// =============================================================================
// Validation Constants
// =============================================================================

/// Maximum length for report kind strings.
///
/// Chosen to be reasonably generous while preventing abuse.
/// Format recommendation: `domain.action` (e.g., `exposure.summary`)
pub const MAX_KIND_LENGTH: usize = 64;

/// Minimum length for report kind strings.
pub const MIN_KIND_LENGTH: usize = 1;

/// Maximum serialized size of a single report payload, in bytes.
///
/// The whole-request body cap (`MAX_REQUEST_BODY_SIZE`) bounds the total;
/// this bounds any single report so one entry cannot consume the entire
/// batch budget.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Validate a report kind string.
///
/// Rules:
/// - Must be between 1 and 64 characters
/// - Must only contain printable ASCII characters (no control characters)
/// - Recommended format: `domain.action` (e.g., `exposure.summary`)
pub fn validate_report_kind(kind: &str) -> AppResult<()> {
    if kind.len() < MIN_KIND_LENGTH {
        return Err(AppError::SchemaValidation(
            "Report kind cannot be empty".to_string(),
        ));
    }

    if kind.len() > MAX_KIND_LENGTH {
        return Err(AppError::SchemaValidation(format!(
            "Report kind cannot exceed {} characters (got {})",
            MAX_KIND_LENGTH,
            kind.len()
        )));
    }

    // Check for control characters (non-printable ASCII)
    if let Some(pos) = kind.chars().position(|c| c.is_control()) {
        return Err(AppError::SchemaValidation(format!(
            "Report kind contains invalid control character at position {pos}"
        )));
    }

    Ok(())
}

/// Validate a single report's envelope.
///
/// The payload content is opaque and forwarded unchanged; only its
/// serialized size is bounded.
pub fn validate_report(report: &Report) -> AppResult<()> {
    validate_report_kind(&report.kind)?;

    let payload_size = serde_json::to_vec(&report.payload)
        .map_err(|e| AppError::Internal(format!("Failed to measure payload size: {e}")))?
        .len();

    if payload_size > MAX_PAYLOAD_BYTES {
        return Err(AppError::SchemaValidation(format!(
            "Report payload of {payload_size} bytes exceeds the {MAX_PAYLOAD_BYTES} byte limit"
        )));
    }

    Ok(())
}

/// Validate an upload batch.
///
/// Rules:
/// - Must contain at least one report
/// - Must not exceed `max_reports` entries
/// - Every report must pass [`validate_report`]; failures carry the
///   offending index for client-side debugging
pub fn validate_upload(reports: &[Report], max_reports: usize) -> AppResult<()> {
    if reports.is_empty() {
        return Err(AppError::SchemaValidation(
            "Upload must contain at least one report".to_string(),
        ));
    }

    if reports.len() > max_reports {
        return Err(AppError::SchemaValidation(format!(
            "Upload of {} reports exceeds the maximum of {} per request",
            reports.len(),
            max_reports
        )));
    }

    for (index, report) in reports.iter().enumerate() {
        validate_report(report)
            .map_err(|e| AppError::SchemaValidation(format!("Report at index {index}: {e}")))?;
    }

    Ok(())
}
