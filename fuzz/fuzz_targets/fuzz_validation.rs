//! Fuzz testing for the request-shape validators.
//!
//! This fuzz target tests the robustness of the screening functions against
//! arbitrary input strings. It ensures that they:
//!
//! - Never panic on any input
//! - Always return a definite verdict (bool or Result)
//! - Handle edge cases like empty strings, long strings, multi-byte UTF-8,
//!   and embedded control characters
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! # Install cargo-fuzz (requires nightly)
//! cargo +nightly install cargo-fuzz
//!
//! # Run the validation fuzz target
//! cargo +nightly fuzz run fuzz_validation
//!
//! # Run with a time limit (e.g., 60 seconds)
//! cargo +nightly fuzz run fuzz_validation -- -max_total_time=60
//! ```
//!
//! # What This Tests
//!
//! - `is_valid_token_format`: bearer token shape screening
//! - `validate_report_kind`: report kind string validation
//! - `validate_upload`: batch-level validation

#![no_main]

use libfuzzer_sys::fuzz_target;

use intake::middleware::is_valid_token_format;
use intake::models::Report;
use intake::validation::{validate_report_kind, validate_upload};

fuzz_target!(|data: &[u8]| {
    // Try to interpret the bytes as a UTF-8 string for string validation
    if let Ok(s) = std::str::from_utf8(data) {
        // Token shape screening (shouldn't panic)
        let _ = is_valid_token_format(s);

        // Report kind validation (shouldn't panic)
        let _ = validate_report_kind(s);

        // Batch validation with the fuzzed string as a kind (shouldn't panic)
        let reports = vec![Report::new(s, serde_json::Value::Null)];
        let _ = validate_upload(&reports, 16);
    }

    // The empty batch and the batch-limit boundary
    let _ = validate_upload(&[], 16);
});
