//! HTTP middleware guarding the upload routes.
//!
//! Two layers screen every guarded request:
//!
//! - **Response-Time Normalization** (`SlowDownLayer`): pads every request
//!   with a delay drawn from a configured normal distribution
//! - **Token Format Screening** (`TokenFormatLayer`): rejects requests whose
//!   bearer token is not exactly 64 hex characters, before the handler runs
//!
//! # Architecture
//!
//! ```text
//! Request → Slow Down → Token Format → Handler → Response
//!              ↓             ↓
//!       padding delay   400 SchemaValidation
//! ```
//!
//! # Ordering Invariant
//!
//! The slow-down layer is outermost and the token guard innermost. The
//! padding delay must cover token rejections, handler failures, and decoy
//! uploads uniformly; otherwise response latency reveals which path a
//! request took, and the guarded boundary becomes cheap to brute-force.

pub mod slow_down;
pub mod token_format;

pub use slow_down::SlowDownLayer;
pub use token_format::{TokenFormatLayer, is_valid_token_format};
