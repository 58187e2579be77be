//! Security utilities.
//!
//! Currently this is credential scrubbing, so signing tokens and keys never
//! reach the log output.

pub mod credential_scrubber;

pub use credential_scrubber::{safe_error_message, scrub_credentials};
