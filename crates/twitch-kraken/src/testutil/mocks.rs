//! Mock implementations for testing
//!
//! Re-exports mock implementations from their respective modules for
//! convenient access in tests.

// Re-export HTTP mocks
pub use crate::http::mock::MockHttpClient;

// Re-export request log mocks
pub use crate::log::mock::RecordingLog;
