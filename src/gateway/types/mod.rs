//! Gateway types module
//!
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`error_codes`]: numeric codes carried in the envelope
//! - [`ValidJson`]: JSON body extractor that runs `validator` rules

pub mod extract;
pub mod response;

pub use extract::ValidJson;
pub use response::{ApiResponse, ApiResult, Deleted, created, error_codes, ok};
