//! Domain models and types for privscan.
//!
//! The domain layer provides:
//! - **Scan units** ([`TableUnit`], [`FileLocator`], [`TableSample`])
//! - **Match records** ([`RuleMatch`], [`Confidence`], [`Category`])
//! - **Error types** ([`ScanError`], [`DecodeError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ScanError>`]:
//!
//! ```rust
//! use privscan::domain::{Result, ScanError};
//!
//! fn example() -> Result<()> {
//!     Err(ScanError::Configuration("sample_size must be > 0".to_string()))
//! }
//! ```

pub mod errors;
pub mod matches;
pub mod result;
pub mod unit;

// Re-export commonly used types for convenience
pub use errors::{DecodeError, ScanError};
pub use matches::{Category, Confidence, RuleMatch, MAX_SAMPLE_VALUES};
pub use result::Result;
pub use unit::{FileLocator, TableSample, TableUnit};
