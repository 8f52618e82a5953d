//! Result type alias for privscan
//!
//! This module provides a convenient Result type alias that uses ScanError
//! as the error type.

use super::errors::ScanError;

/// Result type alias for privscan operations
///
/// # Examples
///
/// ```
/// use privscan::domain::result::Result;
/// use privscan::domain::errors::ScanError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ScanError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ScanError>;
