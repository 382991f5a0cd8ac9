//! Suffix range validation

use crate::errors::{Result, SailError};
use crate::port::roles::PortRole;

/// Highest TCP port number
pub const MAX_TCP_PORT: u32 = 65535;

/// Highest valid suffix: 65535 - 18100 (the mailpit dashboard base)
pub const MAX_SUFFIX: u32 = MAX_TCP_PORT - PortRole::ForwardMailpitDashboard.base();

/// Check that a candidate suffix keeps every derived port inside the TCP range.
///
/// Takes `i64` because candidates come straight from user input, where a
/// negative number is a range error rather than a parse error.
pub fn validate_suffix(suffix: i64) -> Result<u32> {
    if suffix < 0 {
        return Err(SailError::SuffixOutOfRange(format!(
            "suffix must be non-negative, got {}",
            suffix
        )));
    }
    if suffix > i64::from(MAX_SUFFIX) {
        return Err(SailError::SuffixOutOfRange(format!(
            "suffix {} too large: highest port would be {} (max {})",
            suffix,
            i64::from(PortRole::ForwardMailpitDashboard.base()).saturating_add(suffix),
            MAX_TCP_PORT
        )));
    }
    Ok(suffix as u32)
}
