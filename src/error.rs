//! Unified error handling for DetForge
//!
//! The kernel has no recoverable runtime failures: every error is a
//! precondition violation (bad dimensions, wrong buffer lengths) detected
//! before any computation starts. This module provides the centralized error
//! type and its categorization:
//! - User errors (precondition violations, actionable by the caller)
//! - Internal errors (bugs, invariant breakage)

use std::fmt;

/// Maximum supported group size.
///
/// An int8 x int8 product is bounded by 128 * 128 = 2^14, so the i32 group
/// accumulator holds at most `gs * 2^14`. The largest `gs` that keeps the
/// worst case at or below `i32::MAX` is `(2^31 - 1) / 2^14` = 131071;
/// larger groups are rejected rather than allowed to overflow.
pub const MAX_GROUP_SIZE: usize = (i32::MAX as usize) / (128 * 128);

/// Unified error type for DetForge
///
/// All variants other than `Internal` describe a precondition violation of
/// the kernel entry point. The kernel rejects these synchronously; the
/// output buffer is never partially written.
#[derive(Debug, thiserror::Error)]
pub enum DetForgeError {
    /// A dimension argument was zero
    #[error("invalid dimension: {name} must be positive")]
    ZeroDimension { name: &'static str },

    /// Group size does not evenly divide the input length
    #[error("group size {gs} does not divide input length {n}; trailing partial groups are not supported")]
    GroupSizeIndivisible { n: usize, gs: usize },

    /// Group size large enough to overflow the i32 group accumulator
    #[error("group size {gs} exceeds maximum {max}")]
    GroupSizeTooLarge { gs: usize, max: usize },

    /// A buffer argument has the wrong length for the given dimensions
    #[error("buffer length mismatch for {name}: expected {expected}, got {actual}")]
    BufferLengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Internal error (indicates a bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl DetForgeError {
    /// Categorize the error for handling decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            DetForgeError::ZeroDimension { .. }
            | DetForgeError::GroupSizeIndivisible { .. }
            | DetForgeError::GroupSizeTooLarge { .. }
            | DetForgeError::BufferLengthMismatch { .. } => ErrorCategory::User,

            DetForgeError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Check if this is a precondition violation (actionable by the caller)
    pub fn is_user_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::User)
    }

    /// Check if this is an internal error (indicates a bug)
    pub fn is_internal_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Internal)
    }
}

/// Error category for handling decisions
///
/// - User: precondition violation; the caller should fix the input shapes
/// - Internal: indicates a bug in DetForge itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Precondition violation - invalid shapes or dimensions
    User,
    /// Internal error - indicates a bug
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::User => write!(f, "User"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

/// Helper type alias for Results using DetForgeError
pub type ForgeResult<T> = std::result::Result<T, DetForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            DetForgeError::ZeroDimension { name: "gs" }.category(),
            ErrorCategory::User
        );
        assert_eq!(
            DetForgeError::GroupSizeIndivisible { n: 10, gs: 3 }.category(),
            ErrorCategory::User
        );
        assert_eq!(
            DetForgeError::BufferLengthMismatch {
                name: "xq",
                expected: 8,
                actual: 4
            }
            .category(),
            ErrorCategory::User
        );
        assert_eq!(
            DetForgeError::Internal("test".to_string()).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_is_user_error() {
        assert!(DetForgeError::ZeroDimension { name: "n" }.is_user_error());
        assert!(DetForgeError::GroupSizeTooLarge {
            gs: MAX_GROUP_SIZE + 1,
            max: MAX_GROUP_SIZE
        }
        .is_user_error());
        assert!(!DetForgeError::Internal("bug".to_string()).is_user_error());
    }

    #[test]
    fn test_is_internal_error() {
        assert!(DetForgeError::Internal("bug".to_string()).is_internal_error());
        assert!(!DetForgeError::ZeroDimension { name: "d" }.is_internal_error());
    }

    #[test]
    fn test_error_display() {
        let err = DetForgeError::GroupSizeIndivisible { n: 10, gs: 3 };
        assert_eq!(
            err.to_string(),
            "group size 3 does not divide input length 10; trailing partial groups are not supported"
        );

        let err = DetForgeError::BufferLengthMismatch {
            name: "ws",
            expected: 16,
            actual: 8,
        };
        assert_eq!(
            err.to_string(),
            "buffer length mismatch for ws: expected 16, got 8"
        );
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::User.to_string(), "User");
        assert_eq!(ErrorCategory::Internal.to_string(), "Internal");
    }

    #[test]
    fn test_max_group_size_fits_i32() {
        // Worst-case magnitude of a single int8 product is 128 * 128.
        let worst = (MAX_GROUP_SIZE as i64) * 128 * 128;
        assert!(worst <= i32::MAX as i64);
        // The bound is tight: one more element can overflow.
        let over = ((MAX_GROUP_SIZE + 1) as i64) * 128 * 128;
        assert!(over > i32::MAX as i64);
    }
}
