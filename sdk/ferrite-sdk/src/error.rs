//! The kernel error taxonomy and its mapping from raw codes.
//!
//! Every kernel-reported failure surfaces to the immediate caller as a
//! typed result; nothing is retried or suppressed here. Caller-side
//! encoding problems are kept distinct from kernel-reported ones so a
//! caller can tell a programming error from a kernel rejection.

use ferrite_sys::{error_code, Word};
use thiserror::Error;

/// A failure reported by the kernel.
///
/// The mapping from raw codes is total: codes the kernel may grow in the
/// future land in [`Unrecognized`](KernelError::Unrecognized) with the raw
/// value preserved, never dropped.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Target slot empty, lookup failed, or wrong capability class.
    #[error("invalid capability for the requested operation")]
    InvalidCapability,

    /// An argument violates a kernel-side precondition (range, alignment,
    /// message shape).
    #[error("argument rejected by the kernel")]
    InvalidArgument,

    /// The capability lacks a right the operation requires.
    #[error("capability rights insufficient for the operation")]
    PermissionDenied,

    /// A kernel-side resource limit was hit.
    #[error("kernel resources exhausted")]
    ResourceExhausted,

    /// The operation is not valid in the object's current state.
    #[error("operation illegal in the object's current state")]
    IllegalOperation,

    /// A code this binding does not know. Carried verbatim for forward
    /// compatibility.
    #[error("unrecognized kernel error code {0}")]
    Unrecognized(Word),
}

impl KernelError {
    /// Map a raw reply code. `NO_ERROR` is success, everything else is a
    /// taxonomy entry.
    pub fn check(code: Word) -> core::result::Result<(), KernelError> {
        use error_code::*;
        Err(match code {
            NO_ERROR => return Ok(()),
            INVALID_ARGUMENT | RANGE_ERROR | ALIGNMENT_ERROR | TRUNCATED_MESSAGE => {
                KernelError::InvalidArgument
            }
            INVALID_CAPABILITY | FAILED_LOOKUP => KernelError::InvalidCapability,
            ILLEGAL_OPERATION | DELETE_FIRST | REVOKE_FIRST => KernelError::IllegalOperation,
            NOT_ENOUGH_MEMORY => KernelError::ResourceExhausted,
            ACCESS_DENIED => KernelError::PermissionDenied,
            other => KernelError::Unrecognized(other),
        })
    }
}

/// Any failure a binding operation can surface.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum IpcError {
    /// The encoded message does not fit the message-register budget. This
    /// is a caller-side error; the kernel was never entered.
    #[error("message of {words} words / {caps} caps exceeds the register budget")]
    MessageTooLong { words: usize, caps: usize },

    /// The kernel rejected the invocation.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_defined_code_has_a_proper_variant() {
        for code in 1..=error_code::MAX_DEFINED {
            let err = KernelError::check(code).unwrap_err();
            assert!(
                !matches!(err, KernelError::Unrecognized(_)),
                "code {} fell through to the catch-all",
                code
            );
        }
    }

    #[test]
    fn invalid_capability_code_maps_to_invalid_capability() {
        assert_eq!(
            KernelError::check(error_code::INVALID_CAPABILITY),
            Err(KernelError::InvalidCapability)
        );
    }

    #[test]
    fn unknown_code_is_carried_verbatim() {
        assert_eq!(
            KernelError::check(9999),
            Err(KernelError::Unrecognized(9999))
        );
    }

    #[test]
    fn no_error_is_success() {
        assert_eq!(KernelError::check(error_code::NO_ERROR), Ok(()));
    }
}
