//! Raw ABI surface for the Ferrite microkernel
//!
//! # Purpose
//! Everything in this crate mirrors a contract that is fixed by the kernel:
//! machine word types, error codes, object type codes, the packed message
//! descriptor, the per-context message-register area, and the layout of the
//! kernel-populated structures (boot info, fault messages). Nothing here is
//! a design choice of the binding layer; a mismatch against the kernel's
//! published tables is silent misbehavior, not a reported error.
//!
//! # Integration Points
//! - Depends on: nothing (the kernel ABI is the dependency)
//! - Provides to: `ferrite-sdk` (safe wrappers), `ferrite-mock` (simulated kernel)
//!
//! Safe, typed access lives in `ferrite-sdk`; this crate stays deliberately
//! thin and `no_std`.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod bootinfo;
mod invocation;
mod message_info;
mod regs;
mod trampoline;

pub use bootinfo::{BootInfo, UntypedDesc, SlotRegion, init_slot, MAX_UNTYPED_DESCS};
pub use invocation::{Arity, InvocationLabel, SyscallId};
pub use message_info::MessageInfo;
pub use regs::{MsgRegisters, RawReply, Trampoline, MSG_MAX_EXTRA_CAPS, MSG_MAX_LENGTH};
#[cfg(all(target_arch = "aarch64", not(test)))]
pub use trampoline::KernelTrampoline;

/// A machine word as the kernel sees it.
pub type Word = usize;

/// A capability pointer: the index of a slot in the caller's capability space.
pub type CPtr = Word;

/// The badge word delivered alongside endpoint and notification messages.
pub type Badge = Word;

/// Badge value the kernel reserves to flag a failed receive.
///
/// Receive entry points normally reply with the sender's message; when the
/// lookup of the receive capability itself fails there is no sender, so the
/// kernel replies with this badge and the error code in the tag label.
/// User badges are always below this value.
pub const RECV_ERROR_BADGE: Badge = Badge::MAX;

/// Kernel error codes.
///
/// These are the values the kernel writes into the label field of a reply
/// tag. The table is fixed; new kernels may append but never renumber.
pub mod error_code {
    use super::Word;

    pub const NO_ERROR: Word = 0;
    pub const INVALID_ARGUMENT: Word = 1;
    pub const INVALID_CAPABILITY: Word = 2;
    pub const ILLEGAL_OPERATION: Word = 3;
    pub const RANGE_ERROR: Word = 4;
    pub const ALIGNMENT_ERROR: Word = 5;
    pub const FAILED_LOOKUP: Word = 6;
    pub const TRUNCATED_MESSAGE: Word = 7;
    pub const DELETE_FIRST: Word = 8;
    pub const REVOKE_FIRST: Word = 9;
    pub const NOT_ENOUGH_MEMORY: Word = 10;
    pub const ACCESS_DENIED: Word = 11;

    /// Highest code the kernel currently defines.
    pub const MAX_DEFINED: Word = ACCESS_DENIED;
}

/// Kernel object type codes, as consumed by `Untyped::retype`.
pub mod object_type {
    use super::Word;

    pub const UNTYPED: Word = 1;
    pub const TCB: Word = 2;
    pub const ENDPOINT: Word = 3;
    pub const NOTIFICATION: Word = 4;
    pub const CNODE: Word = 5;
    pub const PAGE: Word = 6;
    pub const PAGE_TABLE: Word = 7;
    pub const VSPACE: Word = 8;

    // Not retypable; these exist only as kernel-minted capability variants.
    pub const IRQ_CONTROL: Word = 9;
    pub const IRQ_HANDLER: Word = 10;
}

/// Labels of kernel-delivered fault messages.
///
/// A fault arrives as an ordinary message on the faulting thread's fault
/// endpoint; the tag label selects the record layout in the message words.
pub mod fault_label {
    use super::Word;

    pub const NULL_FAULT: Word = 0;
    pub const CAP_FAULT: Word = 1;
    pub const UNKNOWN_SYSCALL: Word = 2;
    pub const USER_EXCEPTION: Word = 3;
    pub const VM_FAULT: Word = 5;
}
