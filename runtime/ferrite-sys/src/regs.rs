//! The per-execution-context message-register area and the trampoline seam.
//!
//! Each hardware thread owns one `MsgRegisters` area; the kernel reads the
//! encoded message from it on entry and writes the reply into it before
//! returning. Because the area is handed to [`Trampoline::syscall`] as an
//! exclusive borrow, two invocations on the same execution context cannot
//! interleave their register writes, and independent contexts never share
//! an area at all.

use static_assertions::const_assert_eq;

use crate::{Badge, CPtr, MessageInfo, SyscallId, Word};

/// Message-register budget: data words per message.
pub const MSG_MAX_LENGTH: usize = 64;

/// Message-register budget: capability transfer slots per message.
pub const MSG_MAX_EXTRA_CAPS: usize = 3;

/// The message-register area, laid out exactly as the kernel expects it.
///
/// `tag` mirrors the in/out message descriptor, `badge` is written by the
/// kernel on receive paths, `msg` holds the data words and `caps` the
/// capability transfer slots.
#[repr(C)]
#[derive(Clone)]
pub struct MsgRegisters {
    pub tag: Word,
    pub badge: Badge,
    pub msg: [Word; MSG_MAX_LENGTH],
    pub caps: [CPtr; MSG_MAX_EXTRA_CAPS],
}

// Layout is ABI: the kernel indexes this area by byte offset.
const_assert_eq!(core::mem::size_of::<MsgRegisters>(), (2 + MSG_MAX_LENGTH + MSG_MAX_EXTRA_CAPS) * core::mem::size_of::<Word>());
const_assert_eq!(core::mem::align_of::<MsgRegisters>(), core::mem::align_of::<Word>());

impl MsgRegisters {
    pub const fn zeroed() -> Self {
        Self {
            tag: 0,
            badge: 0,
            msg: [0; MSG_MAX_LENGTH],
            caps: [0; MSG_MAX_EXTRA_CAPS],
        }
    }
}

impl Default for MsgRegisters {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// What the kernel hands back from a completed syscall.
///
/// The label field of `tag` carries the raw error code; on receive paths
/// `badge` identifies the sender. Reply data words are written in place
/// into the caller's [`MsgRegisters`].
#[derive(Debug, Copy, Clone)]
pub struct RawReply {
    pub tag: MessageInfo,
    pub badge: Badge,
}

impl RawReply {
    /// An empty success reply, produced by send-only entry points.
    pub const fn empty() -> Self {
        Self {
            tag: MessageInfo::from_raw(0),
            badge: 0,
        }
    }
}

/// The privileged mode transition.
///
/// Implementations either execute the real trap instruction
/// ([`KernelTrampoline`](crate::KernelTrampoline)) or simulate the kernel
/// (`ferrite-mock`). The operation is opaque and atomic from the caller's
/// point of view: it either fully executes or returns an error code in the
/// reply tag, with no partial-completion states and no retries.
pub trait Trampoline {
    /// Enter the kernel with the encoded message in `regs`.
    ///
    /// Blocks the calling thread until the kernel replies, except for the
    /// send-only ids (`Send`, `NBSend`, `Yield`) which return immediately
    /// with an empty reply.
    fn syscall(
        &self,
        id: SyscallId,
        dest: CPtr,
        info: MessageInfo,
        regs: &mut MsgRegisters,
    ) -> RawReply;
}
