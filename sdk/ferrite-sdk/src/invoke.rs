//! The invocation context: one message-register area, one call in flight.
//!
//! Every syscall goes through an [`InvocationContext`]. The context owns
//! its register area outright and every entry point takes `&mut self`, so
//! the borrow checker rules out a second call on the same context while a
//! reply is pending, and two contexts can never scribble on each other's
//! registers. Misuse is unrepresentable rather than detected.

use ferrite_sys::{
    Badge, CPtr, InvocationLabel, MessageInfo, MsgRegisters, SyscallId, Trampoline, Word,
    RECV_ERROR_BADGE,
};

use crate::error::KernelError;
use crate::message;

/// A per-execution-context handle for kernel invocations.
///
/// Cheap to construct; a thread typically creates one and keeps it for its
/// lifetime. Reply words borrow the context, so they cannot be held across
/// the next call:
///
/// ```compile_fail
/// use ferrite_sdk::invoke::InvocationContext;
/// # fn demo(trampoline: &dyn ferrite_sys::Trampoline) {
/// let mut ctx = InvocationContext::new(trampoline);
/// let words = ctx.message(ferrite_sys::MessageInfo::from_raw(0));
/// ctx.yield_now(); // invalidates the borrowed reply
/// let _ = words[0];
/// # }
/// ```
pub struct InvocationContext<'t> {
    trampoline: &'t dyn Trampoline,
    regs: MsgRegisters,
}

impl<'t> InvocationContext<'t> {
    pub fn new(trampoline: &'t dyn Trampoline) -> Self {
        Self {
            trampoline,
            regs: MsgRegisters::zeroed(),
        }
    }

    /// Encode and perform a blocking `Call` invocation on `dest`.
    ///
    /// The reply tag's label carries the kernel's error code; success
    /// returns the reply tag so callers can read reply words through
    /// [`message`](Self::message).
    pub(crate) fn invoke(
        &mut self,
        dest: CPtr,
        label: InvocationLabel,
        args: &[Word],
        caps: &[CPtr],
    ) -> crate::Result<MessageInfo> {
        // Variable-arity labels size their own payload; fixed ones are
        // checked here so a mismatch fails loudly before kernel entry.
        let arity = label.arity();
        if let Some(words) = arity.words {
            debug_assert_eq!(args.len(), words, "{:?} takes {} words", label, words);
            debug_assert_eq!(caps.len(), arity.caps, "{:?} takes {} caps", label, arity.caps);
        }

        let info = message::encode(label as Word, args, caps, &mut self.regs)?;
        log::trace!(
            "call dest={} label={:?} words={} caps={}",
            dest,
            label,
            info.length(),
            info.extra_caps()
        );

        let reply = self
            .trampoline
            .syscall(SyscallId::Call, dest, info, &mut self.regs);
        KernelError::check(reply.tag.label())?;
        Ok(reply.tag)
    }

    /// Encode and perform a send-only syscall on `dest`.
    ///
    /// Send-only entry points produce no kernel reply, so delivery
    /// failures are not reported. Encoding failures still are.
    pub(crate) fn send_only(
        &mut self,
        id: SyscallId,
        dest: CPtr,
        label: Word,
        args: &[Word],
        caps: &[CPtr],
    ) -> crate::Result<()> {
        let info = message::encode(label, args, caps, &mut self.regs)?;
        log::trace!("{:?} dest={} words={}", id, dest, info.length());
        self.trampoline.syscall(id, dest, info, &mut self.regs);
        Ok(())
    }

    /// Perform a receive-family syscall on `dest`.
    ///
    /// Returns the delivered tag and the sender's badge. When the receive
    /// itself fails the kernel has no sender message to deliver; it flags
    /// the reply with [`RECV_ERROR_BADGE`] and puts the error code in the
    /// tag label, which is mapped back into the taxonomy here.
    pub(crate) fn receive(
        &mut self,
        id: SyscallId,
        dest: CPtr,
    ) -> crate::Result<(MessageInfo, Badge)> {
        let info = message::encode(0, &[], &[], &mut self.regs)?;
        let reply = self.trampoline.syscall(id, dest, info, &mut self.regs);
        if reply.badge == RECV_ERROR_BADGE {
            KernelError::check(reply.tag.label())?;
        }
        Ok((reply.tag, reply.badge))
    }

    /// The data words of the most recent reply or received message.
    ///
    /// `info` must be the tag returned by the call that produced the
    /// message; it bounds how much of the register area is meaningful.
    pub fn message(&self, info: MessageInfo) -> &[Word] {
        &self.regs.msg[..info.length()]
    }

    /// Yield the processor to the scheduler. Never fails.
    pub fn yield_now(&mut self) {
        self.trampoline.syscall(
            SyscallId::Yield,
            0,
            MessageInfo::from_raw(0),
            &mut self.regs,
        );
    }
}
