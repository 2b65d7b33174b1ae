//! Synchronous IPC endpoints.

use ferrite_sys::{Badge, CPtr, InvocationLabel, MessageInfo, SyscallId, Word};

use crate::cap::{CapRef, Endpoint};
use crate::invoke::InvocationContext;

impl CapRef<Endpoint> {
    /// Send a message, blocking until a receiver takes it.
    ///
    /// Send-only delivery reports nothing back; a missing or unwritable
    /// capability drops the message silently. Only encoding failures
    /// surface.
    pub fn send(
        &self,
        ctx: &mut InvocationContext<'_>,
        words: &[Word],
        caps: &[CPtr],
    ) -> crate::Result<()> {
        ctx.send_only(
            SyscallId::Send,
            self.raw(),
            InvocationLabel::EndpointSend as Word,
            words,
            caps,
        )
    }

    /// Send without blocking; the message is dropped if no receiver is
    /// ready and no queue space remains.
    pub fn nb_send(
        &self,
        ctx: &mut InvocationContext<'_>,
        words: &[Word],
        caps: &[CPtr],
    ) -> crate::Result<()> {
        ctx.send_only(
            SyscallId::NBSend,
            self.raw(),
            InvocationLabel::EndpointSend as Word,
            words,
            caps,
        )
    }

    /// Send and block for the receiver's reply.
    ///
    /// Returns the reply tag; reply words are read through
    /// [`InvocationContext::message`].
    pub fn call(
        &self,
        ctx: &mut InvocationContext<'_>,
        words: &[Word],
        caps: &[CPtr],
    ) -> crate::Result<MessageInfo> {
        ctx.invoke(self.raw(), InvocationLabel::EndpointSend, words, caps)
    }

    /// Block until a message arrives.
    ///
    /// Returns the sender's tag and badge; message words are read through
    /// [`InvocationContext::message`] bounded by the returned tag.
    pub fn recv(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<(MessageInfo, Badge)> {
        ctx.receive(SyscallId::Recv, self.raw())
    }
}
