//! Notification words.

use ferrite_sys::{Badge, SyscallId};

use crate::cap::{CapRef, Notification};
use crate::invoke::InvocationContext;

impl CapRef<Notification> {
    /// OR this capability's badge into the notification word and wake any
    /// waiter. Never blocks, never reports delivery failure.
    pub fn signal(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<()> {
        ctx.send_only(SyscallId::Send, self.raw(), 0, &[], &[])
    }

    /// Block until the notification is signaled, then return and clear the
    /// accumulated badge word.
    pub fn wait(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<Badge> {
        let (_info, badge) = ctx.receive(SyscallId::Wait, self.raw())?;
        Ok(badge)
    }

    /// Non-blocking variant of [`wait`](Self::wait); returns zero when
    /// nothing is pending.
    pub fn poll(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<Badge> {
        let (_info, badge) = ctx.receive(SyscallId::NBWait, self.raw())?;
        Ok(badge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_mock::{MockKernel, Object};

    fn kernel_with_notification(slot: usize) -> MockKernel {
        let kernel = MockKernel::new();
        kernel.install(
            slot,
            Object::Notification {
                word: 0,
                pending: false,
            },
        );
        kernel
    }

    #[test]
    fn poll_returns_zero_when_idle() {
        let kernel = kernel_with_notification(21);
        let ntfn: CapRef<Notification> = CapRef::from_raw(21);
        let mut ctx = InvocationContext::new(&kernel);

        assert_eq!(ntfn.poll(&mut ctx).unwrap(), 0);
    }

    #[test]
    fn signal_then_wait_clears_the_word() {
        let kernel = kernel_with_notification(21);
        let ntfn: CapRef<Notification> = CapRef::from_raw(21);
        let mut ctx = InvocationContext::new(&kernel);

        ntfn.signal(&mut ctx).unwrap();
        ntfn.wait(&mut ctx).unwrap();
        assert_eq!(ntfn.poll(&mut ctx).unwrap(), 0);
        assert_eq!(kernel.notification_word(21), Some(0));
    }
}
