//! Interrupt control and handler capabilities.

use ferrite_sys::{CPtr, InvocationLabel, Word};

use crate::cap::{CNode, CapRef, IrqControl, IrqHandler, Notification};
use crate::invoke::InvocationContext;

impl CapRef<IrqControl> {
    /// Mint the handler capability for interrupt line `irq` into
    /// `dest_index` under `dest_root`.
    ///
    /// Each line has one handler; asking again for a taken line fails.
    pub fn get(
        &self,
        ctx: &mut InvocationContext<'_>,
        irq: Word,
        dest_root: CapRef<CNode>,
        dest_index: CPtr,
    ) -> crate::Result<CapRef<IrqHandler>> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::IrqControlGet,
            &[irq, dest_index],
            &[dest_root.raw()],
        )?;
        Ok(CapRef::from_raw(dest_index))
    }
}

impl CapRef<IrqHandler> {
    /// Deliver this line's interrupts as signals on `ntfn`.
    pub fn set_notification(
        &self,
        ctx: &mut InvocationContext<'_>,
        ntfn: CapRef<Notification>,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::IrqHandlerSetNotification,
            &[],
            &[ntfn.raw()],
        )?;
        Ok(())
    }

    /// Re-enable the line after servicing an interrupt.
    pub fn ack(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::IrqHandlerAck, &[], &[])?;
        Ok(())
    }

    /// Detach the notification, leaving the line masked.
    pub fn clear(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::IrqHandlerClear, &[], &[])?;
        Ok(())
    }
}
