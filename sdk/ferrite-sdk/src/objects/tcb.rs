//! Thread control blocks.

use ferrite_sys::{InvocationLabel, Word, MSG_MAX_LENGTH};

use crate::cap::{CNode, CapRef, Endpoint, Notification, Page, Tcb, VSpace};
use crate::error::IpcError;
use crate::invoke::InvocationContext;

/// Register count budget for [`CapRef::<Tcb>::write_registers`]: the
/// payload carries a resume flag and a count word ahead of the registers.
const REG_WORDS_MAX: usize = MSG_MAX_LENGTH - 2;

impl CapRef<Tcb> {
    /// Set the thread's capability space, address space, fault endpoint
    /// and IPC buffer in one operation.
    ///
    /// `cspace_data` and `vspace_data` are guard/ASID configuration words
    /// interpreted by the kernel; `buf_addr` is the virtual address the
    /// buffer frame is expected to back.
    #[allow(clippy::too_many_arguments)]
    pub fn configure(
        &self,
        ctx: &mut InvocationContext<'_>,
        fault_ep: CapRef<Endpoint>,
        cspace: CapRef<CNode>,
        cspace_data: Word,
        vspace: CapRef<VSpace>,
        vspace_data: Word,
        buf_addr: Word,
        buf_frame: CapRef<Page>,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::TcbConfigure,
            &[fault_ep.raw(), cspace_data, vspace_data, buf_addr],
            &[cspace.raw(), vspace.raw(), buf_frame.raw()],
        )?;
        Ok(())
    }

    /// Set the thread's priority, authorized by `authority`.
    pub fn set_priority(
        &self,
        ctx: &mut InvocationContext<'_>,
        authority: CapRef<Tcb>,
        priority: u8,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::TcbSetPriority,
            &[priority as Word],
            &[authority.raw()],
        )?;
        Ok(())
    }

    /// Load `regs` into the thread's register file, optionally resuming
    /// it afterwards.
    pub fn write_registers(
        &self,
        ctx: &mut InvocationContext<'_>,
        resume: bool,
        regs: &[Word],
    ) -> crate::Result<()> {
        if regs.len() > REG_WORDS_MAX {
            return Err(IpcError::MessageTooLong {
                words: 2 + regs.len(),
                caps: 0,
            });
        }
        let mut payload = [0 as Word; MSG_MAX_LENGTH];
        payload[0] = resume as Word;
        payload[1] = regs.len() as Word;
        payload[2..2 + regs.len()].copy_from_slice(regs);
        ctx.invoke(
            self.raw(),
            InvocationLabel::TcbWriteRegisters,
            &payload[..2 + regs.len()],
            &[],
        )?;
        Ok(())
    }

    /// Make the thread runnable. Fails until the thread is configured.
    pub fn resume(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::TcbResume, &[], &[])?;
        Ok(())
    }

    /// Take the thread off the scheduler.
    pub fn suspend(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::TcbSuspend, &[], &[])?;
        Ok(())
    }

    /// Bind a notification so signals are delivered to the thread's
    /// receive path. A thread holds at most one binding.
    pub fn bind_notification(
        &self,
        ctx: &mut InvocationContext<'_>,
        ntfn: CapRef<Notification>,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::TcbBindNotification,
            &[],
            &[ntfn.raw()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use ferrite_mock::{MockKernel, Object};
    use ferrite_sys::{init_slot, CPtr};

    fn fresh_tcb(kernel: &MockKernel, slot: CPtr) -> CapRef<Tcb> {
        kernel.install(
            slot,
            Object::Tcb {
                configured: false,
                bound_notification: None,
            },
        );
        CapRef::from_raw(slot)
    }

    #[test]
    fn resume_before_configure_is_illegal() {
        let kernel = MockKernel::new();
        let tcb = fresh_tcb(&kernel, 30);
        let mut ctx = InvocationContext::new(&kernel);

        let err = tcb.resume(&mut ctx).unwrap_err();
        assert_eq!(err, IpcError::Kernel(KernelError::IllegalOperation));
    }

    #[test]
    fn configure_then_resume_succeeds() {
        let kernel = MockKernel::new();
        let tcb = fresh_tcb(&kernel, 30);
        kernel.install(
            31,
            Object::Endpoint {
                queue: Default::default(),
            },
        );
        let mut ctx = InvocationContext::new(&kernel);

        tcb.configure(
            &mut ctx,
            CapRef::from_raw(31),
            CapRef::from_raw(init_slot::ROOT_CNODE),
            0,
            CapRef::from_raw(init_slot::ROOT_VSPACE),
            0,
            0x4000_0000,
            CapRef::from_raw(init_slot::BOOT_INFO_FRAME),
        )
        .unwrap();
        tcb.resume(&mut ctx).unwrap();
    }

    #[test]
    fn write_registers_frames_the_payload() {
        let kernel = MockKernel::new();
        let tcb = fresh_tcb(&kernel, 30);
        let mut ctx = InvocationContext::new(&kernel);
        tcb.configure(
            &mut ctx,
            CapRef::from_raw(0),
            CapRef::from_raw(init_slot::ROOT_CNODE),
            0,
            CapRef::from_raw(init_slot::ROOT_VSPACE),
            0,
            0,
            CapRef::from_raw(init_slot::BOOT_INFO_FRAME),
        )
        .unwrap();

        tcb.write_registers(&mut ctx, true, &[0x1000, 0x2000]).unwrap();

        let seen = kernel.last_invocation().unwrap();
        assert_eq!(seen.args, vec![1, 2, 0x1000, 0x2000]);
    }

    #[test]
    fn write_registers_rejects_oversized_dumps() {
        let kernel = MockKernel::new();
        let tcb = fresh_tcb(&kernel, 30);
        let mut ctx = InvocationContext::new(&kernel);

        let regs = [0; MSG_MAX_LENGTH];
        let err = tcb.write_registers(&mut ctx, false, &regs).unwrap_err();
        assert!(matches!(err, IpcError::MessageTooLong { .. }));
    }

    #[test]
    fn double_bind_is_rejected() {
        let kernel = MockKernel::new();
        let tcb = fresh_tcb(&kernel, 30);
        kernel.install(
            32,
            Object::Notification {
                word: 0,
                pending: false,
            },
        );
        let mut ctx = InvocationContext::new(&kernel);

        let ntfn: CapRef<Notification> = CapRef::from_raw(32);
        tcb.bind_notification(&mut ctx, ntfn).unwrap();
        let err = tcb.bind_notification(&mut ctx, ntfn).unwrap_err();
        assert_eq!(err, IpcError::Kernel(KernelError::IllegalOperation));
    }
}
