//! The real privileged transition for aarch64 targets.
//!
//! Register protocol on entry: syscall id in `x8`, destination capability
//! pointer in `x0`, packed message descriptor in `x1`, pointer to the
//! caller's message-register area in `x2`. On return the kernel leaves the
//! reply descriptor in `x0` and the badge in `x1`; reply data words are
//! written into the message-register area before the trap returns.

#![cfg(all(target_arch = "aarch64", not(test)))]

use crate::{CPtr, MessageInfo, MsgRegisters, RawReply, SyscallId, Trampoline};

/// Trampoline backed by the `svc #0` trap instruction.
///
/// Zero-sized; every Ferrite thread shares the one kernel. The exclusive
/// `&mut MsgRegisters` borrow in the trait signature is what keeps
/// concurrent invocations on one execution context unrepresentable.
#[derive(Debug, Default, Copy, Clone)]
pub struct KernelTrampoline;

impl Trampoline for KernelTrampoline {
    fn syscall(
        &self,
        id: SyscallId,
        dest: CPtr,
        info: MessageInfo,
        regs: &mut MsgRegisters,
    ) -> RawReply {
        let mut tag: usize;
        let mut badge: usize;
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") dest => tag,
                inlateout("x1") info.as_raw() => badge,
                inlateout("x2") regs as *mut MsgRegisters => _,
                inlateout("x8") id as usize => _,
            );
        }
        RawReply {
            tag: MessageInfo::from_raw(tag),
            badge,
        }
    }
}
