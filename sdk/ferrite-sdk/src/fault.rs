//! Decoding of kernel-delivered fault messages.
//!
//! When a thread faults, the kernel synthesizes a message on the thread's
//! fault endpoint; the tag label names the record layout and the message
//! words carry the fields. Decoding is total: a label or length this
//! binding does not understand becomes [`Fault::Unknown`] instead of a
//! panic, so a fault handler can always at least log what it saw.

use ferrite_sys::{fault_label, MessageInfo, MsgRegisters, Word};

/// A decoded fault record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Page fault: the thread touched `addr` without a valid mapping.
    VmFault {
        ip: Word,
        addr: Word,
        /// True when the fault was an instruction fetch.
        is_instruction: bool,
        /// Architecture fault status, passed through undecoded.
        fsr: Word,
    },
    /// Capability lookup failed during an invocation or receive.
    CapFault {
        ip: Word,
        /// The capability pointer that failed to resolve.
        addr: Word,
        in_receive: bool,
    },
    /// The thread executed a syscall number the kernel does not know.
    UnknownSyscall { syscall: Word },
    /// A hardware exception not covered by the other variants.
    UserException {
        ip: Word,
        sp: Word,
        number: Word,
        code: Word,
    },
    /// A record this binding cannot decode; the raw label is preserved.
    Unknown { label: Word },
}

impl Fault {
    /// Decode the fault message described by `info` out of `regs`.
    pub fn decode(info: MessageInfo, regs: &MsgRegisters) -> Fault {
        let words = &regs.msg[..info.length()];
        match (info.label(), words) {
            (fault_label::VM_FAULT, &[ip, addr, is_instruction, fsr]) => Fault::VmFault {
                ip,
                addr,
                is_instruction: is_instruction != 0,
                fsr,
            },
            (fault_label::CAP_FAULT, &[ip, addr, in_receive]) => Fault::CapFault {
                ip,
                addr,
                in_receive: in_receive != 0,
            },
            (fault_label::UNKNOWN_SYSCALL, &[syscall]) => Fault::UnknownSyscall { syscall },
            (fault_label::USER_EXCEPTION, &[ip, sp, number, code]) => Fault::UserException {
                ip,
                sp,
                number,
                code,
            },
            (label, _) => Fault::Unknown { label },
        }
    }
}
