//! Syscall ids and invocation method labels.
//!
//! A syscall id selects the privileged entry point (call, send, wait, ...);
//! an invocation label selects the method the kernel performs on the target
//! capability. Every label has a fixed expected target class and a fixed
//! argument shape; both tables below mirror the kernel's dispatch tables.

use crate::{object_type, Word};

/// Privileged entry points.
///
/// `Call` blocks until the kernel replies. `Send`/`NBSend` are the
/// send-only variants and produce no reply. `Recv`/`Wait`/`NBWait` block on
/// (or poll) a receive-capable capability.
#[repr(usize)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SyscallId {
    Call = 1,
    Send = 2,
    NBSend = 3,
    Recv = 4,
    Wait = 5,
    NBWait = 6,
    Yield = 7,
}

/// The declared argument shape of an invocation label.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Arity {
    /// Number of data words, or `None` for labels carrying a caller-sized
    /// payload (endpoint IPC, register dumps).
    pub words: Option<usize>,
    /// Number of extra capabilities transferred alongside the message.
    pub caps: usize,
}

const fn fixed(words: usize, caps: usize) -> Arity {
    Arity { words: Some(words), caps }
}

const fn variable(caps: usize) -> Arity {
    Arity { words: None, caps }
}

/// Invocation method labels, scoped per object class.
///
/// Numbering leaves the low values to the fault-message protocol (see
/// [`fault_label`](crate::fault_label)) and groups labels by class the way
/// the kernel's decode tables do. The numeric values are ABI.
#[repr(usize)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InvocationLabel {
    // Endpoint IPC carries a user payload; the label is fixed, the shape is not.
    EndpointSend = 8,

    UntypedRetype = 16,

    TcbConfigure = 24,
    TcbSetPriority = 25,
    TcbWriteRegisters = 26,
    TcbResume = 27,
    TcbSuspend = 28,
    TcbBindNotification = 29,

    CNodeCopy = 32,
    CNodeMint = 33,
    CNodeMove = 34,
    CNodeDelete = 35,
    CNodeRevoke = 36,

    PageMap = 40,
    PageUnmap = 41,

    PageTableMap = 44,
    PageTableUnmap = 45,

    IrqControlGet = 48,
    IrqHandlerSetNotification = 49,
    IrqHandlerAck = 50,
    IrqHandlerClear = 51,
}

impl InvocationLabel {
    /// The object type code this label may be invoked on.
    pub const fn expected_class(&self) -> Word {
        use InvocationLabel::*;
        match self {
            EndpointSend => object_type::ENDPOINT,
            UntypedRetype => object_type::UNTYPED,
            TcbConfigure | TcbSetPriority | TcbWriteRegisters | TcbResume | TcbSuspend
            | TcbBindNotification => object_type::TCB,
            CNodeCopy | CNodeMint | CNodeMove | CNodeDelete | CNodeRevoke => object_type::CNODE,
            PageMap | PageUnmap => object_type::PAGE,
            PageTableMap | PageTableUnmap => object_type::PAGE_TABLE,
            IrqControlGet => object_type::IRQ_CONTROL,
            IrqHandlerSetNotification | IrqHandlerAck | IrqHandlerClear => object_type::IRQ_HANDLER,
        }
    }

    /// The declared argument shape, mirroring the kernel's decoder.
    pub const fn arity(&self) -> Arity {
        use InvocationLabel::*;
        match self {
            EndpointSend => variable(0),
            // obj_type, size_bits, dest_index + dest cnode cap
            UntypedRetype => fixed(3, 1),
            // fault_ep cptr, cspace_data, vspace_data, buf_addr + cspace, vspace, buf_frame
            TcbConfigure => fixed(4, 3),
            // priority + authority tcb
            TcbSetPriority => fixed(1, 1),
            // resume flag, count, then `count` register words
            TcbWriteRegisters => variable(0),
            TcbResume => fixed(0, 0),
            TcbSuspend => fixed(0, 0),
            TcbBindNotification => fixed(0, 1),
            // src_index, dest_index, rights + src cnode
            CNodeCopy => fixed(3, 1),
            // src_index, dest_index, rights, badge + src cnode
            CNodeMint => fixed(4, 1),
            // src_index, dest_index + src cnode
            CNodeMove => fixed(2, 1),
            CNodeDelete => fixed(1, 0),
            CNodeRevoke => fixed(1, 0),
            // vaddr, rights, attrs + vspace
            PageMap => fixed(3, 1),
            PageUnmap => fixed(0, 0),
            // vaddr, attrs + vspace
            PageTableMap => fixed(2, 1),
            PageTableUnmap => fixed(0, 0),
            // irq, dest_index + dest cnode
            IrqControlGet => fixed(2, 1),
            IrqHandlerSetNotification => fixed(0, 1),
            IrqHandlerAck => fixed(0, 0),
            IrqHandlerClear => fixed(0, 0),
        }
    }

    /// Reconstruct a label from a raw tag value.
    pub const fn from_raw(raw: Word) -> Option<Self> {
        use InvocationLabel::*;
        Some(match raw {
            8 => EndpointSend,
            16 => UntypedRetype,
            24 => TcbConfigure,
            25 => TcbSetPriority,
            26 => TcbWriteRegisters,
            27 => TcbResume,
            28 => TcbSuspend,
            29 => TcbBindNotification,
            32 => CNodeCopy,
            33 => CNodeMint,
            34 => CNodeMove,
            35 => CNodeDelete,
            36 => CNodeRevoke,
            40 => PageMap,
            41 => PageUnmap,
            44 => PageTableMap,
            45 => PageTableUnmap,
            48 => IrqControlGet,
            49 => IrqHandlerSetNotification,
            50 => IrqHandlerAck,
            51 => IrqHandlerClear,
            _ => return None,
        })
    }

    /// All labels, in dispatch-table order. Used by the round-trip tests
    /// and by the mock's decoder sanity checks.
    pub const ALL: [InvocationLabel; 21] = {
        use InvocationLabel::*;
        [
            EndpointSend,
            UntypedRetype,
            TcbConfigure,
            TcbSetPriority,
            TcbWriteRegisters,
            TcbResume,
            TcbSuspend,
            TcbBindNotification,
            CNodeCopy,
            CNodeMint,
            CNodeMove,
            CNodeDelete,
            CNodeRevoke,
            PageMap,
            PageUnmap,
            PageTableMap,
            PageTableUnmap,
            IrqControlGet,
            IrqHandlerSetNotification,
            IrqHandlerAck,
            IrqHandlerClear,
        ]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip_covers_every_label() {
        for label in InvocationLabel::ALL {
            assert_eq!(InvocationLabel::from_raw(label as Word), Some(label));
        }
    }

    #[test]
    fn unknown_raw_label_is_none() {
        assert_eq!(InvocationLabel::from_raw(9999), None);
        assert_eq!(InvocationLabel::from_raw(0), None);
    }

    #[test]
    fn cap_counts_fit_transfer_slots() {
        for label in InvocationLabel::ALL {
            assert!(label.arity().caps <= crate::MSG_MAX_EXTRA_CAPS);
        }
    }
}
