//! Layout of the kernel-populated boot information structure.
//!
//! The kernel maps one read-only `BootInfo` page into the root task's
//! address space and passes its address in the first argument register at
//! entry. This module only pins down the field layout (aarch64); typed
//! accessors live in `ferrite-sdk::bootinfo`.

use static_assertions::{const_assert, const_assert_eq};

use crate::{CPtr, Word};

/// Fixed slots in the root task's initial capability space.
///
/// Slot 0 is kept empty so that a zero `CPtr` can never name a live
/// capability by accident.
pub mod init_slot {
    use crate::CPtr;

    pub const NULL: CPtr = 0;
    pub const ROOT_CNODE: CPtr = 1;
    pub const ROOT_VSPACE: CPtr = 2;
    pub const ROOT_TCB: CPtr = 3;
    pub const IRQ_CONTROL: CPtr = 4;
    pub const BOOT_INFO_FRAME: CPtr = 5;

    /// First slot after the kernel-populated ones.
    pub const FIRST_FREE: CPtr = 6;
}

/// Upper bound on untyped descriptors the kernel reports.
pub const MAX_UNTYPED_DESCS: usize = 230;

/// A `[start, end)` range of capability slots.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SlotRegion {
    pub start: CPtr,
    pub end: CPtr,
}

/// Describes one untyped memory capability handed to the root task.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct UntypedDesc {
    /// Physical address of the region.
    pub paddr: Word,
    /// log2 of the region size.
    pub size_bits: u8,
    /// Non-zero when the region is device memory (never zeroed, not
    /// usable for kernel objects).
    pub is_device: u8,
    pub padding: [u8; 6],
}

/// The boot information structure, field order fixed by the kernel.
///
/// Consumed, never constructed, by user level. All slot references index
/// the root task's own capability space.
#[repr(C)]
pub struct BootInfo {
    /// ABI version stamp; the kernel bumps this on layout changes.
    pub version: Word,
    /// Identity of the boot node in a multikernel configuration.
    pub node_id: Word,
    pub num_nodes: Word,
    /// Address of the initial thread's message-register backing frame.
    pub ipc_buffer: Word,
    /// Slots the root task may populate freely.
    pub empty: SlotRegion,
    /// Frames backing the loaded root task image.
    pub user_image_frames: SlotRegion,
    /// Slots holding the untyped capabilities described by `untyped_list`.
    pub untyped: SlotRegion,
    /// log2 size of the root CNode.
    pub root_cnode_size_bits: Word,
    pub num_untyped: Word,
    pub untyped_list: [UntypedDesc; MAX_UNTYPED_DESCS],
}

// The kernel writes this structure byte-for-byte; any drift here is silent
// corruption on the reader side.
const_assert_eq!(core::mem::size_of::<UntypedDesc>(), 2 * core::mem::size_of::<Word>());
const_assert_eq!(core::mem::size_of::<SlotRegion>(), 2 * core::mem::size_of::<Word>());
const_assert_eq!(
    core::mem::size_of::<BootInfo>(),
    (12 + 2 * MAX_UNTYPED_DESCS) * core::mem::size_of::<Word>()
);
// One page must hold the whole structure.
const_assert!(core::mem::size_of::<BootInfo>() <= 4096);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untyped_desc_is_two_words() {
        // Padding keeps the array stride predictable across compilers.
        assert_eq!(core::mem::size_of::<UntypedDesc>(), 16);
    }

    #[test]
    fn init_slots_are_disjoint() {
        let slots = [
            init_slot::NULL,
            init_slot::ROOT_CNODE,
            init_slot::ROOT_VSPACE,
            init_slot::ROOT_TCB,
            init_slot::IRQ_CONTROL,
            init_slot::BOOT_INFO_FRAME,
        ];
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(init_slot::FIRST_FREE > init_slot::BOOT_INFO_FRAME);
    }
}
