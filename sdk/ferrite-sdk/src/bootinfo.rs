//! Typed accessors over the kernel's boot information.
//!
//! The kernel maps one read-only boot info page into the root task and
//! passes its address at entry; [`BootInfoView`] is the one place that
//! address is trusted and turned into typed capability references.

use ferrite_sys::{init_slot, BootInfo, CPtr, UntypedDesc, Word, MAX_UNTYPED_DESCS};

use crate::cap::{CNode, CapRef, IrqControl, Page, Tcb, Untyped, VSpace};

/// A read-only view of the root task's boot information.
#[derive(Copy, Clone)]
pub struct BootInfoView<'a> {
    raw: &'a BootInfo,
}

impl<'a> BootInfoView<'a> {
    /// Adopt the boot info page at `ptr`.
    ///
    /// # Safety
    /// `ptr` must be the address the kernel passed at entry, mapped
    /// readable for the life of the program.
    pub unsafe fn from_ptr(ptr: *const BootInfo) -> BootInfoView<'static> {
        BootInfoView { raw: &*ptr }
    }

    /// View over an already-borrowed structure (test setups).
    pub fn new(raw: &'a BootInfo) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a BootInfo {
        self.raw
    }

    pub fn version(&self) -> Word {
        self.raw.version
    }

    /// Address of the initial thread's message-register backing frame.
    pub fn ipc_buffer(&self) -> Word {
        self.raw.ipc_buffer
    }

    pub fn root_cnode(&self) -> CapRef<CNode> {
        CapRef::from_raw(init_slot::ROOT_CNODE)
    }

    pub fn root_vspace(&self) -> CapRef<VSpace> {
        CapRef::from_raw(init_slot::ROOT_VSPACE)
    }

    pub fn root_tcb(&self) -> CapRef<Tcb> {
        CapRef::from_raw(init_slot::ROOT_TCB)
    }

    pub fn irq_control(&self) -> CapRef<IrqControl> {
        CapRef::from_raw(init_slot::IRQ_CONTROL)
    }

    pub fn boot_info_frame(&self) -> CapRef<Page> {
        CapRef::from_raw(init_slot::BOOT_INFO_FRAME)
    }

    /// Slots the root task may populate freely, in ascending order.
    pub fn empty_slots(&self) -> impl Iterator<Item = CPtr> + 'a {
        self.raw.empty.start..self.raw.empty.end
    }

    /// The untyped descriptors the kernel actually filled in.
    pub fn untyped(&self) -> &'a [UntypedDesc] {
        // A count beyond the array bound would be kernel misbehavior;
        // clamp rather than panic in an accessor.
        let count = self.raw.num_untyped.min(MAX_UNTYPED_DESCS);
        &self.raw.untyped_list[..count]
    }

    /// The capability and descriptor of untyped region `index`.
    pub fn untyped_cap(&self, index: usize) -> Option<(CapRef<Untyped>, &'a UntypedDesc)> {
        let desc = self.untyped().get(index)?;
        Some((CapRef::from_raw(self.raw.untyped.start + index), desc))
    }

    /// Smallest non-device untyped region of at least `size_bits`.
    pub fn find_untyped(&self, size_bits: u8) -> Option<(CapRef<Untyped>, &'a UntypedDesc)> {
        let (index, desc) = self
            .untyped()
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_device == 0 && d.size_bits >= size_bits)
            .min_by_key(|(_, d)| d.size_bits)?;
        Some((CapRef::from_raw(self.raw.untyped.start + index), desc))
    }

    /// The untyped region containing physical address `paddr`, if any.
    pub fn find_untyped_for_paddr(&self, paddr: Word) -> Option<(CapRef<Untyped>, &'a UntypedDesc)> {
        let (index, desc) = self.untyped().iter().enumerate().find(|(_, d)| {
            let size = (1 as Word) << d.size_bits;
            paddr >= d.paddr && paddr - d.paddr < size
        })?;
        Some((CapRef::from_raw(self.raw.untyped.start + index), desc))
    }

    /// Total bytes of non-device untyped memory handed to the root task.
    pub fn total_untyped_bytes(&self) -> u64 {
        self.untyped()
            .iter()
            .filter(|d| d.is_device == 0)
            .map(|d| 1u64 << d.size_bits)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrite_sys::{SlotRegion, MAX_UNTYPED_DESCS};

    const EMPTY_DESC: UntypedDesc = UntypedDesc {
        paddr: 0,
        size_bits: 0,
        is_device: 0,
        padding: [0; 6],
    };

    fn sample() -> BootInfo {
        let mut untyped_list = [EMPTY_DESC; MAX_UNTYPED_DESCS];
        untyped_list[0] = UntypedDesc {
            paddr: 0x4000_0000,
            size_bits: 20,
            is_device: 0,
            padding: [0; 6],
        };
        untyped_list[1] = UntypedDesc {
            paddr: 0x0900_0000,
            size_bits: 12,
            is_device: 1,
            padding: [0; 6],
        };
        untyped_list[2] = UntypedDesc {
            paddr: 0x4800_0000,
            size_bits: 16,
            is_device: 0,
            padding: [0; 6],
        };
        BootInfo {
            version: 1,
            node_id: 0,
            num_nodes: 1,
            ipc_buffer: 0x7f00_0000,
            empty: SlotRegion { start: 100, end: 104 },
            user_image_frames: SlotRegion { start: 20, end: 40 },
            untyped: SlotRegion { start: 40, end: 43 },
            root_cnode_size_bits: 12,
            num_untyped: 3,
            untyped_list,
        }
    }

    #[test]
    fn untyped_slice_is_bounded_by_the_reported_count() {
        let info = sample();
        let view = BootInfoView::new(&info);
        assert_eq!(view.untyped().len(), 3);
        assert!(view.untyped_cap(3).is_none());
    }

    #[test]
    fn untyped_caps_index_their_slot_region() {
        let info = sample();
        let view = BootInfoView::new(&info);
        let (cap, desc) = view.untyped_cap(2).unwrap();
        assert_eq!(cap.raw(), 42);
        assert_eq!(desc.size_bits, 16);
    }

    #[test]
    fn find_untyped_skips_device_memory_and_prefers_tight_fits() {
        let info = sample();
        let view = BootInfoView::new(&info);

        // The 2^12 region is device memory; the tightest RAM fit is 2^16.
        let (cap, desc) = view.find_untyped(12).unwrap();
        assert_eq!(cap.raw(), 42);
        assert_eq!(desc.size_bits, 16);

        assert!(view.find_untyped(21).is_none());
    }

    #[test]
    fn paddr_lookup_respects_region_bounds() {
        let info = sample();
        let view = BootInfoView::new(&info);

        let (cap, desc) = view.find_untyped_for_paddr(0x0900_0800).unwrap();
        assert_eq!(cap.raw(), 41);
        assert_eq!(desc.paddr, 0x0900_0000);

        // One past the end of the device region, and unmapped space.
        assert!(view.find_untyped_for_paddr(0x0900_1000).is_none());
        assert!(view.find_untyped_for_paddr(0x1234_5678).is_none());
    }

    #[test]
    fn empty_slots_walk_the_declared_range() {
        let info = sample();
        let view = BootInfoView::new(&info);
        let slots: std::vec::Vec<_> = view.empty_slots().collect();
        assert_eq!(slots, vec![100, 101, 102, 103]);
    }

    #[test]
    fn total_counts_ram_only() {
        let info = sample();
        let view = BootInfoView::new(&info);
        assert_eq!(view.total_untyped_bytes(), (1 << 20) + (1 << 16));
    }
}
