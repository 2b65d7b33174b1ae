//! Frame and translation-table mapping.

use ferrite_sys::{InvocationLabel, Word};

use crate::cap::{CapRef, CapRights, Page, PageTable, VSpace};
use crate::invoke::InvocationContext;

/// Architecture memory attribute bits, passed through to the kernel
/// unchanged. Zero requests the default cacheable mapping.
pub type MemoryAttrs = Word;

impl CapRef<Page> {
    /// Map this frame at `vaddr` in `vspace`.
    ///
    /// `vaddr` must be page aligned and the covering translation table
    /// must already be mapped; a frame maps at most once.
    pub fn map(
        &self,
        ctx: &mut InvocationContext<'_>,
        vspace: CapRef<VSpace>,
        vaddr: Word,
        rights: CapRights,
        attrs: MemoryAttrs,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::PageMap,
            &[vaddr, rights.bits(), attrs],
            &[vspace.raw()],
        )?;
        Ok(())
    }

    /// Remove this frame's mapping. Unmapping an unmapped frame is a
    /// no-op.
    pub fn unmap(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::PageUnmap, &[], &[])?;
        Ok(())
    }
}

impl CapRef<PageTable> {
    /// Install this table to cover the region containing `vaddr` in
    /// `vspace`.
    pub fn map(
        &self,
        ctx: &mut InvocationContext<'_>,
        vspace: CapRef<VSpace>,
        vaddr: Word,
        attrs: MemoryAttrs,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::PageTableMap,
            &[vaddr, attrs],
            &[vspace.raw()],
        )?;
        Ok(())
    }

    /// Remove this table from its address space.
    pub fn unmap(&self, ctx: &mut InvocationContext<'_>) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::PageTableUnmap, &[], &[])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IpcError, KernelError};
    use ferrite_mock::{MockKernel, Object};
    use ferrite_sys::init_slot;

    fn vspace() -> CapRef<VSpace> {
        CapRef::from_raw(init_slot::ROOT_VSPACE)
    }

    #[test]
    fn map_unmap_map_cycles() {
        let kernel = MockKernel::new();
        kernel.install(50, Object::Page { mapped: false });
        let page: CapRef<Page> = CapRef::from_raw(50);
        let mut ctx = InvocationContext::new(&kernel);

        page.map(&mut ctx, vspace(), 0x8000_0000, CapRights::READ | CapRights::WRITE, 0)
            .unwrap();
        let err = page
            .map(&mut ctx, vspace(), 0x8000_1000, CapRights::READ, 0)
            .unwrap_err();
        assert_eq!(err, IpcError::Kernel(KernelError::IllegalOperation));

        page.unmap(&mut ctx).unwrap();
        page.map(&mut ctx, vspace(), 0x8000_1000, CapRights::READ, 0)
            .unwrap();
    }

    #[test]
    fn unaligned_vaddr_is_invalid_argument() {
        let kernel = MockKernel::new();
        kernel.install(50, Object::Page { mapped: false });
        let page: CapRef<Page> = CapRef::from_raw(50);
        let mut ctx = InvocationContext::new(&kernel);

        let err = page
            .map(&mut ctx, vspace(), 0x8000_0123, CapRights::READ, 0)
            .unwrap_err();
        assert_eq!(err, IpcError::Kernel(KernelError::InvalidArgument));
    }

    #[test]
    fn page_table_map_is_once_only() {
        let kernel = MockKernel::new();
        kernel.install(51, Object::PageTable { mapped: false });
        let table: CapRef<PageTable> = CapRef::from_raw(51);
        let mut ctx = InvocationContext::new(&kernel);

        table.map(&mut ctx, vspace(), 0x8020_0000, 0).unwrap();
        let err = table.map(&mut ctx, vspace(), 0x8040_0000, 0).unwrap_err();
        assert_eq!(err, IpcError::Kernel(KernelError::IllegalOperation));
    }
}
