//! Capability table operations.
//!
//! Slot indices here are resolved in the invoked CNode; the extra
//! capability names the source root for the cross-space variants. Rights
//! on derivation are monotone: the kernel rejects any attempt to widen.

use ferrite_sys::{Badge, CPtr, InvocationLabel};

use crate::cap::{CNode, CapRef, CapRights};
use crate::invoke::InvocationContext;

impl CapRef<CNode> {
    /// Copy the capability at `src_index` in `src_root` to `dest_index`
    /// here, masked down to `rights`.
    pub fn copy(
        &self,
        ctx: &mut InvocationContext<'_>,
        src_root: CapRef<CNode>,
        src_index: CPtr,
        dest_index: CPtr,
        rights: CapRights,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::CNodeCopy,
            &[src_index, dest_index, rights.bits()],
            &[src_root.raw()],
        )?;
        Ok(())
    }

    /// Copy with a badge stamped on. Only unbadged capabilities can be
    /// minted from.
    pub fn mint(
        &self,
        ctx: &mut InvocationContext<'_>,
        src_root: CapRef<CNode>,
        src_index: CPtr,
        dest_index: CPtr,
        rights: CapRights,
        badge: Badge,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::CNodeMint,
            &[src_index, dest_index, rights.bits(), badge],
            &[src_root.raw()],
        )?;
        Ok(())
    }

    /// Move the capability at `src_index` in `src_root` to `dest_index`
    /// here, leaving the source slot empty.
    pub fn move_(
        &self,
        ctx: &mut InvocationContext<'_>,
        src_root: CapRef<CNode>,
        src_index: CPtr,
        dest_index: CPtr,
    ) -> crate::Result<()> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::CNodeMove,
            &[src_index, dest_index],
            &[src_root.raw()],
        )?;
        Ok(())
    }

    /// Empty the slot at `index`. Descendant capabilities elsewhere are
    /// unaffected.
    pub fn delete(&self, ctx: &mut InvocationContext<'_>, index: CPtr) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::CNodeDelete, &[index], &[])?;
        Ok(())
    }

    /// Delete the capability at `index` together with everything derived
    /// from it.
    pub fn revoke(&self, ctx: &mut InvocationContext<'_>, index: CPtr) -> crate::Result<()> {
        ctx.invoke(self.raw(), InvocationLabel::CNodeRevoke, &[index], &[])?;
        Ok(())
    }
}
