//! Untyped memory: the retype operation.

use ferrite_sys::{CPtr, InvocationLabel, Word};

use crate::cap::{CNode, CapRef, Retypable, Untyped};
use crate::invoke::InvocationContext;

impl CapRef<Untyped> {
    /// Carve an object of class `T` out of this untyped region and place
    /// its capability at `dest_index` in `dest_root`.
    ///
    /// The returned reference is tagged with the requested class; the
    /// kernel guarantees the slot holds that class on success. `size_bits`
    /// is the log2 object size for variable-sized classes and ignored for
    /// fixed-size ones.
    pub fn retype<T: Retypable>(
        &self,
        ctx: &mut InvocationContext<'_>,
        dest_root: CapRef<CNode>,
        dest_index: CPtr,
        size_bits: u8,
    ) -> crate::Result<CapRef<T>> {
        ctx.invoke(
            self.raw(),
            InvocationLabel::UntypedRetype,
            &[T::TYPE_CODE, size_bits as Word, dest_index],
            &[dest_root.raw()],
        )?;
        Ok(CapRef::from_raw(dest_index))
    }
}
