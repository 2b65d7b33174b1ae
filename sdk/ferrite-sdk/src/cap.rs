//! Typed capability references.
//!
//! A [`CapRef<T>`] is a raw slot index with a compile-time class tag and
//! nothing else: same size, same alignment, same cost as a bare `CPtr`.
//! The tag is never checked at runtime; the kernel checks the slot's real
//! class at invocation time and the binding surfaces its rejection as
//! [`KernelError::InvalidCapability`](crate::KernelError::InvalidCapability).
//!
//! Construction from a raw integer happens only at trust boundaries (boot
//! info parsing, capability receipt, retype results) through the explicit
//! [`CapRef::from_raw`] conversion, which keeps those sites auditable.

use core::fmt::{Debug, Formatter};
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use bitflags::bitflags;
use ferrite_sys::{object_type, CPtr, Word};

mod sealed {
    pub trait Sealed {}
}

/// A kernel object class, usable as a [`CapRef`] tag.
pub trait ObjectClass: sealed::Sealed {
    /// The kernel's type code for this class.
    const TYPE_CODE: Word;
    /// Class name used in `Debug` output.
    const NAME: &'static str;
}

/// Classes that `Untyped::retype` can produce.
pub trait Retypable: ObjectClass {}

macro_rules! object_class {
    ($(#[$meta:meta])* $name:ident, $code:expr) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq)]
        pub struct $name;

        impl sealed::Sealed for $name {}
        impl ObjectClass for $name {
            const TYPE_CODE: Word = $code;
            const NAME: &'static str = stringify!($name);
        }
    };
    ($(#[$meta:meta])* $name:ident, $code:expr, retypable) => {
        object_class!($(#[$meta])* $name, $code);
        impl Retypable for $name {}
    };
}

object_class!(
    /// Untyped memory, the source of all other objects.
    Untyped, object_type::UNTYPED, retypable
);
object_class!(
    /// A thread control block.
    Tcb, object_type::TCB, retypable
);
object_class!(
    /// A synchronous IPC endpoint.
    Endpoint, object_type::ENDPOINT, retypable
);
object_class!(
    /// A notification word for lightweight signaling.
    Notification, object_type::NOTIFICATION, retypable
);
object_class!(
    /// A capability table node.
    CNode, object_type::CNODE, retypable
);
object_class!(
    /// A physical memory frame.
    Page, object_type::PAGE, retypable
);
object_class!(
    /// An intermediate translation table.
    PageTable, object_type::PAGE_TABLE, retypable
);
object_class!(
    /// A top-level address space.
    VSpace, object_type::VSPACE, retypable
);
object_class!(
    /// The authority to hand out interrupt handlers. Kernel-minted only.
    IrqControl, object_type::IRQ_CONTROL
);
object_class!(
    /// The authority over one interrupt line. Kernel-minted only.
    IrqHandler, object_type::IRQ_HANDLER
);

bitflags! {
    /// Capability right bits, encoding fixed by the kernel.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
    pub struct CapRights: Word {
        const READ = 0b0001;
        const WRITE = 0b0010;
        const GRANT = 0b0100;
        const GRANT_REPLY = 0b1000;
    }
}

impl CapRights {
    pub const fn all_rights() -> Self {
        Self::READ
            .union(Self::WRITE)
            .union(Self::GRANT)
            .union(Self::GRANT_REPLY)
    }
}

/// A non-owning, class-tagged reference to a capability slot.
///
/// ```compile_fail
/// use ferrite_sdk::cap::{CapRef, Endpoint, Tcb};
///
/// let ep: CapRef<Endpoint> = CapRef::from_raw(10);
/// let tcb: CapRef<Tcb> = ep; // class tags do not unify
/// ```
#[repr(transparent)]
pub struct CapRef<T: ObjectClass> {
    cptr: CPtr,
    _class: PhantomData<T>,
}

impl<T: ObjectClass> CapRef<T> {
    /// Adopt a raw slot index as a reference of class `T`.
    ///
    /// Whoever produced the integer vouches for the class: boot info for
    /// the initial capabilities, the retype path for created objects, the
    /// transfer slots for received ones. Nothing is validated here; an
    /// untrue tag shows up later as a kernel `InvalidCapability` rejection.
    #[inline(always)]
    pub const fn from_raw(cptr: CPtr) -> Self {
        Self {
            cptr,
            _class: PhantomData,
        }
    }

    /// The raw slot index.
    #[inline(always)]
    pub const fn raw(&self) -> CPtr {
        self.cptr
    }

    /// Re-tag this reference as class `U`.
    ///
    /// The single, explicit escape hatch; keep call sites rare and
    /// commented.
    #[inline(always)]
    pub const fn cast<U: ObjectClass>(self) -> CapRef<U> {
        CapRef::from_raw(self.cptr)
    }
}

// Manual impls so the derives do not put bounds on `T`.
impl<T: ObjectClass> Copy for CapRef<T> {}
impl<T: ObjectClass> Clone for CapRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: ObjectClass> PartialEq for CapRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cptr == other.cptr
    }
}
impl<T: ObjectClass> Eq for CapRef<T> {}
impl<T: ObjectClass> Hash for CapRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cptr.hash(state);
    }
}
impl<T: ObjectClass> Debug for CapRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "CapRef<{}>({})", T::NAME, self.cptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_runtime_representation_difference() {
        assert_eq!(
            core::mem::size_of::<CapRef<Endpoint>>(),
            core::mem::size_of::<CPtr>()
        );
        assert_eq!(
            core::mem::align_of::<CapRef<Endpoint>>(),
            core::mem::align_of::<CPtr>()
        );
    }

    #[test]
    fn raw_round_trip() {
        let cap: CapRef<Tcb> = CapRef::from_raw(77);
        assert_eq!(cap.raw(), 77);
        assert_eq!(cap, CapRef::from_raw(77));
    }

    #[test]
    fn cast_is_explicit_and_value_preserving() {
        let cap: CapRef<Endpoint> = CapRef::from_raw(5);
        let as_tcb: CapRef<Tcb> = cap.cast();
        assert_eq!(as_tcb.raw(), 5);
    }

    #[test]
    fn debug_names_the_class() {
        let cap: CapRef<Notification> = CapRef::from_raw(3);
        assert_eq!(format!("{:?}", cap), "CapRef<Notification>(3)");
    }
}
