//! The simulated capability space.
//!
//! Kernel objects live in an arena; capability slots reference them by id,
//! so a copied or minted capability aliases the same object the way real
//! capabilities do. Entries additionally track the rights and badge stamped
//! onto the capability and the slot it was derived from, so revocation can
//! sweep descendants the way the kernel's derivation tree does.

use std::collections::{HashMap, VecDeque};

use ferrite_sys::{object_type, Badge, CPtr, Word};

/// Capability right bits, matching the kernel's encoding.
pub const RIGHT_READ: Word = 0b0001;
pub const RIGHT_WRITE: Word = 0b0010;
pub const RIGHT_GRANT: Word = 0b0100;
pub const RIGHT_GRANT_REPLY: Word = 0b1000;
pub const RIGHTS_ALL: Word = RIGHT_READ | RIGHT_WRITE | RIGHT_GRANT | RIGHT_GRANT_REPLY;

/// Arena index of a simulated kernel object.
pub type ObjId = usize;

/// A message parked in an endpoint queue.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub label: Word,
    pub badge: Badge,
    pub words: Vec<Word>,
}

/// A simulated kernel object.
#[derive(Debug)]
pub enum Object {
    Untyped { size_bits: u8 },
    Tcb { configured: bool, bound_notification: Option<ObjId> },
    Endpoint { queue: VecDeque<QueuedMessage> },
    Notification { word: Word, pending: bool },
    CNode,
    Page { mapped: bool },
    PageTable { mapped: bool },
    VSpace,
    IrqControl,
    IrqHandler { irq: Word, notification: Option<ObjId> },
}

impl Object {
    /// The object type code a capability to this object reports.
    pub fn class(&self) -> Word {
        match self {
            Object::Untyped { .. } => object_type::UNTYPED,
            Object::Tcb { .. } => object_type::TCB,
            Object::Endpoint { .. } => object_type::ENDPOINT,
            Object::Notification { .. } => object_type::NOTIFICATION,
            Object::CNode => object_type::CNODE,
            Object::Page { .. } => object_type::PAGE,
            Object::PageTable { .. } => object_type::PAGE_TABLE,
            Object::VSpace => object_type::VSPACE,
            Object::IrqControl => object_type::IRQ_CONTROL,
            Object::IrqHandler { .. } => object_type::IRQ_HANDLER,
        }
    }

    /// Fresh object of the given type code, as `UntypedRetype` creates it.
    pub fn from_type_code(code: Word, size_bits: u8) -> Option<Self> {
        Some(match code {
            object_type::UNTYPED => Object::Untyped { size_bits },
            object_type::TCB => Object::Tcb {
                configured: false,
                bound_notification: None,
            },
            object_type::ENDPOINT => Object::Endpoint {
                queue: VecDeque::new(),
            },
            object_type::NOTIFICATION => Object::Notification {
                word: 0,
                pending: false,
            },
            object_type::CNODE => Object::CNode,
            object_type::PAGE => Object::Page { mapped: false },
            object_type::PAGE_TABLE => Object::PageTable { mapped: false },
            object_type::VSPACE => Object::VSpace,
            _ => return None,
        })
    }
}

/// One occupied capability slot.
#[derive(Debug, Clone)]
pub struct Entry {
    pub obj: ObjId,
    pub rights: Word,
    pub badge: Badge,
    /// Slot this capability was copied or minted from, if any.
    pub parent: Option<CPtr>,
}

/// Flat slot table plus the object arena behind it.
#[derive(Debug, Default)]
pub struct CSpace {
    slots: HashMap<CPtr, Entry>,
    objects: Vec<Object>,
}

impl CSpace {
    /// Create an object and an original (full-rights, unbadged) capability
    /// to it at `slot`.
    pub fn install(&mut self, slot: CPtr, object: Object) -> ObjId {
        let id = self.alloc_object(object);
        self.slots.insert(
            slot,
            Entry {
                obj: id,
                rights: RIGHTS_ALL,
                badge: 0,
                parent: None,
            },
        );
        id
    }

    pub fn alloc_object(&mut self, object: Object) -> ObjId {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn object(&self, id: ObjId) -> &Object {
        &self.objects[id]
    }

    pub fn object_mut(&mut self, id: ObjId) -> &mut Object {
        &mut self.objects[id]
    }

    pub fn entry(&self, slot: CPtr) -> Option<&Entry> {
        self.slots.get(&slot)
    }

    pub fn is_occupied(&self, slot: CPtr) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn insert(&mut self, slot: CPtr, entry: Entry) {
        self.slots.insert(slot, entry);
    }

    pub fn remove(&mut self, slot: CPtr) -> Option<Entry> {
        self.slots.remove(&slot)
    }

    /// Object type code of the capability at `slot`.
    pub fn class_of(&self, slot: CPtr) -> Option<Word> {
        self.entry(slot).map(|e| self.object(e.obj).class())
    }

    /// Remove the capability at `slot` together with every transitive
    /// descendant, mirroring kernel revocation.
    pub fn revoke(&mut self, slot: CPtr) -> usize {
        let mut victims = vec![slot];
        let mut i = 0;
        while i < victims.len() {
            let parent = victims[i];
            victims.extend(
                self.slots
                    .iter()
                    .filter(|(_, e)| e.parent == Some(parent))
                    .map(|(s, _)| *s),
            );
            i += 1;
        }
        let mut removed = 0;
        for victim in victims {
            if self.slots.remove(&victim).is_some() {
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_alias_the_same_object() {
        let mut cspace = CSpace::default();
        let id = cspace.install(
            10,
            Object::Notification {
                word: 0,
                pending: false,
            },
        );
        let copy = Entry {
            badge: 0xbeef,
            parent: Some(10),
            ..cspace.entry(10).unwrap().clone()
        };
        cspace.insert(11, copy);

        if let Object::Notification { word, .. } = cspace.object_mut(id) {
            *word |= 0xbeef;
        }
        let via_copy = cspace.entry(11).unwrap().obj;
        assert!(matches!(
            cspace.object(via_copy),
            Object::Notification { word: 0xbeef, .. }
        ));
    }

    #[test]
    fn revoke_sweeps_descendants() {
        let mut cspace = CSpace::default();
        cspace.install(10, Object::CNode);
        let ep = cspace.entry(10).unwrap().clone();
        cspace.insert(
            11,
            Entry {
                parent: Some(10),
                ..ep.clone()
            },
        );
        cspace.insert(
            12,
            Entry {
                parent: Some(11),
                ..ep
            },
        );
        cspace.install(20, Object::VSpace);

        assert_eq!(cspace.revoke(10), 3);
        assert!(!cspace.is_occupied(11));
        assert!(!cspace.is_occupied(12));
        assert!(cspace.is_occupied(20));
    }
}
