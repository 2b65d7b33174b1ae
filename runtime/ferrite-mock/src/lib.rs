//! Simulated Ferrite kernel for host-side testing.
//!
//! # Purpose
//! Implements the [`Trampoline`] seam with an in-process kernel model so
//! the safe binding layer can be exercised without the real kernel: a flat
//! capability space, per-class invocation semantics, blocking endpoint and
//! notification queues, and the exact decode rules (class check, declared
//! arity, rights) the kernel applies before dispatching.
//!
//! # Limitations
//! This is a test double, not a kernel. Scheduling is the host's thread
//! scheduler, memory is never really mapped, and `Call` on an endpoint
//! parks the message and replies with an empty success instead of blocking
//! on a reply capability.
//!
//! # Testing Strategy
//! - Unit tests: capability space bookkeeping, per-label dispatch
//! - Integration tests: driven from `ferrite-sdk` through the typed API

mod cspace;

use std::sync::{Condvar, Mutex};

use ferrite_sys::{
    error_code, init_slot, object_type, CPtr, InvocationLabel, MessageInfo, MsgRegisters,
    RawReply, SyscallId, Trampoline, Word, RECV_ERROR_BADGE,
};
use log::debug;

pub use cspace::{CSpace, Entry, Object, ObjId, QueuedMessage};
pub use cspace::{RIGHTS_ALL, RIGHT_GRANT, RIGHT_GRANT_REPLY, RIGHT_READ, RIGHT_WRITE};

/// A fully decoded request, as the kernel's dispatcher saw it.
///
/// Recorded on every entry so tests can assert that encoding reproduced
/// the caller's label and arguments bit-exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInvocation {
    pub id: SyscallId,
    pub dest: CPtr,
    pub label: Word,
    pub args: Vec<Word>,
    pub caps: Vec<CPtr>,
}

#[derive(Default)]
struct Inner {
    cspace: CSpace,
    last: Option<DecodedInvocation>,
}

/// The simulated kernel. One instance stands in for the machine; any
/// number of execution contexts may trap into it concurrently.
pub struct MockKernel {
    inner: Mutex<Inner>,
    wakeup: Condvar,
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKernel {
    /// A kernel with the root task's initial capabilities in place, laid
    /// out per [`init_slot`].
    pub fn new() -> Self {
        let kernel = Self {
            inner: Mutex::new(Inner::default()),
            wakeup: Condvar::new(),
        };
        {
            let mut inner = kernel.inner.lock().unwrap();
            inner.cspace.install(init_slot::ROOT_CNODE, Object::CNode);
            inner.cspace.install(init_slot::ROOT_VSPACE, Object::VSpace);
            inner.cspace.install(
                init_slot::ROOT_TCB,
                Object::Tcb {
                    configured: true,
                    bound_notification: None,
                },
            );
            inner.cspace.install(init_slot::IRQ_CONTROL, Object::IrqControl);
            inner
                .cspace
                .install(init_slot::BOOT_INFO_FRAME, Object::Page { mapped: true });
        }
        kernel
    }

    /// Place an object with an original capability at `slot` (test setup).
    pub fn install(&self, slot: CPtr, object: Object) {
        self.inner.lock().unwrap().cspace.install(slot, object);
    }

    /// Object type code of the capability at `slot`, if occupied.
    pub fn class_at(&self, slot: CPtr) -> Option<Word> {
        self.inner.lock().unwrap().cspace.class_of(slot)
    }

    /// The most recent request as the dispatcher decoded it.
    pub fn last_invocation(&self) -> Option<DecodedInvocation> {
        self.inner.lock().unwrap().last.clone()
    }

    /// Current word of the notification behind `slot` (test inspection).
    pub fn notification_word(&self, slot: CPtr) -> Option<Word> {
        let inner = self.inner.lock().unwrap();
        let entry = inner.cspace.entry(slot)?;
        match inner.cspace.object(entry.obj) {
            Object::Notification { word, .. } => Some(*word),
            _ => None,
        }
    }

    fn err(code: Word) -> RawReply {
        RawReply {
            tag: MessageInfo::new(code, 0, 0, 0),
            badge: 0,
        }
    }

    fn ok() -> RawReply {
        RawReply {
            tag: MessageInfo::new(error_code::NO_ERROR, 0, 0, 0),
            badge: 0,
        }
    }

    fn recv_err(code: Word) -> RawReply {
        RawReply {
            tag: MessageInfo::new(code, 0, 0, 0),
            badge: RECV_ERROR_BADGE,
        }
    }

    fn do_send(&self, dest: CPtr, info: MessageInfo, args: &[Word]) {
        let mut inner = self.inner.lock().unwrap();
        let Some(entry) = inner.cspace.entry(dest).cloned() else {
            // Send-only entry points report nothing; a bad slot is dropped.
            return;
        };
        if entry.rights & RIGHT_WRITE == 0 {
            return;
        }
        match inner.cspace.object_mut(entry.obj) {
            Object::Notification { word, pending } => {
                // An unbadged signal contributes no word bits but still
                // makes the notification active.
                *word |= entry.badge;
                *pending = true;
                self.wakeup.notify_all();
            }
            Object::Endpoint { queue } => {
                queue.push_back(QueuedMessage {
                    label: info.label(),
                    badge: entry.badge,
                    words: args.to_vec(),
                });
                self.wakeup.notify_all();
            }
            _ => {}
        }
    }

    fn do_recv(&self, dest: CPtr, blocking: bool, regs: &mut MsgRegisters) -> RawReply {
        let mut inner = self.inner.lock().unwrap();
        loop {
            let Some(entry) = inner.cspace.entry(dest).cloned() else {
                return Self::recv_err(error_code::FAILED_LOOKUP);
            };
            if entry.rights & RIGHT_READ == 0 {
                return Self::recv_err(error_code::ACCESS_DENIED);
            }
            match inner.cspace.object_mut(entry.obj) {
                Object::Notification { word, pending } => {
                    if *pending {
                        let badge = *word;
                        *word = 0;
                        *pending = false;
                        return RawReply {
                            tag: MessageInfo::new(error_code::NO_ERROR, 0, 0, 0),
                            badge,
                        };
                    }
                }
                Object::Endpoint { queue } => {
                    if let Some(msg) = queue.pop_front() {
                        let len = msg.words.len();
                        regs.msg[..len].copy_from_slice(&msg.words);
                        regs.badge = msg.badge;
                        return RawReply {
                            tag: MessageInfo::new(msg.label, len, 0, 0),
                            badge: msg.badge,
                        };
                    }
                }
                _ => return Self::recv_err(error_code::INVALID_CAPABILITY),
            }
            if !blocking {
                // Nothing pending; polling variants report an empty badge.
                return RawReply {
                    tag: MessageInfo::new(error_code::NO_ERROR, 0, 0, 0),
                    badge: 0,
                };
            }
            inner = self.wakeup.wait(inner).unwrap();
        }
    }

    fn do_call(
        &self,
        dest: CPtr,
        info: MessageInfo,
        args: &[Word],
        caps: &[CPtr],
        _regs: &mut MsgRegisters,
    ) -> RawReply {
        let mut inner = self.inner.lock().unwrap();
        let Some(entry) = inner.cspace.entry(dest).cloned() else {
            return Self::err(error_code::FAILED_LOOKUP);
        };
        if entry.rights & RIGHT_WRITE == 0 {
            return Self::err(error_code::ACCESS_DENIED);
        }
        let class = inner.cspace.object(entry.obj).class();

        // Endpoint calls carry a user payload, not a method label; the mock
        // parks the message and completes immediately.
        if class == object_type::ENDPOINT {
            drop(inner);
            self.do_send(dest, info, args);
            return Self::ok();
        }

        let Some(label) = InvocationLabel::from_raw(info.label()) else {
            return Self::err(error_code::ILLEGAL_OPERATION);
        };
        if label.expected_class() != class {
            return Self::err(error_code::INVALID_CAPABILITY);
        }
        let arity = label.arity();
        if let Some(words) = arity.words {
            if args.len() != words {
                return Self::err(error_code::TRUNCATED_MESSAGE);
            }
        }
        if caps.len() != arity.caps {
            return Self::err(error_code::TRUNCATED_MESSAGE);
        }
        debug!(
            "invoke {:?} on slot {} ({} words, {} caps)",
            label,
            dest,
            args.len(),
            caps.len()
        );
        self.dispatch(&mut inner, label, entry, args, caps)
    }

    fn dispatch(
        &self,
        inner: &mut Inner,
        label: InvocationLabel,
        entry: Entry,
        args: &[Word],
        caps: &[CPtr],
    ) -> RawReply {
        use InvocationLabel::*;
        let cspace = &mut inner.cspace;
        match label {
            EndpointSend => unreachable!("endpoint payloads are handled on the send path"),

            UntypedRetype => {
                let (obj_type, size_bits, dest_index) = (args[0], args[1], args[2]);
                if cspace.class_of(caps[0]) != Some(object_type::CNODE) {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                let Object::Untyped { size_bits: have } = cspace.object(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                if size_bits > *have as Word {
                    return Self::err(error_code::NOT_ENOUGH_MEMORY);
                }
                if cspace.is_occupied(dest_index) {
                    return Self::err(error_code::DELETE_FIRST);
                }
                let Some(object) = Object::from_type_code(obj_type, size_bits as u8) else {
                    return Self::err(error_code::INVALID_ARGUMENT);
                };
                cspace.install(dest_index, object);
                Self::ok()
            }

            TcbConfigure => {
                let classes = [object_type::CNODE, object_type::VSPACE, object_type::PAGE];
                for (cap, want) in caps.iter().zip(classes) {
                    if cspace.class_of(*cap) != Some(want) {
                        return Self::err(error_code::INVALID_CAPABILITY);
                    }
                }
                let Object::Tcb { configured, .. } = cspace.object_mut(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                *configured = true;
                Self::ok()
            }

            TcbSetPriority => {
                if args[0] > 255 {
                    return Self::err(error_code::RANGE_ERROR);
                }
                if cspace.class_of(caps[0]) != Some(object_type::TCB) {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                Self::ok()
            }

            TcbWriteRegisters => {
                // Payload: resume flag, count, then `count` register words.
                if args.len() < 2 || args.len() != 2 + args[1] {
                    return Self::err(error_code::TRUNCATED_MESSAGE);
                }
                let Object::Tcb { configured, .. } = cspace.object(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                if !configured {
                    return Self::err(error_code::ILLEGAL_OPERATION);
                }
                Self::ok()
            }

            TcbResume => {
                let Object::Tcb { configured, .. } = cspace.object(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                if !configured {
                    return Self::err(error_code::ILLEGAL_OPERATION);
                }
                Self::ok()
            }

            TcbSuspend => Self::ok(),

            TcbBindNotification => {
                let Some(ntfn_entry) = cspace.entry(caps[0]).cloned() else {
                    return Self::err(error_code::FAILED_LOOKUP);
                };
                if cspace.object(ntfn_entry.obj).class() != object_type::NOTIFICATION {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                let ntfn = ntfn_entry.obj;
                let Object::Tcb {
                    bound_notification, ..
                } = cspace.object_mut(entry.obj)
                else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                if bound_notification.is_some() {
                    return Self::err(error_code::ILLEGAL_OPERATION);
                }
                *bound_notification = Some(ntfn);
                Self::ok()
            }

            CNodeCopy | CNodeMint => {
                let (src_index, dest_index, rights) = (args[0], args[1], args[2]);
                if cspace.class_of(caps[0]) != Some(object_type::CNODE) {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                let Some(src) = cspace.entry(src_index).cloned() else {
                    return Self::err(error_code::FAILED_LOOKUP);
                };
                if cspace.is_occupied(dest_index) {
                    return Self::err(error_code::DELETE_FIRST);
                }
                // Authority is monotone: a derived capability never gains rights.
                if rights & !src.rights != 0 {
                    return Self::err(error_code::ACCESS_DENIED);
                }
                let badge = if label == CNodeMint {
                    if src.badge != 0 {
                        // Badged capabilities cannot be re-badged.
                        return Self::err(error_code::ILLEGAL_OPERATION);
                    }
                    args[3]
                } else {
                    src.badge
                };
                cspace.insert(
                    dest_index,
                    Entry {
                        obj: src.obj,
                        rights,
                        badge,
                        parent: Some(src_index),
                    },
                );
                Self::ok()
            }

            CNodeMove => {
                let (src_index, dest_index) = (args[0], args[1]);
                if cspace.class_of(caps[0]) != Some(object_type::CNODE) {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                if cspace.is_occupied(dest_index) {
                    return Self::err(error_code::DELETE_FIRST);
                }
                let Some(src) = cspace.remove(src_index) else {
                    return Self::err(error_code::FAILED_LOOKUP);
                };
                cspace.insert(dest_index, src);
                Self::ok()
            }

            CNodeDelete => match cspace.remove(args[0]) {
                Some(_) => Self::ok(),
                None => Self::err(error_code::FAILED_LOOKUP),
            },

            CNodeRevoke => {
                if !cspace.is_occupied(args[0]) {
                    return Self::err(error_code::FAILED_LOOKUP);
                }
                cspace.revoke(args[0]);
                Self::ok()
            }

            PageMap => {
                let vaddr = args[0];
                if cspace.class_of(caps[0]) != Some(object_type::VSPACE) {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                if vaddr & 0xfff != 0 {
                    return Self::err(error_code::ALIGNMENT_ERROR);
                }
                let Object::Page { mapped } = cspace.object_mut(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                if *mapped {
                    return Self::err(error_code::ILLEGAL_OPERATION);
                }
                *mapped = true;
                Self::ok()
            }

            PageUnmap => {
                if let Object::Page { mapped } = cspace.object_mut(entry.obj) {
                    *mapped = false;
                }
                Self::ok()
            }

            PageTableMap => {
                let vaddr = args[0];
                if cspace.class_of(caps[0]) != Some(object_type::VSPACE) {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                if vaddr & 0xfff != 0 {
                    return Self::err(error_code::ALIGNMENT_ERROR);
                }
                let Object::PageTable { mapped } = cspace.object_mut(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                if *mapped {
                    return Self::err(error_code::ILLEGAL_OPERATION);
                }
                *mapped = true;
                Self::ok()
            }

            PageTableUnmap => {
                if let Object::PageTable { mapped } = cspace.object_mut(entry.obj) {
                    *mapped = false;
                }
                Self::ok()
            }

            IrqControlGet => {
                let (irq, dest_index) = (args[0], args[1]);
                if cspace.class_of(caps[0]) != Some(object_type::CNODE) {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                if irq > 1023 {
                    return Self::err(error_code::RANGE_ERROR);
                }
                if cspace.is_occupied(dest_index) {
                    return Self::err(error_code::DELETE_FIRST);
                }
                cspace.install(
                    dest_index,
                    Object::IrqHandler {
                        irq,
                        notification: None,
                    },
                );
                Self::ok()
            }

            IrqHandlerSetNotification => {
                let Some(ntfn_entry) = cspace.entry(caps[0]).cloned() else {
                    return Self::err(error_code::FAILED_LOOKUP);
                };
                if cspace.object(ntfn_entry.obj).class() != object_type::NOTIFICATION {
                    return Self::err(error_code::INVALID_CAPABILITY);
                }
                let ntfn = ntfn_entry.obj;
                let Object::IrqHandler { notification, .. } = cspace.object_mut(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                *notification = Some(ntfn);
                Self::ok()
            }

            IrqHandlerAck => Self::ok(),

            IrqHandlerClear => {
                let Object::IrqHandler { notification, .. } = cspace.object_mut(entry.obj) else {
                    return Self::err(error_code::INVALID_CAPABILITY);
                };
                *notification = None;
                Self::ok()
            }
        }
    }
}

impl Trampoline for MockKernel {
    fn syscall(
        &self,
        id: SyscallId,
        dest: CPtr,
        info: MessageInfo,
        regs: &mut MsgRegisters,
    ) -> RawReply {
        let args: Vec<Word> = regs.msg[..info.length()].to_vec();
        let caps: Vec<CPtr> = regs.caps[..info.extra_caps()].to_vec();
        self.inner.lock().unwrap().last = Some(DecodedInvocation {
            id,
            dest,
            label: info.label(),
            args: args.clone(),
            caps: caps.clone(),
        });

        match id {
            SyscallId::Yield => RawReply::empty(),
            SyscallId::Send | SyscallId::NBSend => {
                self.do_send(dest, info, &args);
                RawReply::empty()
            }
            SyscallId::Call => self.do_call(dest, info, &args, &caps, regs),
            SyscallId::Recv | SyscallId::Wait => self.do_recv(dest, true, regs),
            SyscallId::NBWait => self.do_recv(dest, false, regs),
        }
    }
}
