//! The packed message descriptor exchanged with the kernel.
//!
//! `MessageInfo` travels in a single register on both directions of a
//! syscall. On the way in it describes the caller's encoded message; on the
//! way out the label field carries the kernel's error code and the length
//! field the number of valid reply words.

use core::fmt::{Debug, Formatter};

use crate::{Word, MSG_MAX_EXTRA_CAPS, MSG_MAX_LENGTH};

pub const LENGTH_BITS: usize = 7;
pub const EXTRA_CAPS_BITS: usize = 2;
pub const UNWRAPPED_BITS: usize = 3;
pub const LABEL_BITS: usize = Word::BITS as usize - LENGTH_BITS - EXTRA_CAPS_BITS - UNWRAPPED_BITS;

const LENGTH_MASK: Word = (1 << LENGTH_BITS) - 1;
const EXTRA_CAPS_MASK: Word = (1 << EXTRA_CAPS_BITS) - 1;
const UNWRAPPED_MASK: Word = (1 << UNWRAPPED_BITS) - 1;
const LABEL_MASK: Word = (1 << LABEL_BITS) - 1;

const EXTRA_CAPS_SHIFT: usize = LENGTH_BITS;
const UNWRAPPED_SHIFT: usize = LENGTH_BITS + EXTRA_CAPS_BITS;
const LABEL_SHIFT: usize = LENGTH_BITS + EXTRA_CAPS_BITS + UNWRAPPED_BITS;

/// Packed `{ label, length, extra_caps, caps_unwrapped }` descriptor.
///
/// The field layout (low to high bits: length, extra_caps, caps_unwrapped,
/// label) is part of the kernel ABI and must be reproduced bit-exact.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct MessageInfo(Word);

impl MessageInfo {
    /// Reconstruct a descriptor from its register representation.
    #[inline(always)]
    pub const fn from_raw(raw: Word) -> Self {
        Self(raw)
    }

    /// The register representation of this descriptor.
    #[inline(always)]
    pub const fn as_raw(&self) -> Word {
        self.0
    }

    /// Pack a descriptor from its fields.
    ///
    /// Panics if a field exceeds its bit budget; a message that does not fit
    /// the registers is a caller-side encoding bug, never sent to the kernel.
    pub fn new(label: Word, length: usize, extra_caps: usize, caps_unwrapped: usize) -> Self {
        assert!(label <= LABEL_MASK, "label does not fit {} bits", LABEL_BITS);
        assert!(length <= MSG_MAX_LENGTH, "message length exceeds register budget");
        assert!(extra_caps <= MSG_MAX_EXTRA_CAPS, "extra capability count exceeds transfer slots");
        assert!(caps_unwrapped <= UNWRAPPED_MASK as usize);
        Self(
            (label << LABEL_SHIFT)
                | ((caps_unwrapped as Word) << UNWRAPPED_SHIFT)
                | ((extra_caps as Word) << EXTRA_CAPS_SHIFT)
                | length as Word,
        )
    }

    #[inline(always)]
    pub const fn label(&self) -> Word {
        (self.0 >> LABEL_SHIFT) & LABEL_MASK
    }

    #[inline(always)]
    pub const fn length(&self) -> usize {
        (self.0 & LENGTH_MASK) as usize
    }

    #[inline(always)]
    pub const fn extra_caps(&self) -> usize {
        ((self.0 >> EXTRA_CAPS_SHIFT) & EXTRA_CAPS_MASK) as usize
    }

    #[inline(always)]
    pub const fn caps_unwrapped(&self) -> usize {
        ((self.0 >> UNWRAPPED_SHIFT) & UNWRAPPED_MASK) as usize
    }

    /// Replace the label, keeping the shape fields. Used by the kernel side
    /// of the protocol to stamp an error code onto a reply.
    pub const fn with_label(self, label: Word) -> Self {
        Self((self.0 & !(LABEL_MASK << LABEL_SHIFT)) | (label << LABEL_SHIFT))
    }
}

impl From<Word> for MessageInfo {
    fn from(value: Word) -> Self {
        Self::from_raw(value)
    }
}

impl From<MessageInfo> for Word {
    fn from(value: MessageInfo) -> Self {
        value.as_raw()
    }
}

impl Debug for MessageInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageInfo")
            .field("label", &self.label())
            .field("length", &self.length())
            .field("extra_caps", &self.extra_caps())
            .field("caps_unwrapped", &self.caps_unwrapped())
            .finish()
    }
}
