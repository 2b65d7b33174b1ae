//! Message-register encoding and decoding.
//!
//! The encoder is the single place where a label, data words and transfer
//! capabilities become a packed tag plus register writes, and the decoder
//! is its exact inverse: decoding an encoded message yields the original
//! label, words and capabilities. Budget violations are rejected here,
//! before the kernel is entered.

use ferrite_sys::{CPtr, MessageInfo, MsgRegisters, Word, MSG_MAX_EXTRA_CAPS, MSG_MAX_LENGTH};

use crate::error::IpcError;

/// Encode a message into `regs` and return the tag describing it.
///
/// Words and capabilities are written in argument order starting at
/// register zero. Registers beyond the encoded length are left untouched;
/// the tag's length and cap-count fields are the only authority on how
/// much of the area is meaningful.
pub fn encode(
    label: Word,
    args: &[Word],
    caps: &[CPtr],
    regs: &mut MsgRegisters,
) -> crate::Result<MessageInfo> {
    if args.len() > MSG_MAX_LENGTH || caps.len() > MSG_MAX_EXTRA_CAPS {
        return Err(IpcError::MessageTooLong {
            words: args.len(),
            caps: caps.len(),
        });
    }

    regs.msg[..args.len()].copy_from_slice(args);
    regs.caps[..caps.len()].copy_from_slice(caps);

    let info = MessageInfo::new(label, args.len(), caps.len(), 0);
    regs.tag = info.as_raw();
    Ok(info)
}

/// Decode a message described by `info` out of `regs`.
///
/// Returns the label, the data words and the capability transfer slots.
/// Only the registers the tag declares are exposed.
pub fn decode(info: MessageInfo, regs: &MsgRegisters) -> (Word, &[Word], &[CPtr]) {
    (
        info.label(),
        &regs.msg[..info.length()],
        &regs.caps[..info.extra_caps()],
    )
}
