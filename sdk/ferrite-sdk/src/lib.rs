//! Safe bindings for the Ferrite microkernel syscall interface.
//!
//! # Purpose
//! Wraps the raw ABI in `ferrite-sys` with a zero-cost, typed layer:
//! capability references tagged by object class at compile time, an
//! invocation encoder that matches the kernel's register protocol
//! bit-exact, a scoped invocation context that makes re-entrant misuse of
//! the message registers unrepresentable, and a total mapping from raw
//! kernel error codes to a structured taxonomy.
//!
//! # Modules
//! - [`cap`]: typed capability references and rights
//! - [`message`]: message-register encoding and decoding
//! - [`invoke`]: the invocation context and syscall plumbing
//! - [`error`]: the kernel error taxonomy
//! - [`objects`]: per-object-class methods
//! - [`bootinfo`]: typed accessors over the kernel's boot information
//! - [`fault`]: decoding of kernel-delivered fault messages
//!
//! # Example
//! ```no_run
//! use ferrite_sdk::{cap::{CapRef, Notification}, invoke::InvocationContext};
//! # fn demo(trampoline: &dyn ferrite_sys::Trampoline) -> ferrite_sdk::Result<()> {
//! let mut ctx = InvocationContext::new(trampoline);
//! let ntfn: CapRef<Notification> = CapRef::from_raw(42);
//! ntfn.signal(&mut ctx)?;
//! let badge = ntfn.wait(&mut ctx)?;
//! # let _ = badge; Ok(())
//! # }
//! ```

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod bootinfo;
pub mod cap;
pub mod error;
pub mod fault;
pub mod invoke;
pub mod message;
pub mod objects;

pub use error::{IpcError, KernelError};

/// Result type for all binding operations.
pub type Result<T> = core::result::Result<T, IpcError>;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
