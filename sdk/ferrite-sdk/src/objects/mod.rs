//! Per-object-class invocation methods.
//!
//! Each submodule attaches methods to `CapRef<Class>` for exactly the
//! labels that class accepts, so a misdirected operation is a type error
//! rather than a runtime `InvalidCapability`. Argument marshalling follows
//! the label's declared shape; the only runtime encoding failure left is a
//! payload that exceeds the register budget.

mod cnode;
mod endpoint;
mod irq;
mod notification;
mod paging;
mod tcb;
mod untyped;

pub use paging::MemoryAttrs;
