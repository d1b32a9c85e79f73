//! Native library loading and address resolution for Tether.
//!
//! The buffer crates never load native code themselves; they consume
//! two capabilities this crate provides:
//!
//! 1. a process-wide, mutex-guarded registry of loaded library names,
//!    with a pluggable [`LoaderAction`] doing the actual loading, and
//! 2. the system [`AddressResolver`](tether_core::AddressResolver),
//!    handed out only after its backing capability is registered.
//!
//! This crate is the one place in the workspace that may contain
//! `unsafe` code (around `libloading::Library::new`); each site carries
//! a `SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod action;
pub mod registry;
pub mod resolver;

// Public re-exports for the primary API surface.
pub use action::{DisabledAction, LoaderAction, SystemAction};
pub use registry::LibraryRegistry;
pub use resolver::{native_resolver, BuiltinAction, SystemResolver, ADDRESS_CAPABILITY};
