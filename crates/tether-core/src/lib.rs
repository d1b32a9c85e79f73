//! Core types and traits for the Tether native-interop buffers.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared across the Tether workspace:
//! the pointer-width policy, memory-mode classification, error types,
//! and the capability traits implemented by the buffer family.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod mode;
pub mod traits;
pub mod width;

// Public re-exports for the primary API surface.
pub use error::{AccessError, LoaderError, ReferenceError};
pub use mode::MemoryMode;
pub use traits::{AddressResolver, Addressable, NativeBuffer};
pub use width::NativeWidth;
