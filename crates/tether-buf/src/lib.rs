//! Native-width arrays with address-to-object keep-alive tracking.
//!
//! This crate provides the buffer family used to marshal arrays of
//! native-sized integers and raw addresses across the managed/native
//! boundary:
//!
//! ```text
//! CursorBuffer (element-agnostic bounds-checked cursor core)
//!   └── NativeSizeArray (slots sized by NativeWidth, u64 values)
//!         └── PointerArray (+ address → SharedRegion table, + resolver)
//! ```
//!
//! The layering is composition, not inheritance: each outer type owns
//! the inner one and delegates the cursor interface. A [`PointerArray`]
//! additionally keeps every referenced region alive for as long as its
//! address stays recorded, so native code can hold the raw address
//! without the managed side reclaiming the memory behind it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cursor;
pub mod native;
pub mod pointer;
pub mod region;

// Public re-exports for the primary API surface.
pub use cursor::CursorBuffer;
pub use native::NativeSizeArray;
pub use pointer::PointerArray;
pub use region::{DataRegion, SharedRegion};
