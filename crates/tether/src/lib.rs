//! Tether: native-width buffers that keep managed memory alive across
//! the FFI boundary.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Tether sub-crates. For most users, adding `tether` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tether::prelude::*;
//!
//! // Build an argv-style array of native string addresses.
//! let strings = [
//!     DataRegion::direct_from(b"alpha\0").into_shared(),
//!     DataRegion::direct_from(b"beta\0").into_shared(),
//! ];
//! let mut argv = tether::direct_pointer_array(strings.len()).unwrap();
//! for s in &strings {
//!     argv.reference(s).unwrap();
//! }
//! argv.rewind();
//!
//! // Native code reads the raw addresses out of the array's memory;
//! // the managed side resolves them back to the owning regions, which
//! // stay alive as long as their addresses are recorded.
//! let first = argv.resolve().unwrap().expect("referenced at index 0");
//! assert_eq!(first.as_slice(), b"alpha\0");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tether-core` | Width policy, memory modes, errors, traits |
//! | [`buf`] | `tether-buf` | `CursorBuffer`, `NativeSizeArray`, `PointerArray` |
//! | [`loader`] | `tether-loader` | Library registry, loader actions, system resolver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use tether_buf as buf;
pub use tether_core as types;
pub use tether_loader as loader;

use tether_buf::PointerArray;
use tether_core::{LoaderError, NativeWidth};
use tether_loader::{native_resolver, BuiltinAction, LibraryRegistry};

/// The common imports.
pub mod prelude {
    pub use tether_buf::{CursorBuffer, DataRegion, NativeSizeArray, PointerArray, SharedRegion};
    pub use tether_core::{
        AccessError, AddressResolver, Addressable, LoaderError, MemoryMode, NativeBuffer,
        NativeWidth, ReferenceError,
    };
    pub use tether_loader::{LibraryRegistry, LoaderAction};
}

/// A direct-mode [`PointerArray`] of `count` slots at the host width,
/// wired to the process-global registry and system resolver.
pub fn direct_pointer_array(count: usize) -> Result<PointerArray<'static>, LoaderError> {
    let resolver = native_resolver(LibraryRegistry::global(), &BuiltinAction)?;
    Ok(PointerArray::allocate_direct(
        count,
        NativeWidth::host(),
        resolver,
    ))
}

/// A heap-mode [`PointerArray`] of `count` slots at the host width.
///
/// Usable for staging values on the managed side; direct regions
/// cannot be referenced from it (modes may not mix).
pub fn pointer_array(count: usize) -> Result<PointerArray<'static>, LoaderError> {
    let resolver = native_resolver(LibraryRegistry::global(), &BuiltinAction)?;
    Ok(PointerArray::allocate(count, NativeWidth::host(), resolver))
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn facade_wires_loader_and_buffers_together() {
        let region = DataRegion::direct_from(&[1, 2, 3, 4]).into_shared();
        let mut array = super::direct_pointer_array(2).unwrap();
        assert_eq!(array.capacity(), 2);
        assert_eq!(array.element_size(), std::mem::size_of::<usize>());

        array.reference(&region).unwrap();
        array.rewind();
        let resolved = array.resolve().unwrap().unwrap();
        assert_eq!(resolved.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn heap_facade_array_rejects_direct_regions() {
        let region = DataRegion::direct(8).into_shared();
        let mut array = super::pointer_array(1).unwrap();
        assert!(matches!(
            array.reference(&region),
            Err(ReferenceError::ModeMismatch { .. })
        ));
    }
}
