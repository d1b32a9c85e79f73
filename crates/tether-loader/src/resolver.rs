//! The system address resolver.

use std::sync::Arc;

use tether_core::{AddressResolver, Addressable, LoaderError};

use crate::action::LoaderAction;
use crate::registry::LibraryRegistry;

/// Registry name of the address-extraction capability.
///
/// The capability is compiled into this crate rather than shipped as a
/// separate shared library, but it still goes through the registry so
/// the "resolution must be available before any reference operation"
/// precondition is enforced uniformly.
pub const ADDRESS_CAPABILITY: &str = "tether_addr";

/// The process [`AddressResolver`]: reports a region's own stable base
/// address, which is zero for managed-only regions.
#[derive(Debug)]
pub struct SystemResolver {
    _private: (),
}

impl AddressResolver for SystemResolver {
    fn resolve(&self, region: &dyn Addressable) -> u64 {
        region.base_address()
    }
}

/// The built-in action backing [`ADDRESS_CAPABILITY`].
///
/// Nothing to map — the capability is part of this crate — so loading
/// always succeeds once asked. This is the action to pass when the
/// process has no loading policy of its own.
pub struct BuiltinAction;

impl LoaderAction for BuiltinAction {
    fn load(&self, _name: &str, _ignore_error: bool) -> Result<bool, LoaderError> {
        Ok(true)
    }
}

/// Obtain the system resolver, registering its capability through
/// `action` first.
///
/// This is the only way to get a [`SystemResolver`], so a
/// `PointerArray` built on it cannot exist before the capability is
/// recorded in `registry`. The action decides whether registration is
/// permitted at all: with a
/// [`DisabledAction`](crate::action::DisabledAction) the first
/// acquisition fails with [`LoaderError::LoadingDisabled`] and no
/// address resolution is possible. Use [`BuiltinAction`] when loading
/// is unrestricted.
pub fn native_resolver(
    registry: &LibraryRegistry,
    action: &dyn LoaderAction,
) -> Result<Arc<dyn AddressResolver>, LoaderError> {
    registry.ensure_loaded(ADDRESS_CAPABILITY, action)?;
    Ok(Arc::new(SystemResolver { _private: () }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::DisabledAction;
    use tether_buf::DataRegion;

    #[test]
    fn native_resolver_registers_the_capability() {
        let registry = LibraryRegistry::new();
        assert!(!registry.is_loaded(ADDRESS_CAPABILITY));
        let _resolver = native_resolver(&registry, &BuiltinAction).unwrap();
        assert!(registry.is_loaded(ADDRESS_CAPABILITY));
        // Idempotent.
        let _again = native_resolver(&registry, &BuiltinAction).unwrap();
        assert_eq!(registry.loaded_count(), 1);
    }

    #[test]
    fn disabled_action_blocks_resolver_acquisition() {
        let registry = LibraryRegistry::new();
        let err = native_resolver(&registry, &DisabledAction).err().unwrap();
        match err {
            LoaderError::LoadingDisabled { name } => assert_eq!(name, ADDRESS_CAPABILITY),
            other => panic!("unexpected error: {other}"),
        }
        // A refused load registers nothing.
        assert!(!registry.is_loaded(ADDRESS_CAPABILITY));
        // A later permitted acquisition still works.
        let _resolver = native_resolver(&registry, &BuiltinAction).unwrap();
        assert!(registry.is_loaded(ADDRESS_CAPABILITY));
    }

    #[test]
    fn system_resolver_round_trips_direct_addresses() {
        let registry = LibraryRegistry::new();
        let resolver = native_resolver(&registry, &BuiltinAction).unwrap();
        let region = DataRegion::direct(32);
        assert_eq!(resolver.resolve(&region), region.base_address());
        assert_ne!(resolver.resolve(&region), 0);
    }

    #[test]
    fn system_resolver_reports_heap_regions_as_unresolvable() {
        let registry = LibraryRegistry::new();
        let resolver = native_resolver(&registry, &BuiltinAction).unwrap();
        let region = DataRegion::heap(32);
        assert_eq!(resolver.resolve(&region), 0);
    }
}
