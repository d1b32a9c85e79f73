//! The process-wide loaded-library registry.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use tether_core::LoaderError;

use crate::action::LoaderAction;

/// A mutex-guarded set of loaded native library names.
///
/// The lock is held across the whole check-then-load sequence in
/// [`ensure_loaded`](LibraryRegistry::ensure_loaded), so two call
/// sites racing to first use cannot double-load a library.
///
/// Most callers use the single [`global`](LibraryRegistry::global)
/// instance; every method takes `&self`, so tests construct private
/// registries and inject them instead.
#[derive(Debug, Default)]
pub struct LibraryRegistry {
    loaded: Mutex<HashSet<String>>,
}

impl LibraryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static LibraryRegistry {
        static GLOBAL: OnceLock<LibraryRegistry> = OnceLock::new();
        GLOBAL.get_or_init(LibraryRegistry::new)
    }

    /// Whether `name` has been loaded through this registry.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Record `name` as loaded without invoking any action.
    ///
    /// For libraries the embedding application loaded through its own
    /// mechanism.
    pub fn mark_loaded(&self, name: &str) {
        self.lock().insert(name.to_owned());
    }

    /// Load `name` through `action` unless it is already loaded.
    ///
    /// Returns `Ok(true)` when this call performed the load and
    /// `Ok(false)` when the library was already present. The registry
    /// lock is held across the check and the load.
    pub fn ensure_loaded(
        &self,
        name: &str,
        action: &dyn LoaderAction,
    ) -> Result<bool, LoaderError> {
        let mut loaded = self.lock();
        if loaded.contains(name) {
            return Ok(false);
        }
        action.load(name, false)?;
        loaded.insert(name.to_owned());
        Ok(true)
    }

    /// Number of libraries recorded as loaded.
    pub fn loaded_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A poisoned set of names is still a valid set of names.
        self.loaded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts invocations; always succeeds.
    struct CountingAction {
        calls: AtomicUsize,
    }

    impl CountingAction {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl LoaderAction for CountingAction {
        fn load(&self, _name: &str, _ignore_error: bool) -> Result<bool, LoaderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    /// Always fails.
    struct FailingAction;

    impl LoaderAction for FailingAction {
        fn load(&self, name: &str, _ignore_error: bool) -> Result<bool, LoaderError> {
            Err(LoaderError::LoadFailed {
                name: name.to_owned(),
                reason: "boom".into(),
            })
        }
    }

    #[test]
    fn ensure_loaded_loads_each_name_once() {
        let registry = LibraryRegistry::new();
        let action = CountingAction::new();

        assert!(registry.ensure_loaded("gl", &action).unwrap());
        assert!(!registry.ensure_loaded("gl", &action).unwrap());
        assert!(registry.ensure_loaded("al", &action).unwrap());

        assert_eq!(action.calls.load(Ordering::SeqCst), 2);
        assert!(registry.is_loaded("gl"));
        assert!(registry.is_loaded("al"));
        assert_eq!(registry.loaded_count(), 2);
    }

    #[test]
    fn failed_load_is_not_recorded() {
        let registry = LibraryRegistry::new();
        assert!(registry.ensure_loaded("gl", &FailingAction).is_err());
        assert!(!registry.is_loaded("gl"));
        // A later attempt with a working action still runs.
        let action = CountingAction::new();
        assert!(registry.ensure_loaded("gl", &action).unwrap());
    }

    #[test]
    fn mark_loaded_short_circuits_the_action() {
        let registry = LibraryRegistry::new();
        registry.mark_loaded("prebound");
        let action = CountingAction::new();
        assert!(!registry.ensure_loaded("prebound", &action).unwrap());
        assert_eq!(action.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        let registry = std::sync::Arc::new(LibraryRegistry::new());
        let action = std::sync::Arc::new(CountingAction::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                let action = std::sync::Arc::clone(&action);
                std::thread::spawn(move || {
                    registry.ensure_loaded("contended", action.as_ref()).unwrap()
                })
            })
            .collect();

        let performed: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(performed, 1);
        assert_eq!(action.calls.load(Ordering::SeqCst), 1);
    }
}
