//! Pluggable library-loading strategies.

use std::path::PathBuf;
use std::sync::Mutex;

use smallvec::SmallVec;
use tether_core::LoaderError;

/// Per-library candidate paths; the common case is a handful.
type Candidates = SmallVec<[PathBuf; 4]>;

/// A strategy for loading one native library by name.
///
/// Implementations are invoked by
/// [`LibraryRegistry::ensure_loaded`](crate::LibraryRegistry::ensure_loaded)
/// under the registry lock, so a given library is loaded at most once
/// no matter how many call sites race to first use.
pub trait LoaderAction: Send + Sync {
    /// Load `name`.
    ///
    /// Returns `Ok(true)` when the library is loaded, `Ok(false)` when
    /// loading failed but `ignore_error` asked to continue, and an
    /// error otherwise.
    fn load(&self, name: &str, ignore_error: bool) -> Result<bool, LoaderError>;

    /// Load `name` after loading its `preload` dependencies in order.
    ///
    /// Preload failures are tolerated when `preload_ignore_error` is
    /// set; the main library itself must load.
    fn load_with_preload(
        &self,
        name: &str,
        preload: &[&str],
        preload_ignore_error: bool,
    ) -> Result<bool, LoaderError> {
        for dep in preload {
            self.load(dep, preload_ignore_error)?;
        }
        self.load(name, false)
    }
}

/// The default action: resolve platform file names and load through
/// the system dynamic loader.
///
/// Loaded handles are held for the process lifetime — dropping a
/// `libloading::Library` unmaps its symbols, which would invalidate
/// addresses already handed to native code.
pub struct SystemAction {
    search_dirs: Vec<PathBuf>,
    held: Mutex<Vec<libloading::Library>>,
}

impl SystemAction {
    /// An action searching only the system loader's default paths.
    pub fn new() -> Self {
        Self::with_search_dirs(Vec::new())
    }

    /// An action that tries `search_dirs` in order before falling back
    /// to the system loader's default paths.
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            held: Mutex::new(Vec::new()),
        }
    }

    /// Candidate paths for `name`, most specific first.
    fn candidates(&self, name: &str) -> Candidates {
        let filename = libloading::library_filename(name);
        let mut out = Candidates::new();
        for dir in &self.search_dirs {
            out.push(dir.join(&filename));
        }
        // Bare filename last: the platform loader applies its own
        // search path.
        out.push(PathBuf::from(filename));
        out
    }

    #[allow(unsafe_code)]
    fn try_open(path: &PathBuf) -> Result<libloading::Library, libloading::Error> {
        // SAFETY: loading a library runs its initialisers. We only load
        // libraries the caller explicitly named, and we never unload
        // them, which is the contract `libloading` documents as sound.
        unsafe { libloading::Library::new(path) }
    }
}

impl Default for SystemAction {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderAction for SystemAction {
    fn load(&self, name: &str, ignore_error: bool) -> Result<bool, LoaderError> {
        let candidates = self.candidates(name);
        let mut last_error = None;
        for path in &candidates {
            match Self::try_open(path) {
                Ok(library) => {
                    // Mutex poisoning cannot corrupt a Vec of handles;
                    // keep going with the inner value.
                    self.held
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .push(library);
                    return Ok(true);
                }
                Err(err) => last_error = Some(err),
            }
        }
        if ignore_error {
            return Ok(false);
        }
        match last_error {
            Some(err) => Err(LoaderError::LoadFailed {
                name: name.to_owned(),
                reason: err.to_string(),
            }),
            None => Err(LoaderError::NotFound {
                name: name.to_owned(),
                searched: candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect(),
            }),
        }
    }
}

/// An action that refuses every load.
///
/// Installing this turns any operation that would pull in native code
/// into a [`LoaderError::LoadingDisabled`] failure, for environments
/// where dynamic loading is forbidden.
pub struct DisabledAction;

impl LoaderAction for DisabledAction {
    fn load(&self, name: &str, ignore_error: bool) -> Result<bool, LoaderError> {
        if ignore_error {
            return Ok(false);
        }
        Err(LoaderError::LoadingDisabled {
            name: name.to_owned(),
        })
    }
}
