//! Error types for the Tether workspace.
//!
//! Organized by subsystem: buffer access (bounds and width), pointer
//! referencing, and native library loading. All failures are local and
//! synchronous; nothing here is retried and no operation leaves a
//! partial effect behind.

use std::error::Error;
use std::fmt;

use crate::mode::MemoryMode;
use crate::width::NativeWidth;

/// Bounds and width violations on a buffer.
///
/// Every variant is raised before any mutation takes place: a failed
/// operation leaves the buffer's contents, position, and limit exactly
/// as they were.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessError {
    /// `set_position` outside `[0, capacity)`.
    ///
    /// The upper bound is strict — the position must remain a valid
    /// element index, so `capacity` itself is rejected.
    Position {
        /// The requested position.
        requested: usize,
        /// Capacity of the buffer in elements.
        capacity: usize,
    },
    /// Absolute access outside `[0, capacity)`.
    Index {
        /// The offending index.
        index: usize,
        /// Capacity of the buffer in elements.
        capacity: usize,
    },
    /// A relative or bulk operation larger than the remaining elements.
    Bulk {
        /// Number of elements the operation needed.
        requested: usize,
        /// Elements remaining before the limit.
        remaining: usize,
    },
    /// A caller-side slice range that exceeds the slice.
    Slice {
        /// Starting offset into the caller slice.
        offset: usize,
        /// Number of elements requested.
        len: usize,
        /// Length of the caller slice.
        available: usize,
    },
    /// `set_limit` outside `[position, capacity]`.
    Limit {
        /// The requested limit.
        requested: usize,
        /// Current cursor position (lower bound).
        position: usize,
        /// Capacity of the buffer in elements (upper bound).
        capacity: usize,
    },
    /// A value too wide for the buffer's element width.
    ///
    /// Raised instead of silently truncating on 32-bit layouts.
    Overflow {
        /// The value that does not fit.
        value: u64,
        /// The active element width.
        width: NativeWidth,
    },
    /// A write to a read-only view over a shared region.
    ///
    /// Shared regions are frozen on the managed side once handed out;
    /// content is staged before sharing.
    ReadOnly,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "position {requested} out of bounds: capacity {capacity}"
                )
            }
            Self::Index { index, capacity } => {
                write!(f, "index {index} out of bounds: capacity {capacity}")
            }
            Self::Bulk {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "bulk operation of {requested} elements exceeds {remaining} remaining"
                )
            }
            Self::Slice {
                offset,
                len,
                available,
            } => {
                let end = offset.saturating_add(*len);
                write!(
                    f,
                    "slice range {offset}..{end} exceeds slice length {available}"
                )
            }
            Self::Limit {
                requested,
                position,
                capacity,
            } => {
                write!(
                    f,
                    "limit {requested} outside [{position}, {capacity}]"
                )
            }
            Self::Overflow { value, width } => {
                write!(f, "value {value:#x} does not fit a {width} slot")
            }
            Self::ReadOnly => {
                write!(f, "buffer is a read-only view over a shared region")
            }
        }
    }
}

impl Error for AccessError {}

/// Failures while recording or resolving a referenced region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    /// The region's memory mode does not match the array's.
    ///
    /// Mixing is disallowed because only direct regions have a
    /// resolvable native address.
    ModeMismatch {
        /// Mode of the pointer array.
        buffer: MemoryMode,
        /// Mode of the region being referenced.
        region: MemoryMode,
    },
    /// The address resolver returned zero for the region.
    Unresolvable,
    /// The underlying slot write failed.
    Access(AccessError),
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModeMismatch { buffer, region } => {
                write!(
                    f,
                    "memory mode mismatch: array is {buffer}, region is {region}"
                )
            }
            Self::Unresolvable => {
                write!(f, "could not determine the region's native address")
            }
            Self::Access(err) => write!(f, "slot access failed: {err}"),
        }
    }
}

impl Error for ReferenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Access(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AccessError> for ReferenceError {
    fn from(err: AccessError) -> Self {
        Self::Access(err)
    }
}

/// Failures from the native library loader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoaderError {
    /// No candidate file for the library could be found or opened.
    NotFound {
        /// The library's platform-independent name.
        name: String,
        /// Every path that was tried, in order.
        searched: Vec<String>,
    },
    /// A candidate was found but the platform loader rejected it.
    LoadFailed {
        /// The library's platform-independent name.
        name: String,
        /// The platform loader's message.
        reason: String,
    },
    /// Loading is disabled for this process.
    LoadingDisabled {
        /// The library that was requested.
        name: String,
    },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name, searched } => {
                write!(
                    f,
                    "native library '{name}' not found (searched: {})",
                    searched.join(", ")
                )
            }
            Self::LoadFailed { name, reason } => {
                write!(f, "native library '{name}' failed to load: {reason}")
            }
            Self::LoadingDisabled { name } => {
                write!(f, "loading is disabled; refused to load '{name}'")
            }
        }
    }
}

impl Error for LoaderError {}
