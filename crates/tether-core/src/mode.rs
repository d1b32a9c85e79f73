//! Memory-mode classification for byte regions.

use std::fmt;

/// How a byte region relates to native code.
///
/// Only [`Direct`](MemoryMode::Direct) regions have a stable address
/// that native code may dereference; [`Heap`](MemoryMode::Heap) regions
/// are managed-only and unresolvable. A pointer array refuses to mix
/// modes: recording the address of a heap region would hand native code
/// a pointer with no validity guarantee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryMode {
    /// Directly addressable by native code for the region's lifetime.
    Direct,
    /// Ordinary managed memory; usable only before any native handoff.
    Heap,
}

impl MemoryMode {
    /// Whether this is the directly-addressable mode.
    pub const fn is_direct(self) -> bool {
        matches!(self, Self::Direct)
    }
}

impl fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Heap => write!(f, "heap"),
        }
    }
}
