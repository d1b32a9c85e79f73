//! Pointer-width policy.
//!
//! A [`NativeWidth`] fixes the size of one buffer slot to the pointer
//! width of a target architecture: 4 bytes on 32-bit hosts, 8 bytes on
//! 64-bit hosts. The host width never changes at runtime, but buffers
//! carry their width explicitly so tests can exercise both layouts on
//! any machine.

use std::fmt;

/// Element width of a native-sized buffer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeWidth {
    /// 32-bit pointers: 4-byte slots, values up to `u32::MAX`.
    W32,
    /// 64-bit pointers: 8-byte slots, the full `u64` range.
    W64,
}

impl NativeWidth {
    /// The width of the process this code was compiled for.
    ///
    /// Fixed for the process lifetime; query this rather than
    /// hard-coding 4 or 8 anywhere.
    pub const fn host() -> Self {
        if cfg!(target_pointer_width = "32") {
            Self::W32
        } else {
            Self::W64
        }
    }

    /// Bytes per slot: 4 or 8.
    pub const fn element_size(self) -> usize {
        match self {
            Self::W32 => 4,
            Self::W64 => 8,
        }
    }

    /// Truncation mask for addresses recorded at this width.
    pub const fn mask(self) -> u64 {
        match self {
            Self::W32 => 0x0000_0000_FFFF_FFFF,
            Self::W64 => u64::MAX,
        }
    }

    /// Whether `value` is representable in a slot of this width.
    pub const fn fits(self, value: u64) -> bool {
        value <= self.mask()
    }
}

impl fmt::Display for NativeWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::W32 => write!(f, "32-bit"),
            Self::W64 => write!(f, "64-bit"),
        }
    }
}
