//! Byte regions: the memory behind buffers and referenced objects.

use std::sync::Arc;

use tether_core::{Addressable, MemoryMode};

/// A fixed-size, zero-initialised byte region.
///
/// The backing allocation never moves for the region's lifetime, so a
/// [`MemoryMode::Direct`] region's base address stays valid until the
/// last owner drops it. Content is written before the region is shared;
/// once wrapped in a [`SharedRegion`] it is read-only from the managed
/// side (native code may still write through the raw address — that is
/// the point of handing the address out).
#[derive(Debug)]
pub struct DataRegion {
    bytes: Box<[u8]>,
    mode: MemoryMode,
}

/// Shared handle to a [`DataRegion`].
///
/// This is the object type a [`PointerArray`](crate::PointerArray)
/// keeps alive through its address table.
pub type SharedRegion = Arc<DataRegion>;

impl DataRegion {
    /// Allocate a zeroed direct region of `len` bytes.
    pub fn direct(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len].into_boxed_slice(),
            mode: MemoryMode::Direct,
        }
    }

    /// Allocate a zeroed heap (managed-only) region of `len` bytes.
    pub fn heap(len: usize) -> Self {
        Self {
            bytes: vec![0u8; len].into_boxed_slice(),
            mode: MemoryMode::Heap,
        }
    }

    /// Allocate a direct region holding a copy of `content`.
    pub fn direct_from(content: &[u8]) -> Self {
        Self {
            bytes: content.to_vec().into_boxed_slice(),
            mode: MemoryMode::Direct,
        }
    }

    /// The region's bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable access to the region's bytes.
    ///
    /// Only available before the region is shared; once behind an
    /// [`Arc`] the region is frozen on the managed side.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Copy `content` into the region starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + content.len()` exceeds the region length.
    pub fn write_at(&mut self, offset: usize, content: &[u8]) {
        self.bytes[offset..offset + content.len()].copy_from_slice(content);
    }

    /// Wrap this region in a shared handle.
    pub fn into_shared(self) -> SharedRegion {
        Arc::new(self)
    }
}

impl Addressable for DataRegion {
    fn mode(&self) -> MemoryMode {
        self.mode
    }

    fn base_address(&self) -> u64 {
        // Heap regions are managed-only: no native-visible address.
        match self.mode {
            MemoryMode::Direct => self.bytes.as_ptr() as usize as u64,
            MemoryMode::Heap => 0,
        }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Backing bytes for a [`CursorBuffer`](crate::CursorBuffer).
///
/// `Owned` is a freshly allocated region; `Borrowed` is a view into
/// caller memory (the `wrap` lifecycle — the caller retains ownership
/// and must not shrink or free the slice while the buffer is alive,
/// which the borrow enforces). `Shared` is a view over a
/// [`SharedRegion`], which is how an array's own backing region can be
/// referenced by a pointer array; shared regions are frozen on the
/// managed side, so this variant is read-only.
#[derive(Debug)]
pub(crate) enum Storage<'a> {
    Owned(Box<[u8]>),
    Borrowed(&'a mut [u8]),
    Shared(SharedRegion),
}

impl Storage<'_> {
    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            Storage::Owned(b) => b,
            Storage::Borrowed(b) => b,
            Storage::Shared(r) => r.as_slice(),
        }
    }

    pub(crate) fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Storage::Owned(b) => Some(b),
            Storage::Borrowed(b) => Some(b),
            Storage::Shared(_) => None,
        }
    }

    pub(crate) fn is_writable(&self) -> bool {
        !matches!(self, Storage::Shared(_))
    }

    pub(crate) fn shared_region(&self) -> Option<&SharedRegion> {
        match self {
            Storage::Shared(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_region_reports_nonzero_address() {
        let region = DataRegion::direct(16);
        assert!(region.base_address() != 0);
        assert_eq!(region.len(), 16);
        assert!(region.mode().is_direct());
    }

    #[test]
    fn heap_region_has_no_native_address() {
        let region = DataRegion::heap(16);
        assert_eq!(region.base_address(), 0);
        assert!(!region.mode().is_direct());
    }

    #[test]
    fn regions_are_zero_initialised() {
        let region = DataRegion::direct(32);
        assert!(region.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn address_is_stable_across_sharing() {
        let region = DataRegion::direct_from(b"hello\0");
        let before = region.base_address();
        let shared = region.into_shared();
        assert_eq!(shared.base_address(), before);
        assert_eq!(shared.as_slice(), b"hello\0");
    }

    #[test]
    fn distinct_regions_have_distinct_addresses() {
        let a = DataRegion::direct(8);
        let b = DataRegion::direct(8);
        assert_ne!(a.base_address(), b.base_address());
    }

    #[test]
    fn write_at_places_content() {
        let mut region = DataRegion::direct(8);
        region.write_at(2, &[0xAA, 0xBB]);
        assert_eq!(&region.as_slice()[2..4], &[0xAA, 0xBB]);
        region.as_mut_slice()[7] = 0xCC;
        assert_eq!(region.as_slice()[7], 0xCC);
    }
}
