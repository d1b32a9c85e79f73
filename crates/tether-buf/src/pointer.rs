//! Pointer arrays: native-width slots plus address-to-region tracking.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tether_core::{
    AccessError, AddressResolver, Addressable, MemoryMode, NativeBuffer, NativeWidth,
    ReferenceError,
};

use crate::native::NativeSizeArray;
use crate::region::SharedRegion;

/// A [`NativeSizeArray`] that can record which region a stored address
/// belongs to, and keep that region alive while the address stays
/// recorded.
///
/// Native code sees only the raw integer slots; the table restores the
/// managed side of the picture. The table is keyed by address, not by
/// slot: two slots holding the same address share one entry, and a
/// plain [`put`](PointerArray::put) never creates an entry, so
/// [`resolve_at`](PointerArray::resolve_at) legitimately returns `None`
/// for raw values.
///
/// Overwriting a slot with a different address does **not** prune the
/// old address's entry — the old region stays alive until the array is
/// dropped or the entry is removed with
/// [`forget_address`](PointerArray::forget_address). The table only
/// grows or is overwritten, never compacted behind the caller's back.
pub struct PointerArray<'a> {
    array: NativeSizeArray<'a>,
    table: IndexMap<u64, SharedRegion>,
    resolver: Arc<dyn AddressResolver>,
}

impl<'a> PointerArray<'a> {
    /// Allocate a zeroed heap-mode pointer array of `count` slots.
    pub fn allocate(count: usize, width: NativeWidth, resolver: Arc<dyn AddressResolver>) -> Self {
        Self {
            array: NativeSizeArray::allocate(count, width),
            table: IndexMap::new(),
            resolver,
        }
    }

    /// Allocate a zeroed direct-mode pointer array of `count` slots.
    pub fn allocate_direct(
        count: usize,
        width: NativeWidth,
        resolver: Arc<dyn AddressResolver>,
    ) -> Self {
        Self {
            array: NativeSizeArray::allocate_direct(count, width),
            table: IndexMap::new(),
            resolver,
        }
    }

    /// Allocate a heap array holding `values`, rewound to the start.
    pub fn from_slice(
        values: &[u64],
        width: NativeWidth,
        resolver: Arc<dyn AddressResolver>,
    ) -> Result<Self, AccessError> {
        Ok(Self {
            array: NativeSizeArray::from_slice(values, width)?,
            table: IndexMap::new(),
            resolver,
        })
    }

    /// Allocate a direct array holding `values`, rewound to the start.
    pub fn from_slice_direct(
        values: &[u64],
        width: NativeWidth,
        resolver: Arc<dyn AddressResolver>,
    ) -> Result<Self, AccessError> {
        Ok(Self {
            array: NativeSizeArray::from_slice_direct(values, width)?,
            table: IndexMap::new(),
            resolver,
        })
    }

    /// Build a read-only pointer-array view over a shared region.
    ///
    /// Raw reads and [`resolve_at`](PointerArray::resolve_at) work;
    /// writes and reference operations fail with
    /// [`AccessError::ReadOnly`].
    pub fn with_region(
        region: SharedRegion,
        width: NativeWidth,
        resolver: Arc<dyn AddressResolver>,
    ) -> Self {
        Self {
            array: NativeSizeArray::with_region(region, width),
            table: IndexMap::new(),
            resolver,
        }
    }

    /// The shared region backing this array, if it was built with
    /// [`with_region`](PointerArray::with_region).
    pub fn region(&self) -> Option<&SharedRegion> {
        self.array.region()
    }

    /// Borrow caller bytes as a heap-mode pointer array.
    pub fn wrap(
        bytes: &'a mut [u8],
        width: NativeWidth,
        resolver: Arc<dyn AddressResolver>,
    ) -> Self {
        Self {
            array: NativeSizeArray::wrap(bytes, width),
            table: IndexMap::new(),
            resolver,
        }
    }

    /// Bytes per slot.
    pub fn element_size(&self) -> usize {
        self.array.element_size()
    }

    /// Record `region`'s native address at `index`.
    ///
    /// Resolves the region's true address, masks it to the active
    /// width, writes it into the slot, and inserts `address → region`
    /// into the table so the region outlives every native holder of
    /// the address. The cursor does not move.
    ///
    /// Referencing a second region that resolves to an address already
    /// in the table replaces the prior entry; the replaced region loses
    /// this array's keep-alive guarantee.
    ///
    /// Fails with [`ReferenceError::ModeMismatch`] when the region's
    /// memory mode differs from the array's, and with
    /// [`ReferenceError::Unresolvable`] when the resolver returns zero.
    /// On any failure neither the slot nor the table changes.
    pub fn reference_at(
        &mut self,
        index: usize,
        region: &SharedRegion,
    ) -> Result<(), ReferenceError> {
        let address = self.resolve_address(region)?;
        self.array.put_at(index, address)?;
        self.table.insert(address, Arc::clone(region));
        Ok(())
    }

    /// Record `region`'s native address at the cursor and advance by one.
    pub fn reference(&mut self, region: &SharedRegion) -> Result<(), ReferenceError> {
        let address = self.resolve_address(region)?;
        self.array.put(address)?;
        self.table.insert(address, Arc::clone(region));
        Ok(())
    }

    /// Look up the region whose address is stored at `index`.
    ///
    /// Returns `None` — not an error — when no region was ever
    /// referenced under that exact address value, which is the normal
    /// outcome for slots written by a plain [`put`](PointerArray::put).
    pub fn resolve_at(&self, index: usize) -> Result<Option<SharedRegion>, AccessError> {
        let address = self.array.get_at(index)?;
        Ok(self.table.get(&address).cloned())
    }

    /// Look up the region addressed at the cursor and advance by one.
    pub fn resolve(&mut self) -> Result<Option<SharedRegion>, AccessError> {
        let address = self.array.get()?;
        Ok(self.table.get(&address).cloned())
    }

    /// Drain `src`'s remaining values into this array, carrying each
    /// copied address's association along.
    ///
    /// For every copied value that the source tracks, the source's
    /// entry is inserted here (overwriting any prior entry for that
    /// address). Values the source does not track are copied as plain
    /// integers and leave this table untouched for that address, so an
    /// association this array already holds is never silently dropped.
    ///
    /// All-or-nothing over the slots: remaining space and width are
    /// verified before any value is copied.
    pub fn put_buffer(&mut self, src: &mut PointerArray<'_>) -> Result<(), AccessError> {
        self.array.check_incoming(&src.array)?;
        while src.array.has_remaining() {
            let address = src.array.get()?;
            self.array.put(address)?;
            if let Some(region) = src.table.get(&address) {
                self.table.insert(address, Arc::clone(region));
            }
        }
        Ok(())
    }

    /// Read the raw value at `index`. The cursor does not move.
    pub fn get_at(&self, index: usize) -> Result<u64, AccessError> {
        self.array.get_at(index)
    }

    /// Read the raw value at the cursor and advance by one.
    pub fn get(&mut self) -> Result<u64, AccessError> {
        self.array.get()
    }

    /// Write a raw value at `index` without touching the table.
    pub fn put_at(&mut self, index: usize, value: u64) -> Result<(), AccessError> {
        self.array.put_at(index, value)
    }

    /// Write a raw value at the cursor and advance by one.
    pub fn put(&mut self, value: u64) -> Result<(), AccessError> {
        self.array.put(value)
    }

    /// Copy `len` raw values into `dest[offset..]`, advancing by `len`.
    pub fn get_into(
        &mut self,
        dest: &mut [u64],
        offset: usize,
        len: usize,
    ) -> Result<(), AccessError> {
        self.array.get_into(dest, offset, len)
    }

    /// Copy `len` raw values from `src[offset..]`, advancing by `len`.
    pub fn put_from(&mut self, src: &[u64], offset: usize, len: usize) -> Result<(), AccessError> {
        self.array.put_from(src, offset, len)
    }

    /// Number of addresses currently tracked (and regions kept alive).
    pub fn tracked(&self) -> usize {
        self.table.len()
    }

    /// Drop the keep-alive entry for `address`, returning the region.
    ///
    /// The slot contents are untouched; after this, native code must no
    /// longer dereference the address unless the region is kept alive
    /// elsewhere.
    pub fn forget_address(&mut self, address: u64) -> Option<SharedRegion> {
        // shift_remove keeps the table's insertion order intact.
        self.table.shift_remove(&address)
    }

    fn resolve_address(&self, region: &SharedRegion) -> Result<u64, ReferenceError> {
        if region.mode() != self.mode() {
            return Err(ReferenceError::ModeMismatch {
                buffer: self.mode(),
                region: region.mode(),
            });
        }
        let address = self.resolver.resolve(region.as_ref());
        if address == 0 {
            return Err(ReferenceError::Unresolvable);
        }
        Ok(address & self.width().mask())
    }
}

impl NativeBuffer for PointerArray<'_> {
    fn capacity(&self) -> usize {
        self.array.capacity()
    }

    fn position(&self) -> usize {
        self.array.position()
    }

    fn set_position(&mut self, position: usize) -> Result<(), AccessError> {
        self.array.set_position(position)
    }

    fn limit(&self) -> usize {
        self.array.limit()
    }

    fn set_limit(&mut self, limit: usize) -> Result<(), AccessError> {
        self.array.set_limit(limit)
    }

    fn rewind(&mut self) {
        self.array.rewind();
    }

    fn width(&self) -> NativeWidth {
        self.array.width()
    }

    fn mode(&self) -> MemoryMode {
        self.array.mode()
    }
}

impl fmt::Debug for PointerArray<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerArray")
            .field("array", &self.array)
            .field("tracked", &self.table.len())
            .finish_non_exhaustive()
    }
}
