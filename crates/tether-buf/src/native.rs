//! Arrays of native-width unsigned integers.

use tether_core::{AccessError, MemoryMode, NativeBuffer, NativeWidth};

use crate::cursor::CursorBuffer;
use crate::region::SharedRegion;

/// A [`CursorBuffer`] whose slots hold unsigned integers of the active
/// pointer width.
///
/// Values are stored native-endian and widened to `u64` on read
/// regardless of width. Writes are strict: a value too wide for a
/// 32-bit slot fails with [`AccessError::Overflow`] instead of being
/// silently truncated.
#[derive(Debug)]
pub struct NativeSizeArray<'a> {
    buf: CursorBuffer<'a>,
    width: NativeWidth,
}

impl<'a> NativeSizeArray<'a> {
    /// Allocate a zeroed heap-mode array of `count` slots.
    pub fn allocate(count: usize, width: NativeWidth) -> Self {
        Self {
            buf: CursorBuffer::owned(count, width.element_size(), MemoryMode::Heap),
            width,
        }
    }

    /// Allocate a zeroed direct-mode array of `count` slots.
    ///
    /// The backing region never moves, so its address may be handed to
    /// native code for the array's lifetime.
    pub fn allocate_direct(count: usize, width: NativeWidth) -> Self {
        Self {
            buf: CursorBuffer::owned(count, width.element_size(), MemoryMode::Direct),
            width,
        }
    }

    /// Allocate a heap array holding `values`, rewound to the start.
    pub fn from_slice(values: &[u64], width: NativeWidth) -> Result<Self, AccessError> {
        let mut array = Self::allocate(values.len(), width);
        array.put_from(values, 0, values.len())?;
        array.rewind();
        Ok(array)
    }

    /// Allocate a direct array holding `values`, rewound to the start.
    pub fn from_slice_direct(values: &[u64], width: NativeWidth) -> Result<Self, AccessError> {
        let mut array = Self::allocate_direct(values.len(), width);
        array.put_from(values, 0, values.len())?;
        array.rewind();
        Ok(array)
    }

    /// Build a read-only array view over a shared region.
    ///
    /// This is how one array's backing memory becomes referenceable by
    /// a [`PointerArray`](crate::PointerArray): stage the content in a
    /// [`DataRegion`](crate::DataRegion), share it, and view it here
    /// while the pointer array records the region's address. Capacity
    /// truncates to whole slots; writes fail with
    /// [`AccessError::ReadOnly`].
    pub fn with_region(region: SharedRegion, width: NativeWidth) -> Self {
        Self {
            buf: CursorBuffer::shared(region, width.element_size()),
            width,
        }
    }

    /// The shared region backing this array, if it was built with
    /// [`with_region`](NativeSizeArray::with_region).
    pub fn region(&self) -> Option<&SharedRegion> {
        self.buf.region()
    }

    /// Borrow caller bytes as an array without copying.
    ///
    /// Capacity truncates to whole slots. Borrowed caller memory is
    /// treated as heap mode: its lifetime cannot be extended by a
    /// pointer table, so it must not be handed to native code through
    /// this array.
    pub fn wrap(bytes: &'a mut [u8], width: NativeWidth) -> Self {
        Self {
            buf: CursorBuffer::borrowed(bytes, width.element_size(), MemoryMode::Heap),
            width,
        }
    }

    /// Bytes per slot: 4 on a 32-bit layout, 8 on 64-bit.
    pub fn element_size(&self) -> usize {
        self.width.element_size()
    }

    /// Read the value at `index`. The cursor does not move.
    pub fn get_at(&self, index: usize) -> Result<u64, AccessError> {
        let slot = self.buf.slot(index)?;
        Ok(decode(slot, self.width))
    }

    /// Read the value at the cursor and advance by one.
    pub fn get(&mut self) -> Result<u64, AccessError> {
        let index = self.buf.advance()?;
        let slot = self.buf.slot(index)?;
        Ok(decode(slot, self.width))
    }

    /// Write `value` at `index`. The cursor does not move.
    pub fn put_at(&mut self, index: usize, value: u64) -> Result<(), AccessError> {
        self.check_fits(value)?;
        let width = self.width;
        let slot = self.buf.slot_mut(index)?;
        encode(slot, value, width);
        Ok(())
    }

    /// Write `value` at the cursor and advance by one.
    ///
    /// The cursor moves only if the write succeeds.
    pub fn put(&mut self, value: u64) -> Result<(), AccessError> {
        self.check_fits(value)?;
        self.buf.ensure_writable()?;
        let width = self.width;
        let index = self.buf.advance()?;
        // advance() validated the index, ensure_writable() the storage.
        let slot = self
            .buf
            .slot_mut(index)
            .expect("writable slot at advanced index");
        encode(slot, value, width);
        Ok(())
    }

    /// Copy `len` values from the cursor into `dest[offset..]`,
    /// advancing the cursor by `len`.
    ///
    /// All-or-nothing: on any bounds failure neither the cursor nor
    /// `dest` changes.
    pub fn get_into(
        &mut self,
        dest: &mut [u64],
        offset: usize,
        len: usize,
    ) -> Result<(), AccessError> {
        check_slice(dest.len(), offset, len)?;
        self.buf.check_bulk(len)?;
        let start = self.buf.position();
        for i in 0..len {
            let slot = self.buf.slot(start + i)?;
            dest[offset + i] = decode(slot, self.width);
        }
        self.buf.advance_by(len);
        Ok(())
    }

    /// Copy `len` values from `src[offset..]` into the buffer at the
    /// cursor, advancing the cursor by `len`.
    ///
    /// All-or-nothing: bounds and width are checked for the whole range
    /// before the first slot is touched.
    pub fn put_from(&mut self, src: &[u64], offset: usize, len: usize) -> Result<(), AccessError> {
        check_slice(src.len(), offset, len)?;
        self.buf.check_bulk(len)?;
        self.buf.ensure_writable()?;
        for &value in &src[offset..offset + len] {
            self.check_fits(value)?;
        }
        let width = self.width;
        let start = self.buf.position();
        for (i, &value) in src[offset..offset + len].iter().enumerate() {
            let slot = self.buf.slot_mut(start + i)?;
            encode(slot, value, width);
        }
        self.buf.advance_by(len);
        Ok(())
    }

    /// Drain `src`'s remaining values into this array in order.
    ///
    /// Both cursors advance by the number of elements copied. Fails
    /// without effect if this array has too few remaining slots or any
    /// source value is too wide for this array's width.
    pub fn put_buffer(&mut self, src: &mut NativeSizeArray<'_>) -> Result<(), AccessError> {
        self.check_incoming(src)?;
        while src.has_remaining() {
            let value = src.get()?;
            self.put(value)?;
        }
        Ok(())
    }

    /// Pre-flight checks for draining `src` into this array.
    pub(crate) fn check_incoming(&self, src: &NativeSizeArray<'_>) -> Result<(), AccessError> {
        self.buf.check_bulk(src.remaining())?;
        self.buf.ensure_writable()?;
        if self.width == NativeWidth::W32 && src.width == NativeWidth::W64 {
            let start = src.buf.position();
            for i in 0..src.remaining() {
                let value = decode(src.buf.slot(start + i)?, src.width);
                self.check_fits(value)?;
            }
        }
        Ok(())
    }

    fn check_fits(&self, value: u64) -> Result<(), AccessError> {
        if !self.width.fits(value) {
            return Err(AccessError::Overflow {
                value,
                width: self.width,
            });
        }
        Ok(())
    }
}

impl NativeBuffer for NativeSizeArray<'_> {
    fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    fn position(&self) -> usize {
        self.buf.position()
    }

    fn set_position(&mut self, position: usize) -> Result<(), AccessError> {
        self.buf.set_position(position)
    }

    fn limit(&self) -> usize {
        self.buf.limit()
    }

    fn set_limit(&mut self, limit: usize) -> Result<(), AccessError> {
        self.buf.set_limit(limit)
    }

    fn rewind(&mut self) {
        self.buf.rewind();
    }

    fn width(&self) -> NativeWidth {
        self.width
    }

    fn mode(&self) -> MemoryMode {
        self.buf.mode()
    }
}

fn decode(slot: &[u8], width: NativeWidth) -> u64 {
    match width {
        NativeWidth::W32 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(slot);
            u64::from(u32::from_ne_bytes(raw))
        }
        NativeWidth::W64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(slot);
            u64::from_ne_bytes(raw)
        }
    }
}

fn encode(slot: &mut [u8], value: u64, width: NativeWidth) {
    match width {
        NativeWidth::W32 => slot.copy_from_slice(&(value as u32).to_ne_bytes()),
        NativeWidth::W64 => slot.copy_from_slice(&value.to_ne_bytes()),
    }
}

fn check_slice(available: usize, offset: usize, len: usize) -> Result<(), AccessError> {
    if offset.checked_add(len).is_none_or(|end| end > available) {
        return Err(AccessError::Slice {
            offset,
            len,
            available,
        });
    }
    Ok(())
}
