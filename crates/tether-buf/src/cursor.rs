//! The element-agnostic bounds-checked cursor core.

use tether_core::{AccessError, Addressable, MemoryMode};

use crate::region::{SharedRegion, Storage};

/// A fixed-capacity sequence of fixed-width slots with a cursor.
///
/// The buffer views its backing bytes as `capacity` slots of
/// `element_size` bytes each. Capacity is derived by truncating integer
/// division: trailing bytes that do not fill a whole slot are simply
/// never addressed. The cursor invariant `0 <= position <= limit <=
/// capacity` holds at all times; any operation that would break it
/// fails with an [`AccessError`] and has no effect.
///
/// No allocation happens after construction — all mutators work
/// in place on the owned or borrowed region. Buffers built over a
/// [`SharedRegion`] are read-only views: content is staged before the
/// region is shared, and writes fail with [`AccessError::ReadOnly`].
#[derive(Debug)]
pub struct CursorBuffer<'a> {
    storage: Storage<'a>,
    mode: MemoryMode,
    element_size: usize,
    capacity: usize,
    position: usize,
    limit: usize,
}

impl<'a> CursorBuffer<'a> {
    /// Allocate an owned, zeroed buffer of `count` slots of
    /// `element_size` bytes each.
    ///
    /// # Panics
    ///
    /// Panics if `count * element_size` overflows `usize`.
    pub fn allocate(count: usize, element_size: usize, mode: MemoryMode) -> Self {
        Self::owned(count, element_size, mode)
    }

    /// Borrow caller memory as a buffer of `element_size`-byte slots.
    ///
    /// Capacity truncates to whole slots; the caller retains ownership
    /// of the bytes.
    pub fn wrap(bytes: &'a mut [u8], element_size: usize, mode: MemoryMode) -> Self {
        Self::borrowed(bytes, element_size, mode)
    }

    /// Allocate an owned, zeroed buffer of `count` slots.
    pub(crate) fn owned(count: usize, element_size: usize, mode: MemoryMode) -> Self {
        debug_assert!(element_size > 0);
        let bytes = count
            .checked_mul(element_size)
            .expect("slot count overflows the addressable byte range");
        let storage = Storage::Owned(vec![0u8; bytes].into_boxed_slice());
        Self {
            storage,
            mode,
            element_size,
            capacity: count,
            position: 0,
            limit: count,
        }
    }

    /// Borrow caller memory without copying.
    ///
    /// The caller retains ownership; slot count truncates to whole
    /// elements of `bytes`.
    pub(crate) fn borrowed(bytes: &'a mut [u8], element_size: usize, mode: MemoryMode) -> Self {
        debug_assert!(element_size > 0);
        let capacity = bytes.len() / element_size;
        Self {
            storage: Storage::Borrowed(bytes),
            mode,
            element_size,
            capacity,
            position: 0,
            limit: capacity,
        }
    }

    /// Build a read-only view over a shared region.
    ///
    /// The buffer's mode follows the region's; slot count truncates to
    /// whole elements. Writes fail with [`AccessError::ReadOnly`].
    pub(crate) fn shared(region: SharedRegion, element_size: usize) -> Self {
        debug_assert!(element_size > 0);
        let mode = region.mode();
        let capacity = region.as_slice().len() / element_size;
        Self {
            storage: Storage::Shared(region),
            mode,
            element_size,
            capacity,
            position: 0,
            limit: capacity,
        }
    }

    /// The shared region backing this buffer, if it is a shared view.
    pub fn region(&self) -> Option<&SharedRegion> {
        self.storage.shared_region()
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes per slot, fixed at construction.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Memory mode of the backing region.
    pub fn mode(&self) -> MemoryMode {
        self.mode
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor to `position`.
    ///
    /// The position must remain a valid element index, so `capacity`
    /// itself is out of bounds. On failure the prior position is kept.
    pub fn set_position(&mut self, position: usize) -> Result<(), AccessError> {
        if position >= self.capacity {
            return Err(AccessError::Position {
                requested: position,
                capacity: self.capacity,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Slots visible to relative and bulk operations.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Set the limit; must lie in `[position, capacity]`.
    pub fn set_limit(&mut self, limit: usize) -> Result<(), AccessError> {
        if limit < self.position || limit > self.capacity {
            return Err(AccessError::Limit {
                requested: limit,
                position: self.position,
                capacity: self.capacity,
            });
        }
        self.limit = limit;
        Ok(())
    }

    /// Elements between the cursor and the limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Whether any elements remain before the limit.
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Reset the cursor to zero. Limit and contents are untouched.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Shared bytes of the slot at `index`.
    pub fn slot(&self, index: usize) -> Result<&[u8], AccessError> {
        self.check_index(index)?;
        let start = index * self.element_size;
        Ok(&self.storage.bytes()[start..start + self.element_size])
    }

    /// Mutable bytes of the slot at `index`.
    ///
    /// Fails with [`AccessError::ReadOnly`] on a shared view.
    pub fn slot_mut(&mut self, index: usize) -> Result<&mut [u8], AccessError> {
        self.check_index(index)?;
        self.ensure_writable()?;
        let start = index * self.element_size;
        let bytes = self
            .storage
            .bytes_mut()
            .expect("writable storage has mutable bytes");
        Ok(&mut bytes[start..start + self.element_size])
    }

    /// Verify the backing storage accepts writes.
    pub(crate) fn ensure_writable(&self) -> Result<(), AccessError> {
        if self.storage.is_writable() {
            Ok(())
        } else {
            Err(AccessError::ReadOnly)
        }
    }

    /// Claim the current slot for a relative operation and advance.
    ///
    /// Fails if the cursor has reached the limit; the cursor only moves
    /// on success.
    pub(crate) fn advance(&mut self) -> Result<usize, AccessError> {
        if self.position >= self.limit {
            return Err(AccessError::Bulk {
                requested: 1,
                remaining: 0,
            });
        }
        let index = self.position;
        self.position += 1;
        Ok(index)
    }

    /// Verify a bulk operation of `len` elements fits before the limit.
    pub(crate) fn check_bulk(&self, len: usize) -> Result<(), AccessError> {
        if len > self.remaining() {
            return Err(AccessError::Bulk {
                requested: len,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Advance the cursor by `len` after a successful bulk operation.
    pub(crate) fn advance_by(&mut self, len: usize) {
        debug_assert!(len <= self.remaining());
        self.position += len;
    }

    fn check_index(&self, index: usize) -> Result<(), AccessError> {
        if index >= self.capacity {
            return Err(AccessError::Index {
                index,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(count: usize) -> CursorBuffer<'static> {
        CursorBuffer::owned(count, 8, MemoryMode::Heap)
    }

    #[test]
    fn capacity_and_defaults() {
        let b = buf(4);
        assert_eq!(b.capacity(), 4);
        assert_eq!(b.element_size(), 8);
        assert_eq!(b.mode(), MemoryMode::Heap);
        assert_eq!(b.position(), 0);
        assert_eq!(b.limit(), 4);
        assert_eq!(b.remaining(), 4);
        assert!(b.has_remaining());
    }

    #[test]
    fn public_constructors_mirror_the_internal_ones() {
        let b = CursorBuffer::allocate(3, 4, MemoryMode::Direct);
        assert_eq!(b.capacity(), 3);
        assert_eq!(b.element_size(), 4);
        assert!(b.mode().is_direct());

        let mut bytes = [0u8; 12];
        let b = CursorBuffer::wrap(&mut bytes, 4, MemoryMode::Heap);
        assert_eq!(b.capacity(), 3);
    }

    #[test]
    fn borrowed_capacity_truncates_partial_slots() {
        let mut bytes = [0u8; 19];
        let b = CursorBuffer::borrowed(&mut bytes, 8, MemoryMode::Heap);
        // 19 / 8 == 2; the trailing 3 bytes are never addressed.
        assert_eq!(b.capacity(), 2);
    }

    #[test]
    fn set_position_rejects_capacity_itself() {
        let mut b = buf(4);
        b.set_position(3).unwrap();
        assert_eq!(b.position(), 3);
        let err = b.set_position(4).unwrap_err();
        assert!(matches!(err, AccessError::Position { requested: 4, capacity: 4 }));
        // Failed move leaves the prior position.
        assert_eq!(b.position(), 3);
    }

    #[test]
    fn limit_bounds_are_position_and_capacity() {
        let mut b = buf(8);
        b.set_position(3).unwrap();
        assert!(b.set_limit(3).is_ok());
        assert!(b.set_limit(8).is_ok());
        assert!(matches!(b.set_limit(2), Err(AccessError::Limit { .. })));
        assert!(matches!(b.set_limit(9), Err(AccessError::Limit { .. })));
    }

    #[test]
    fn remaining_honours_limit_not_capacity() {
        let mut b = buf(8);
        b.set_limit(5).unwrap();
        b.set_position(2).unwrap();
        assert_eq!(b.remaining(), 3);
    }

    #[test]
    fn rewind_keeps_limit() {
        let mut b = buf(8);
        b.set_limit(5).unwrap();
        b.set_position(4).unwrap();
        b.rewind();
        assert_eq!(b.position(), 0);
        assert_eq!(b.limit(), 5);
    }

    #[test]
    fn advance_stops_at_limit() {
        let mut b = buf(2);
        assert_eq!(b.advance().unwrap(), 0);
        assert_eq!(b.advance().unwrap(), 1);
        let err = b.advance().unwrap_err();
        assert!(matches!(err, AccessError::Bulk { requested: 1, remaining: 0 }));
        assert_eq!(b.position(), 2);
    }

    #[test]
    fn shared_views_read_but_never_write() {
        let mut region = crate::region::DataRegion::direct(24);
        region.write_at(8, &[0xEE; 8]);
        let mut b = CursorBuffer::shared(region.into_shared(), 8);
        assert_eq!(b.capacity(), 3);
        assert!(b.mode().is_direct());
        assert!(b.region().is_some());
        assert_eq!(b.slot(1).unwrap(), &[0xEE; 8]);
        assert!(matches!(b.slot_mut(1), Err(AccessError::ReadOnly)));
    }

    #[test]
    fn owned_and_borrowed_buffers_have_no_shared_region() {
        assert!(buf(2).region().is_none());
        let mut bytes = [0u8; 16];
        assert!(CursorBuffer::wrap(&mut bytes, 8, MemoryMode::Heap).region().is_none());
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn pathological_slot_count_panics_instead_of_wrapping() {
        let _ = CursorBuffer::allocate(usize::MAX / 4, 8, MemoryMode::Heap);
    }

    #[test]
    fn slot_round_trip() {
        let mut b = buf(2);
        b.slot_mut(1).unwrap().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(b.slot(1).unwrap(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(b.slot(2).is_err());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            SetPosition(usize),
            SetLimit(usize),
            Advance,
            Rewind,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0usize..12).prop_map(Op::SetPosition),
                (0usize..12).prop_map(Op::SetLimit),
                Just(Op::Advance),
                Just(Op::Rewind),
            ]
        }

        proptest! {
            #[test]
            fn cursor_invariant_holds_under_arbitrary_ops(
                ops in proptest::collection::vec(op_strategy(), 1..40),
            ) {
                let mut b = buf(8);
                for op in ops {
                    // Failures are fine; the invariant must survive either way.
                    match op {
                        Op::SetPosition(p) => { let _ = b.set_position(p); }
                        Op::SetLimit(l) => { let _ = b.set_limit(l); }
                        Op::Advance => { let _ = b.advance(); }
                        Op::Rewind => b.rewind(),
                    }
                    prop_assert!(b.position() <= b.limit());
                    prop_assert!(b.limit() <= b.capacity());
                }
            }
        }
    }
}
