//! Capability traits implemented across the buffer family.

use crate::error::AccessError;
use crate::mode::MemoryMode;
use crate::width::NativeWidth;

/// Bounds-checked cursor interface shared by all native-sized buffers.
///
/// The invariant `0 <= position <= limit <= capacity` holds at all
/// times; every mutator that would break it fails with an
/// [`AccessError`] and changes nothing.
pub trait NativeBuffer {
    /// Total number of fixed-width slots.
    fn capacity(&self) -> usize;

    /// Current cursor position, in elements.
    fn position(&self) -> usize;

    /// Move the cursor.
    ///
    /// The new position must be a valid element index: `capacity()`
    /// itself is rejected, not just values beyond it.
    fn set_position(&mut self, position: usize) -> Result<(), AccessError>;

    /// Number of slots visible to relative and bulk operations.
    fn limit(&self) -> usize;

    /// Reduce (or restore) the limit. Must lie in `[position, capacity]`.
    fn set_limit(&mut self, limit: usize) -> Result<(), AccessError>;

    /// Elements between the cursor and the limit.
    fn remaining(&self) -> usize {
        self.limit() - self.position()
    }

    /// Whether any elements remain before the limit.
    fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Reset the cursor to zero without touching limit or contents.
    fn rewind(&mut self);

    /// The element width this buffer was built with.
    fn width(&self) -> NativeWidth;

    /// Memory mode of the backing region.
    fn mode(&self) -> MemoryMode;
}

/// A byte region whose native address may be extractable.
///
/// Implemented by region types in `tether-buf`; consumed by
/// [`AddressResolver`] implementations so that resolution fakes can be
/// written without depending on a concrete region type.
pub trait Addressable: Send + Sync {
    /// Memory mode of the region.
    fn mode(&self) -> MemoryMode;

    /// The region's stable base address, or 0 if it has none.
    ///
    /// Only direct regions report a non-zero address.
    fn base_address(&self) -> u64;

    /// Length of the region in bytes.
    fn len(&self) -> usize;

    /// Whether the region is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The native address-extraction capability.
///
/// Returns the true process address of a region, or 0 if the region is
/// unresolvable. The system implementation lives in `tether-loader`
/// and is handed out only once its backing capability is registered;
/// tests inject fakes returning fixed or null addresses.
pub trait AddressResolver: Send + Sync {
    /// Resolve a region to its native address, or 0 on failure.
    fn resolve(&self, region: &dyn Addressable) -> u64;
}
