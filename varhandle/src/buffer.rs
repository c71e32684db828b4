use std::{fmt, sync::Arc};

use crate::{Array, PrimitiveType, Storage};

/// A window onto shared byte storage.
///
/// Cloning is cheap and shares the bytes. Indices used by views are
/// relative to the window start and bounded by `limit`.
#[derive(Clone)]
pub struct ByteBuffer {
    storage: Arc<Storage>,
    offset: usize,
    capacity: usize,
    limit: usize,
    read_only: bool,
}

impl ByteBuffer {
    pub fn allocate(capacity: usize) -> Self {
        Self::over(Arc::new(Storage::zeroed(capacity)))
    }

    pub fn wrap(bytes: &[u8]) -> Self {
        Self::over(Arc::new(Storage::from_bytes(bytes)))
    }

    /// Buffer sharing the bytes of a `byte[]`.
    ///
    /// Byte-element handles on the array and wider views on the buffer then
    /// address the same bytes with atomics of different sizes. Such
    /// accesses must not race with each other; hand the bytes over between
    /// threads through some other synchronization first.
    pub fn wrap_array(array: &Arc<Array>) -> Option<Self> {
        if array.element() != PrimitiveType::Byte {
            return None;
        }
        Some(Self::over(array.shared_storage().clone()))
    }

    fn over(storage: Arc<Storage>) -> Self {
        let capacity = storage.len();
        Self {
            storage,
            offset: 0,
            capacity,
            limit: capacity,
            read_only: false,
        }
    }

    /// Sub window `[from, from + len)` of this buffer.
    pub fn slice(&self, from: usize, len: usize) -> Option<Self> {
        let end = from.checked_add(len)?;
        if end > self.limit {
            return None;
        }
        Some(Self {
            storage: self.storage.clone(),
            offset: self.offset + from,
            capacity: len,
            limit: len,
            read_only: self.read_only,
        })
    }

    pub fn with_limit(&self, limit: usize) -> Option<Self> {
        if limit > self.capacity {
            return None;
        }
        Some(Self {
            limit,
            ..self.clone()
        })
    }

    pub fn as_read_only(&self) -> Self {
        Self {
            read_only: true,
            ..self.clone()
        }
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Distance of the address of byte `index` from the previous multiple of `unit`.
    pub fn alignment_offset(&self, index: usize, unit: usize) -> usize {
        debug_assert!(unit.is_power_of_two());
        (self.storage.base() as usize + self.offset + index) & (unit - 1)
    }

    /// Snapshot of the bytes up to `limit`.
    ///
    /// Reads byte by byte, so it must not race with view accesses wider
    /// than one byte. Snapshot only after writers have been joined.
    pub fn to_vec(&self) -> Vec<u8> {
        (self.offset..self.offset + self.limit)
            .filter_map(|i| self.storage.byte(i))
            .collect()
    }

    /// Same storage, window and limit.
    pub fn same_view(&self, other: &ByteBuffer) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
            && self.offset == other.offset
            && self.limit == other.limit
    }

    #[inline]
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity)
            .field("read_only", &self.read_only)
            .finish()
    }
}
