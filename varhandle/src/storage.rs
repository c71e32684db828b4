use std::{
    fmt,
    sync::atomic::{AtomicU8, AtomicU64, Ordering},
};

/// Raw backing memory for objects, arrays and buffers.
///
/// Backed by whole 64-bit words so the base address is always 8-byte
/// aligned and every byte lives inside an `UnsafeCell`. Accesses go
/// through atomics sized to the element width.
pub struct Storage {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl Storage {
    pub fn zeroed(len: usize) -> Self {
        let words = (0..len.div_ceil(8)).map(|_| AtomicU64::new(0)).collect();
        Self { words, len }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let words = bytes
            .chunks(8)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word[..chunk.len()].copy_from_slice(chunk);
                AtomicU64::new(u64::from_ne_bytes(word))
            })
            .collect();
        Self {
            words,
            len: bytes.len(),
        }
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn base(&self) -> *mut u8 {
        self.words.as_ptr() as *mut u8
    }

    /// Pointer to byte `offset`.
    ///
    /// Caller must ensure `offset + width <= len()` before touching it.
    #[inline]
    pub(crate) fn ptr_at(&self, offset: usize) -> *mut u8 {
        debug_assert!(offset <= self.len);
        self.base().wrapping_add(offset)
    }

    #[inline]
    pub fn byte(&self, offset: usize) -> Option<u8> {
        if offset >= self.len {
            return None;
        }
        // SAFETY: in bounds, bytes are inside the atomic words
        let cell = unsafe { AtomicU8::from_ptr(self.ptr_at(offset)) };
        Some(cell.load(Ordering::Relaxed))
    }

    /// Snapshot of the contents, read one byte at a time.
    ///
    /// Not to be called concurrently with wider atomic accesses to the
    /// same storage.
    pub fn to_vec(&self) -> Vec<u8> {
        (0..self.len).filter_map(|i| self.byte(i)).collect()
    }
}

// SAFETY: all access to the words goes through atomics
unsafe impl Send for Storage {}
// SAFETY: all access to the words goes through atomics
unsafe impl Sync for Storage {}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_is_word_aligned() {
        for len in [0, 1, 7, 8, 9, 33] {
            let storage = Storage::zeroed(len);
            assert_eq!(storage.base() as usize % 8, 0);
            assert_eq!(storage.len(), len);
        }
    }

    #[test]
    fn from_bytes_preserves_contents() {
        let bytes: Vec<u8> = (1..=11).collect();
        let storage = Storage::from_bytes(&bytes);
        assert_eq!(storage.to_vec(), bytes);
        assert_eq!(storage.byte(10), Some(11));
        assert_eq!(storage.byte(11), None);
    }
}
