use std::{fmt, sync::Arc, sync::atomic::Ordering};

use crate::{PrimitiveType, Storage, Value, memory};

/// A fixed-length array of one primitive element type.
///
/// Elements are packed at their natural width, so element `i` of a
/// `long[]` starts at byte `8 * i`.
pub struct Array {
    element: PrimitiveType,
    len: usize,
    storage: Arc<Storage>,
}

/// Longest array an `int` index can address.
pub const MAX_LENGTH: usize = i32::MAX as usize;

impl Array {
    /// Zeroed array of `len` elements.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`MAX_LENGTH`].
    pub fn new(element: PrimitiveType, len: usize) -> Arc<Array> {
        match Array::try_new(element, len) {
            Some(array) => array,
            None => panic!("{element}[{len}] exceeds the maximum array length {MAX_LENGTH}"),
        }
    }

    /// Zeroed array of `len` elements, `None` if `len` exceeds
    /// [`MAX_LENGTH`].
    pub fn try_new(element: PrimitiveType, len: usize) -> Option<Arc<Array>> {
        if len > MAX_LENGTH {
            return None;
        }
        let bytes = len.checked_mul(element.width())?;
        Some(Arc::new(Array {
            element,
            len,
            storage: Arc::new(Storage::zeroed(bytes)),
        }))
    }

    /// Array of `values.len()` elements, `None` if a value does not
    /// convert to `element` or there are too many values.
    pub fn from_values(element: PrimitiveType, values: &[Value]) -> Option<Arc<Array>> {
        let array = Array::try_new(element, values.len())?;
        for (index, value) in values.iter().enumerate() {
            let bits = value.widen(element)?.to_bits()?;
            let ptr = array.element_ptr(index);
            // SAFETY: index < len, offset aligned to the element width
            unsafe { memory::store(ptr, element.width(), bits, Ordering::Relaxed) };
        }
        Some(array)
    }

    /// A `byte[]` holding `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is longer than [`MAX_LENGTH`].
    pub fn from_bytes(bytes: &[u8]) -> Arc<Array> {
        assert!(
            bytes.len() <= MAX_LENGTH,
            "byte[{}] exceeds the maximum array length {MAX_LENGTH}",
            bytes.len()
        );
        Arc::new(Array {
            element: PrimitiveType::Byte,
            len: bytes.len(),
            storage: Arc::new(Storage::from_bytes(bytes)),
        })
    }

    #[inline]
    pub fn element(&self) -> PrimitiveType {
        self.element
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Snapshot of the raw element bytes.
    ///
    /// Reads byte by byte. Taking a snapshot while another thread accesses
    /// the array through a handle of a wider element mixes atomic sizes on
    /// the same bytes, so only snapshot arrays that are not being mutated.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.storage.to_vec()
    }

    #[inline]
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub(crate) fn shared_storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    #[inline]
    fn element_ptr(&self, index: usize) -> *mut u8 {
        self.storage.ptr_at(index * self.element.width())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.element, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_array_is_zeroed_and_sized_by_width() {
        let array = Array::new(PrimitiveType::Long, 10);
        assert_eq!(array.len(), 10);
        assert_eq!(array.to_bytes(), vec![0; 80]);

        let chars = Array::new(PrimitiveType::Char, 3);
        assert_eq!(chars.to_bytes().len(), 6);
    }

    #[test]
    fn from_values_widens_and_rejects_mismatch() {
        let values = [Value::Byte(-1), Value::Short(2)];
        let array = Array::from_values(PrimitiveType::Int, &values).unwrap();
        let bytes = array.to_bytes();
        assert_eq!(i32::from_ne_bytes(bytes[0..4].try_into().unwrap()), -1);
        assert_eq!(i32::from_ne_bytes(bytes[4..8].try_into().unwrap()), 2);

        assert!(Array::from_values(PrimitiveType::Int, &[Value::Long(1)]).is_none());
    }

    #[test]
    fn lengths_beyond_int_range_are_rejected() {
        // would wrap to 8 bytes of backing storage if the size were unchecked
        assert!(Array::try_new(PrimitiveType::Long, (1usize << 61) + 1).is_none());
        assert!(Array::try_new(PrimitiveType::Byte, MAX_LENGTH + 1).is_none());
        assert!(Array::try_new(PrimitiveType::Long, usize::MAX).is_none());

        let empty = Array::try_new(PrimitiveType::Double, 0).unwrap();
        assert!(empty.is_empty());
        assert!(empty.to_bytes().is_empty());
    }

    #[test]
    #[should_panic(expected = "exceeds the maximum array length")]
    fn new_panics_on_oversized_length() {
        Array::new(PrimitiveType::Long, (1usize << 61) + 1);
    }

    #[test]
    fn debug_shows_element_and_length() {
        assert_eq!(format!("{:?}", Array::from_bytes(&[1, 2, 3])), "byte[3]");
    }
}
