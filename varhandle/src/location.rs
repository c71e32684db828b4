//! Coordinate resolution.
//!
//! Turns the coordinate arguments of an access into a `Location`: the
//! backing storage, the byte offset, and how to move bits in and out of it
//! (byte swapping for non-native views, bytewise transfer for misaligned
//! plain accesses).
//!
//! A misaligned plain access moves single bytes and may tear. Racing it
//! against an aligned atomic access of the same bytes mixes atomic sizes,
//! which is outside Rust's memory model.
use std::sync::{Arc, atomic::Ordering};

use crate::{
    AccessError, AccessMode, ByteOrder, ObjectRef, PrimitiveType, Result, Storage, Value, bounds,
    capability::READ_ONLY_VIEW, memory,
};

/// What a handle points at, independent of any container instance.
#[derive(Debug)]
pub(crate) enum Target {
    Field { offset: usize },
    Static { cell: Arc<Storage> },
    ArrayElement,
    ByteArrayView { order: ByteOrder },
    ByteBufferView { order: ByteOrder },
}

impl Target {
    pub(crate) fn byte_order(&self) -> Option<ByteOrder> {
        match self {
            Target::ByteArrayView { order } | Target::ByteBufferView { order } => Some(*order),
            _ => None,
        }
    }
}

/// A resolved, validated location of one variable.
#[derive(Debug)]
pub(crate) struct Location<'a> {
    storage: &'a Storage,
    offset: usize,
    width: usize,
    swap: bool,
    aligned: bool,
}

fn container(coords: &[Value]) -> Result<&ObjectRef> {
    match coords.first() {
        Some(Value::Ref(obj)) => Ok(obj),
        Some(Value::Null) | None => Err(AccessError::NullReference { position: 0 }),
        Some(other) => Err(AccessError::ClassCast {
            position: 0,
            expected: "Object".to_string(),
            actual: other.type_name(),
        }),
    }
}

fn index(coords: &[Value]) -> Result<i32> {
    let value = coords.get(1).ok_or(AccessError::NullReference { position: 1 })?;
    value
        .widen(PrimitiveType::Int)
        .and_then(|v| v.as_i32())
        .ok_or_else(|| AccessError::ClassCast {
            position: 1,
            expected: "int".to_string(),
            actual: value.type_name(),
        })
}

fn mismatch(obj: &ObjectRef, expected: &str) -> AccessError {
    AccessError::ClassCast {
        position: 0,
        expected: expected.to_string(),
        actual: obj.ref_type().name(),
    }
}

/// Resolve `coords` against `target` for an access of `mode`.
///
/// Applies the read-only, bounds and alignment checks in that order.
pub(crate) fn locate<'a>(
    target: &'a Target,
    mode: AccessMode,
    var_type: PrimitiveType,
    coords: &'a [Value],
) -> Result<Location<'a>> {
    let width = var_type.width();
    let aligned_at = |storage: &'a Storage, offset: usize| Location {
        storage,
        offset,
        width,
        swap: false,
        aligned: true,
    };

    match target {
        Target::Static { cell } => Ok(aligned_at(&**cell, 0)),
        Target::Field { offset } => match container(coords)? {
            ObjectRef::Instance(instance) => Ok(aligned_at(instance.storage(), *offset)),
            other => Err(mismatch(other, "instance")),
        },
        Target::ArrayElement => match container(coords)? {
            ObjectRef::Array(array) => {
                let i = bounds::check_index(index(coords)?, array.len())?;
                Ok(aligned_at(array.storage(), i * width))
            }
            other => Err(mismatch(other, "array")),
        },
        Target::ByteArrayView { order } => match container(coords)? {
            ObjectRef::Array(array) => {
                let i = bounds::check_view_index(index(coords)?, array.len(), width)?;
                let storage = array.storage();
                let misalignment = (storage.base() as usize + i) & (width - 1);
                let aligned = bounds::check_alignment(mode, i, misalignment, width)?;
                Ok(Location {
                    storage,
                    offset: i,
                    width,
                    swap: !order.is_native(),
                    aligned,
                })
            }
            other => Err(mismatch(other, "byte[]")),
        },
        Target::ByteBufferView { order } => match container(coords)? {
            ObjectRef::Buffer(buffer) => {
                if buffer.is_read_only() && !READ_ONLY_VIEW.supports(mode) {
                    return Err(AccessError::ReadOnlyBuffer { mode });
                }
                let i = bounds::check_view_index(index(coords)?, buffer.limit(), width)?;
                let misalignment = buffer.alignment_offset(i, width);
                let aligned = bounds::check_alignment(mode, i, misalignment, width)?;
                Ok(Location {
                    storage: buffer.storage(),
                    offset: buffer.offset() + i,
                    width,
                    swap: !order.is_native(),
                    aligned,
                })
            }
            other => Err(mismatch(other, "ByteBuffer")),
        },
    }
}

impl Location<'_> {
    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    /// Whether arithmetic on the stored bits equals arithmetic on the value.
    #[inline]
    pub(crate) fn is_native(&self) -> bool {
        !self.swap
    }

    #[inline]
    fn ptr(&self) -> *mut u8 {
        self.storage.ptr_at(self.offset)
    }

    #[inline]
    fn encode(&self, bits: u64) -> u64 {
        if self.swap { memory::swap_bytes(bits, self.width) } else { bits }
    }

    pub(crate) fn load(&self, order: Ordering) -> u64 {
        let raw = if self.aligned {
            // SAFETY: bounds and alignment were validated by `locate`
            unsafe { memory::load(self.ptr(), self.width, order) }
        } else {
            // SAFETY: bounds were validated by `locate`
            unsafe { memory::load_bytewise(self.ptr(), self.width) }
        };
        self.encode(raw)
    }

    pub(crate) fn store(&self, bits: u64, order: Ordering) {
        let raw = self.encode(bits);
        if self.aligned {
            // SAFETY: bounds and alignment were validated by `locate`
            unsafe { memory::store(self.ptr(), self.width, raw, order) }
        } else {
            // SAFETY: bounds were validated by `locate`
            unsafe { memory::store_bytewise(self.ptr(), self.width, raw) }
        }
    }

    pub(crate) fn swap(&self, bits: u64, order: Ordering) -> u64 {
        debug_assert!(self.aligned);
        // SAFETY: atomic modes only resolve aligned locations
        let raw = unsafe { memory::swap(self.ptr(), self.width, self.encode(bits), order) };
        self.encode(raw)
    }

    /// Native integer add, only valid when `is_native`.
    pub(crate) fn fetch_add(&self, delta: u64, order: Ordering) -> u64 {
        debug_assert!(self.aligned && !self.swap);
        // SAFETY: atomic modes only resolve aligned locations
        unsafe { memory::fetch_add(self.ptr(), self.width, delta, order) }
    }

    pub(crate) fn compare_exchange(
        &self,
        current: u64,
        new: u64,
        (success, failure): (Ordering, Ordering),
        weak: bool,
    ) -> std::result::Result<u64, u64> {
        debug_assert!(self.aligned);
        // SAFETY: atomic modes only resolve aligned locations
        let result = unsafe {
            memory::compare_exchange(
                self.ptr(),
                self.width,
                self.encode(current),
                self.encode(new),
                success,
                failure,
                weak,
            )
        };
        result.map(|v| self.encode(v)).map_err(|v| self.encode(v))
    }
}
