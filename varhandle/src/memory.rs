//! Width dispatched atomic primitives over raw storage pointers.
//!
//! All functions take bit patterns zero extended to `u64` and interpret
//! them in native byte order. Byte order of views is handled one level up.
//!
//! The same bytes may be reached through atomics of different widths: a
//! `byte[]` shared with a buffer, bytewise fallbacks, snapshots. Rust's
//! memory model does not define racing atomic accesses of mixed sizes, so
//! those combinations are only sound when they do not overlap in time.
use std::sync::atomic::{AtomicU8, AtomicU16, AtomicU32, AtomicU64, Ordering};

macro_rules! with_atomic {
    ($width:expr, $ptr:expr, |$cell:ident: $int:ident| $body:expr) => {
        match $width {
            1 => {
                type $int = u8;
                // SAFETY: caller guarantees a valid, aligned location
                let $cell = unsafe { AtomicU8::from_ptr($ptr) };
                $body
            }
            2 => {
                type $int = u16;
                // SAFETY: caller guarantees a valid, aligned location
                let $cell = unsafe { AtomicU16::from_ptr($ptr.cast()) };
                $body
            }
            4 => {
                type $int = u32;
                // SAFETY: caller guarantees a valid, aligned location
                let $cell = unsafe { AtomicU32::from_ptr($ptr.cast()) };
                $body
            }
            8 => {
                type $int = u64;
                // SAFETY: caller guarantees a valid, aligned location
                let $cell = unsafe { AtomicU64::from_ptr($ptr.cast()) };
                $body
            }
            other => unreachable!("unsupported access width {other}"),
        }
    };
}

/// # Safety
/// `ptr` must point to `width` live bytes inside a `Storage`, aligned to `width`.
#[inline]
pub(crate) unsafe fn load(ptr: *mut u8, width: usize, order: Ordering) -> u64 {
    with_atomic!(width, ptr, |cell: Int| cell.load(order) as u64)
}

/// # Safety
/// See [`load`].
#[inline]
pub(crate) unsafe fn store(ptr: *mut u8, width: usize, bits: u64, order: Ordering) {
    with_atomic!(width, ptr, |cell: Int| cell.store(bits as Int, order))
}

/// # Safety
/// See [`load`].
#[inline]
pub(crate) unsafe fn swap(ptr: *mut u8, width: usize, bits: u64, order: Ordering) -> u64 {
    with_atomic!(width, ptr, |cell: Int| cell.swap(bits as Int, order) as u64)
}

/// Wrapping add at `width`, returns the previous bits.
///
/// # Safety
/// See [`load`].
#[inline]
pub(crate) unsafe fn fetch_add(ptr: *mut u8, width: usize, delta: u64, order: Ordering) -> u64 {
    with_atomic!(width, ptr, |cell: Int| cell.fetch_add(delta as Int, order) as u64)
}

/// Returns `Ok(previous)` on success and `Err(witness)` on failure.
///
/// # Safety
/// See [`load`].
#[inline]
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn compare_exchange(
    ptr: *mut u8,
    width: usize,
    current: u64,
    new: u64,
    success: Ordering,
    failure: Ordering,
    weak: bool,
) -> Result<u64, u64> {
    with_atomic!(width, ptr, |cell: Int| {
        let result = if weak {
            cell.compare_exchange_weak(current as Int, new as Int, success, failure)
        } else {
            cell.compare_exchange(current as Int, new as Int, success, failure)
        };
        result.map(|v| v as u64).map_err(|v| v as u64)
    })
}

/// Byte at a time load for locations that are not aligned to `width`.
/// May observe a torn value under concurrent writes.
///
/// # Safety
/// `ptr` must point to `width` live bytes inside a `Storage`.
pub(crate) unsafe fn load_bytewise(ptr: *mut u8, width: usize) -> u64 {
    let mut bytes = [0u8; 8];
    for (i, byte) in bytes.iter_mut().enumerate().take(width) {
        // SAFETY: caller guarantees `width` valid bytes
        *byte = unsafe { AtomicU8::from_ptr(ptr.add(i)) }.load(Ordering::Relaxed);
    }
    compose_native(&bytes[..width])
}

/// # Safety
/// See [`load_bytewise`].
pub(crate) unsafe fn store_bytewise(ptr: *mut u8, width: usize, bits: u64) {
    let bytes = decompose_native(bits, width);
    for (i, byte) in bytes.iter().enumerate().take(width) {
        // SAFETY: caller guarantees `width` valid bytes
        unsafe { AtomicU8::from_ptr(ptr.add(i)) }.store(*byte, Ordering::Relaxed);
    }
}

/// Reverse the low `width` bytes of `bits`.
#[inline]
pub(crate) const fn swap_bytes(bits: u64, width: usize) -> u64 {
    match width {
        1 => bits & 0xFF,
        2 => (bits as u16).swap_bytes() as u64,
        4 => (bits as u32).swap_bytes() as u64,
        _ => bits.swap_bytes(),
    }
}

#[inline]
fn compose_native(bytes: &[u8]) -> u64 {
    let le = bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | ((*b as u64) << (8 * i)));
    if cfg!(target_endian = "little") {
        le
    } else {
        swap_bytes(le, bytes.len())
    }
}

#[inline]
fn decompose_native(bits: u64, width: usize) -> [u8; 8] {
    let le = if cfg!(target_endian = "little") {
        bits
    } else {
        swap_bytes(bits, width)
    };
    le.to_le_bytes()
}
