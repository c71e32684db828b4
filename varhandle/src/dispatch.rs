//! Memory operation of each access mode over a resolved location.
use crate::{AccessMode, AccessType, PrimitiveType, Value, location::Location, signature::Operands};

#[inline]
const fn mask(width: usize) -> u64 {
    if width >= 8 { u64::MAX } else { (1u64 << (width * 8)) - 1 }
}

/// `prev + delta` on the bit patterns of `ty`.
fn add_bits(ty: PrimitiveType, prev: u64, delta: u64) -> u64 {
    match ty {
        PrimitiveType::Float => {
            (f32::from_bits(prev as u32) + f32::from_bits(delta as u32)).to_bits() as u64
        }
        PrimitiveType::Double => (f64::from_bits(prev) + f64::from_bits(delta)).to_bits(),
        _ => prev.wrapping_add(delta) & mask(ty.width()),
    }
}

/// Add `delta`, returning `(previous, updated)` bits.
///
/// Native integers use a single atomic add. Floats and byte-swapped views
/// retry a strong compare-and-exchange until no other writer intervened.
fn get_and_add(loc: &Location<'_>, mode: AccessMode, ty: PrimitiveType, delta: u64) -> (u64, u64) {
    if loc.is_native() && !ty.is_floating() {
        let prev = loc.fetch_add(delta, mode.ordering());
        return (prev, add_bits(ty, prev, delta));
    }
    let orderings = mode.cas_orderings();
    let mut prev = loc.load(std::sync::atomic::Ordering::Relaxed);
    loop {
        let next = add_bits(ty, prev, delta);
        match loc.compare_exchange(prev, next, orderings, false) {
            Ok(_) => return (prev, next),
            Err(witness) => prev = witness,
        }
    }
}

/// Perform `mode` on `loc`. All validation has already happened.
pub(crate) fn execute(
    mode: AccessMode,
    ty: PrimitiveType,
    loc: &Location<'_>,
    operands: Operands,
) -> Value {
    let [first, second] = operands.0;
    debug_assert_eq!(loc.width(), ty.width());
    match mode.access_type() {
        AccessType::Get => Value::from_bits(ty, loc.load(mode.ordering())),
        AccessType::Set => {
            loc.store(first, mode.ordering());
            Value::Void
        }
        AccessType::CompareAndSet => {
            let ok = loc
                .compare_exchange(first, second, mode.cas_orderings(), mode.is_weak())
                .is_ok();
            Value::Boolean(ok)
        }
        AccessType::CompareAndExchange => {
            let witness = match loc.compare_exchange(first, second, mode.cas_orderings(), false) {
                Ok(prev) | Err(prev) => prev,
            };
            Value::from_bits(ty, witness)
        }
        AccessType::GetAndUpdate => match mode {
            AccessMode::GetAndAdd => Value::from_bits(ty, get_and_add(loc, mode, ty, first).0),
            AccessMode::AddAndGet => Value::from_bits(ty, get_and_add(loc, mode, ty, first).1),
            _ => Value::from_bits(ty, loc.swap(first, mode.ordering())),
        },
    }
}
