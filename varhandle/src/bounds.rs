use crate::{AccessError, AccessMode, Result};

/// Element `index` of an array of `length` elements.
#[inline]
pub(crate) fn check_index(index: i32, length: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < length)
        .ok_or(AccessError::IndexOutOfBounds {
            index: index as i64,
            length,
        })
}

/// Byte `index` of a view reading `width` bytes out of `limit`.
#[inline]
pub(crate) fn check_view_index(index: i32, limit: usize, width: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i.checked_add(width).is_some_and(|end| end <= limit))
        .ok_or(AccessError::IndexOutOfBounds {
            index: index as i64,
            length: limit,
        })
}

/// Fails unless the location is aligned or `mode` is plain.
///
/// `misalignment` is the address of the location modulo `width`.
#[inline]
pub(crate) fn check_alignment(
    mode: AccessMode,
    index: usize,
    misalignment: usize,
    width: usize,
) -> Result<bool> {
    let aligned = misalignment == 0;
    if !aligned && !mode.is_plain() {
        return Err(AccessError::Misalignment {
            mode,
            index: index as i64,
            width,
        });
    }
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_indices_outside_length_fail() {
        for index in [-1, i32::MIN, 10, 11, i32::MAX] {
            assert_eq!(
                check_index(index, 10),
                Err(AccessError::IndexOutOfBounds {
                    index: index as i64,
                    length: 10
                })
            );
        }
        assert_eq!(check_index(9, 10), Ok(9));
        assert!(check_index(0, 0).is_err());
    }

    #[test]
    fn view_indices_leave_room_for_the_element() {
        assert_eq!(check_view_index(8, 16, 8), Ok(8));
        assert!(check_view_index(9, 16, 8).is_err());
        assert!(check_view_index(16, 16, 8).is_err());
        assert!(check_view_index(-1, 16, 8).is_err());
        assert!(check_view_index(0, 4, 8).is_err(), "view narrower than element");
    }

    #[test]
    fn only_plain_modes_tolerate_misalignment() {
        assert_eq!(check_alignment(AccessMode::Get, 3, 3, 4), Ok(false));
        assert_eq!(check_alignment(AccessMode::Set, 3, 3, 4), Ok(false));
        assert_eq!(check_alignment(AccessMode::GetVolatile, 4, 0, 4), Ok(true));
        assert_eq!(
            check_alignment(AccessMode::GetOpaque, 3, 3, 4),
            Err(AccessError::Misalignment {
                mode: AccessMode::GetOpaque,
                index: 3,
                width: 4
            })
        );
    }
}
