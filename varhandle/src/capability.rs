use crate::{AccessMode, AccessModes, PrimitiveType};

/// The storage-location family a handle addresses.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HandleKind {
    InstanceField,
    FinalInstanceField,
    StaticField,
    FinalStaticField,
    ArrayElement,
    BufferView,
}

impl HandleKind {
    #[inline]
    pub const fn is_final(self) -> bool {
        matches!(self, HandleKind::FinalInstanceField | HandleKind::FinalStaticField)
    }
}

/// Modes a handle of `kind` exposes, before looking at the variable type.
pub const fn capabilities(kind: HandleKind) -> AccessModes {
    match kind {
        HandleKind::FinalInstanceField | HandleKind::FinalStaticField => AccessModes::READS,
        HandleKind::InstanceField
        | HandleKind::StaticField
        | HandleKind::ArrayElement
        | HandleKind::BufferView => AccessModes::all(),
    }
}

/// Modes left over when the buffer behind a view is read-only.
pub const READ_ONLY_VIEW: AccessModes = AccessModes::READS;

/// Capability row of a handle of `kind` over `var_type`.
pub const fn supported_modes(kind: HandleKind, var_type: PrimitiveType) -> AccessModes {
    let row = capabilities(kind);
    if var_type.is_numeric() {
        row
    } else {
        row.difference(AccessModes::NUMERIC_UPDATES)
    }
}

#[inline]
pub const fn is_supported(kind: HandleKind, var_type: PrimitiveType, mode: AccessMode) -> bool {
    supported_modes(kind, var_type).supports(mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_fields_only_read() {
        for kind in [HandleKind::FinalInstanceField, HandleKind::FinalStaticField] {
            for mode in AccessMode::ALL {
                assert_eq!(
                    is_supported(kind, PrimitiveType::Long, mode),
                    !mode.is_write(),
                    "{kind:?} {mode}"
                );
            }
        }
    }

    #[test]
    fn mutable_kinds_support_everything_numeric() {
        for kind in [
            HandleKind::InstanceField,
            HandleKind::StaticField,
            HandleKind::ArrayElement,
            HandleKind::BufferView,
        ] {
            assert_eq!(supported_modes(kind, PrimitiveType::Double), AccessModes::all());
        }
    }

    #[test]
    fn boolean_has_no_numeric_add() {
        let row = supported_modes(HandleKind::ArrayElement, PrimitiveType::Boolean);
        assert!(!row.supports(AccessMode::GetAndAdd));
        assert!(!row.supports(AccessMode::AddAndGet));
        assert!(row.supports(AccessMode::GetAndSet));
        assert!(row.supports(AccessMode::WeakCompareAndSetRelease));
    }

    #[test]
    fn read_only_views_keep_the_get_family() {
        assert_eq!(READ_ONLY_VIEW.modes().count(), 4);
        assert!(READ_ONLY_VIEW.modes().all(|mode| !mode.is_write()));
    }
}
