use std::{fmt, str::FromStr, sync::atomic::Ordering};

use bitflags::bitflags;

/// Every way a location can be accessed through a handle.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Get,
    Set,
    GetVolatile,
    SetVolatile,
    GetAcquire,
    SetRelease,
    GetOpaque,
    SetOpaque,
    CompareAndSet,
    CompareAndExchange,
    CompareAndExchangeAcquire,
    CompareAndExchangeRelease,
    WeakCompareAndSet,
    WeakCompareAndSetAcquire,
    WeakCompareAndSetRelease,
    WeakCompareAndSetVolatile,
    GetAndSet,
    GetAndAdd,
    AddAndGet,
}

/// Shape of the call signature of a mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// `(coords) -> T`
    Get,
    /// `(coords, T) -> void`
    Set,
    /// `(coords, T, T) -> boolean`
    CompareAndSet,
    /// `(coords, T, T) -> T`
    CompareAndExchange,
    /// `(coords, T) -> T`
    GetAndUpdate,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct AccessModes: u32 {
        const GET = 1 << 0;
        const SET = 1 << 1;
        const GET_VOLATILE = 1 << 2;
        const SET_VOLATILE = 1 << 3;
        const GET_ACQUIRE = 1 << 4;
        const SET_RELEASE = 1 << 5;
        const GET_OPAQUE = 1 << 6;
        const SET_OPAQUE = 1 << 7;
        const COMPARE_AND_SET = 1 << 8;
        const COMPARE_AND_EXCHANGE = 1 << 9;
        const COMPARE_AND_EXCHANGE_ACQUIRE = 1 << 10;
        const COMPARE_AND_EXCHANGE_RELEASE = 1 << 11;
        const WEAK_COMPARE_AND_SET = 1 << 12;
        const WEAK_COMPARE_AND_SET_ACQUIRE = 1 << 13;
        const WEAK_COMPARE_AND_SET_RELEASE = 1 << 14;
        const WEAK_COMPARE_AND_SET_VOLATILE = 1 << 15;
        const GET_AND_SET = 1 << 16;
        const GET_AND_ADD = 1 << 17;
        const ADD_AND_GET = 1 << 18;

        const READS = Self::GET.bits()
            | Self::GET_VOLATILE.bits()
            | Self::GET_ACQUIRE.bits()
            | Self::GET_OPAQUE.bits();
        const WRITES = Self::SET.bits()
            | Self::SET_VOLATILE.bits()
            | Self::SET_RELEASE.bits()
            | Self::SET_OPAQUE.bits();
        const COMPARE_AND_SWAPS = Self::COMPARE_AND_SET.bits()
            | Self::COMPARE_AND_EXCHANGE.bits()
            | Self::COMPARE_AND_EXCHANGE_ACQUIRE.bits()
            | Self::COMPARE_AND_EXCHANGE_RELEASE.bits()
            | Self::WEAK_COMPARE_AND_SET.bits()
            | Self::WEAK_COMPARE_AND_SET_ACQUIRE.bits()
            | Self::WEAK_COMPARE_AND_SET_RELEASE.bits()
            | Self::WEAK_COMPARE_AND_SET_VOLATILE.bits();
        const NUMERIC_UPDATES = Self::GET_AND_ADD.bits() | Self::ADD_AND_GET.bits();
        const UPDATES = Self::GET_AND_SET.bits() | Self::NUMERIC_UPDATES.bits();
    }
}

impl AccessMode {
    pub const ALL: [AccessMode; 19] = [
        AccessMode::Get,
        AccessMode::Set,
        AccessMode::GetVolatile,
        AccessMode::SetVolatile,
        AccessMode::GetAcquire,
        AccessMode::SetRelease,
        AccessMode::GetOpaque,
        AccessMode::SetOpaque,
        AccessMode::CompareAndSet,
        AccessMode::CompareAndExchange,
        AccessMode::CompareAndExchangeAcquire,
        AccessMode::CompareAndExchangeRelease,
        AccessMode::WeakCompareAndSet,
        AccessMode::WeakCompareAndSetAcquire,
        AccessMode::WeakCompareAndSetRelease,
        AccessMode::WeakCompareAndSetVolatile,
        AccessMode::GetAndSet,
        AccessMode::GetAndAdd,
        AccessMode::AddAndGet,
    ];

    #[inline]
    pub const fn bit(self) -> AccessModes {
        AccessModes::from_bits_retain(1 << self as u32)
    }

    pub const fn access_type(self) -> AccessType {
        use AccessMode::*;
        match self {
            Get | GetVolatile | GetAcquire | GetOpaque => AccessType::Get,
            Set | SetVolatile | SetRelease | SetOpaque => AccessType::Set,
            CompareAndSet
            | WeakCompareAndSet
            | WeakCompareAndSetAcquire
            | WeakCompareAndSetRelease
            | WeakCompareAndSetVolatile => AccessType::CompareAndSet,
            CompareAndExchange | CompareAndExchangeAcquire | CompareAndExchangeRelease => {
                AccessType::CompareAndExchange
            }
            GetAndSet | GetAndAdd | AddAndGet => AccessType::GetAndUpdate,
        }
    }

    /// Anything except the GET family may modify the location.
    #[inline]
    pub const fn is_write(self) -> bool {
        !matches!(self.access_type(), AccessType::Get)
    }

    /// Plain `GET`/`SET`, the only modes defined on misaligned offsets.
    #[inline]
    pub const fn is_plain(self) -> bool {
        matches!(self, AccessMode::Get | AccessMode::Set)
    }

    #[inline]
    pub const fn is_weak(self) -> bool {
        matches!(
            self,
            AccessMode::WeakCompareAndSet
                | AccessMode::WeakCompareAndSetAcquire
                | AccessMode::WeakCompareAndSetRelease
                | AccessMode::WeakCompareAndSetVolatile
        )
    }

    #[inline]
    pub const fn is_numeric_update(self) -> bool {
        matches!(self, AccessMode::GetAndAdd | AccessMode::AddAndGet)
    }

    /// Ordering of loads, stores and read-modify-write updates.
    pub const fn ordering(self) -> Ordering {
        use AccessMode::*;
        match self {
            Get | Set | GetOpaque | SetOpaque | WeakCompareAndSet => Ordering::Relaxed,
            GetAcquire | CompareAndExchangeAcquire | WeakCompareAndSetAcquire => Ordering::Acquire,
            SetRelease | CompareAndExchangeRelease | WeakCompareAndSetRelease => Ordering::Release,
            GetVolatile
            | SetVolatile
            | CompareAndSet
            | CompareAndExchange
            | WeakCompareAndSetVolatile
            | GetAndSet
            | GetAndAdd
            | AddAndGet => Ordering::SeqCst,
        }
    }

    /// `(success, failure)` orderings of the compare-and-swap family.
    pub const fn cas_orderings(self) -> (Ordering, Ordering) {
        match self.ordering() {
            // a failed exchange performs no store, so release degrades to relaxed
            Ordering::Release => (Ordering::Release, Ordering::Relaxed),
            other => (other, other),
        }
    }

    pub const fn method_name(self) -> &'static str {
        use AccessMode::*;
        match self {
            Get => "get",
            Set => "set",
            GetVolatile => "getVolatile",
            SetVolatile => "setVolatile",
            GetAcquire => "getAcquire",
            SetRelease => "setRelease",
            GetOpaque => "getOpaque",
            SetOpaque => "setOpaque",
            CompareAndSet => "compareAndSet",
            CompareAndExchange => "compareAndExchange",
            CompareAndExchangeAcquire => "compareAndExchangeAcquire",
            CompareAndExchangeRelease => "compareAndExchangeRelease",
            WeakCompareAndSet => "weakCompareAndSet",
            WeakCompareAndSetAcquire => "weakCompareAndSetAcquire",
            WeakCompareAndSetRelease => "weakCompareAndSetRelease",
            WeakCompareAndSetVolatile => "weakCompareAndSetVolatile",
            GetAndSet => "getAndSet",
            GetAndAdd => "getAndAdd",
            AddAndGet => "addAndGet",
        }
    }

    pub fn from_method_name(name: &str) -> Option<AccessMode> {
        Self::ALL.into_iter().find(|mode| mode.method_name() == name)
    }
}

impl AccessModes {
    #[inline]
    pub const fn supports(self, mode: AccessMode) -> bool {
        self.contains(mode.bit())
    }

    pub fn modes(self) -> impl Iterator<Item = AccessMode> {
        AccessMode::ALL.into_iter().filter(move |mode| self.supports(*mode))
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAccessMode(pub String);

impl fmt::Display for UnknownAccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown access mode `{}`", self.0)
    }
}

impl std::error::Error for UnknownAccessMode {}

impl FromStr for AccessMode {
    type Err = UnknownAccessMode;

    /// Accepts method names (`getVolatile`) and constant names (`GET_VOLATILE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(mode) = Self::from_method_name(s) {
            return Ok(mode);
        }
        let folded: String = s.chars().filter(|c| *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|mode| mode.method_name().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| UnknownAccessMode(s.to_string()))
    }
}
