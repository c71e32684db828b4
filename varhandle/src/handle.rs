//! `VarHandle`: a typed, immutable reference to a family of variables.
//!
//! Every access runs the same pipeline: the call-site type contract, the
//! capability row, then coordinate resolution (read-only, bounds and
//! alignment) and finally the memory operation of the mode.
use std::{fmt, sync::Arc};

use crate::{
    AccessError, AccessMode, AccessModes, AccessType, ByteOrder, HandleKind, MethodType,
    PrimitiveType, Result, Type, Value, capability, dispatch,
    location::{self, Target},
    signature,
};

struct HandleInner {
    kind: HandleKind,
    var_type: PrimitiveType,
    coordinates: Vec<Type>,
    target: Target,
    modes: AccessModes,
    // indexed by `AccessType as usize`
    signatures: [MethodType; 5],
}

#[derive(Clone)]
pub struct VarHandle {
    inner: Arc<HandleInner>,
}

/// A `VarHandle` bound to one access mode.
#[derive(Clone, Debug)]
pub struct ModeInvoker {
    handle: VarHandle,
    mode: AccessMode,
}

const ACCESS_TYPES: [AccessType; 5] = [
    AccessType::Get,
    AccessType::Set,
    AccessType::CompareAndSet,
    AccessType::CompareAndExchange,
    AccessType::GetAndUpdate,
];

fn with_operands(coords: &[Value], operands: &[Value]) -> Vec<Value> {
    let mut args = Vec::with_capacity(coords.len() + operands.len());
    args.extend_from_slice(coords);
    args.extend_from_slice(operands);
    args
}

macro_rules! read_modes {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            pub fn $name(&self, coords: &[Value]) -> Result<Value> {
                self.access(AccessMode::$mode, coords)
            }
        )*
    };
}

macro_rules! write_modes {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            pub fn $name(&self, coords: &[Value], value: impl Into<Value>) -> Result<()> {
                self.access(AccessMode::$mode, &with_operands(coords, &[value.into()]))
                    .map(|_| ())
            }
        )*
    };
}

macro_rules! compare_modes {
    ($ret:ty, $convert:expr; $($name:ident => $mode:ident),* $(,)?) => {
        $(
            pub fn $name(
                &self,
                coords: &[Value],
                expected: impl Into<Value>,
                new: impl Into<Value>,
            ) -> Result<$ret> {
                let args = with_operands(coords, &[expected.into(), new.into()]);
                self.access(AccessMode::$mode, &args).map($convert)
            }
        )*
    };
}

macro_rules! update_modes {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            pub fn $name(&self, coords: &[Value], value: impl Into<Value>) -> Result<Value> {
                self.access(AccessMode::$mode, &with_operands(coords, &[value.into()]))
            }
        )*
    };
}

impl VarHandle {
    pub(crate) fn new(
        kind: HandleKind,
        var_type: PrimitiveType,
        coordinates: Vec<Type>,
        target: Target,
    ) -> Self {
        let signatures =
            ACCESS_TYPES.map(|access| signature::access_mode_type(var_type, &coordinates, access));
        Self {
            inner: Arc::new(HandleInner {
                kind,
                var_type,
                modes: capability::supported_modes(kind, var_type),
                coordinates,
                target,
                signatures,
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> HandleKind {
        self.inner.kind
    }

    #[inline]
    pub fn variable_type(&self) -> PrimitiveType {
        self.inner.var_type
    }

    #[inline]
    pub fn coordinate_types(&self) -> &[Type] {
        &self.inner.coordinates
    }

    /// Byte order of buffer views, `None` for every other kind.
    #[inline]
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.inner.target.byte_order()
    }

    #[inline]
    pub fn supported_modes(&self) -> AccessModes {
        self.inner.modes
    }

    #[inline]
    pub fn is_supported(&self, mode: AccessMode) -> bool {
        self.inner.modes.supports(mode)
    }

    #[inline]
    fn signature(&self, mode: AccessMode) -> &MethodType {
        &self.inner.signatures[mode.access_type() as usize]
    }

    /// Signature expected by `mode`, coordinates first.
    pub fn access_mode_type(&self, mode: AccessMode) -> MethodType {
        self.signature(mode).clone()
    }

    /// Perform `mode` with `args` (coordinates followed by operands).
    pub fn access(&self, mode: AccessMode, args: &[Value]) -> Result<Value> {
        self.invoke(mode, args, None)
    }

    /// Like [`access`](Self::access), additionally checking that the
    /// result can be returned as `requested`.
    pub fn access_as(&self, mode: AccessMode, args: &[Value], requested: &Type) -> Result<Value> {
        self.invoke(mode, args, Some(requested))
    }

    fn invoke(&self, mode: AccessMode, args: &[Value], requested: Option<&Type>) -> Result<Value> {
        self.try_invoke(mode, args, requested).inspect_err(|err| {
            log::trace!(
                "{mode} on {:?} handle of {} failed: {err}",
                self.kind(),
                self.variable_type()
            );
        })
    }

    fn try_invoke(
        &self,
        mode: AccessMode,
        args: &[Value],
        requested: Option<&Type>,
    ) -> Result<Value> {
        let inner = &*self.inner;
        let coordinates = inner.coordinates.len();
        let expected = self.signature(mode);
        let operands =
            signature::check(mode, inner.var_type, expected, coordinates, args, requested)?;
        if !self.is_supported(mode) {
            return Err(AccessError::UnsupportedOperation {
                mode,
                kind: inner.kind,
                var_type: inner.var_type,
            });
        }
        let location = location::locate(&inner.target, mode, inner.var_type, &args[..coordinates])?;
        let result = dispatch::execute(mode, inner.var_type, &location, operands);
        Ok(signature::convert_result(result, requested))
    }

    pub fn to_method_handle(&self, mode: AccessMode) -> ModeInvoker {
        ModeInvoker {
            handle: self.clone(),
            mode,
        }
    }

    read_modes! {
        get => Get,
        get_volatile => GetVolatile,
        get_acquire => GetAcquire,
        get_opaque => GetOpaque,
    }

    write_modes! {
        set => Set,
        set_volatile => SetVolatile,
        set_release => SetRelease,
        set_opaque => SetOpaque,
    }

    compare_modes! {
        bool, |v: Value| v.as_bool().unwrap_or(false);
        compare_and_set => CompareAndSet,
        weak_compare_and_set => WeakCompareAndSet,
        weak_compare_and_set_acquire => WeakCompareAndSetAcquire,
        weak_compare_and_set_release => WeakCompareAndSetRelease,
        weak_compare_and_set_volatile => WeakCompareAndSetVolatile,
    }

    compare_modes! {
        Value, |v: Value| v;
        compare_and_exchange => CompareAndExchange,
        compare_and_exchange_acquire => CompareAndExchangeAcquire,
        compare_and_exchange_release => CompareAndExchangeRelease,
    }

    update_modes! {
        get_and_set => GetAndSet,
        get_and_add => GetAndAdd,
        add_and_get => AddAndGet,
    }
}

impl fmt::Debug for VarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("VarHandle");
        let coordinates = MethodType::new(self.inner.coordinates.clone(), Type::Void);
        s.field("kind", &self.inner.kind)
            .field("variable_type", &self.inner.var_type)
            .field("coordinates", &coordinates.to_string());
        if let Some(order) = self.byte_order() {
            s.field("byte_order", &order);
        }
        s.finish()
    }
}

impl ModeInvoker {
    #[inline]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    #[inline]
    pub fn var_handle(&self) -> &VarHandle {
        &self.handle
    }

    pub fn method_type(&self) -> MethodType {
        self.handle.access_mode_type(self.mode)
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        self.handle.access(self.mode, args)
    }

    pub fn invoke_as(&self, args: &[Value], requested: &Type) -> Result<Value> {
        self.handle.access_as(self.mode, args, requested)
    }
}
