use std::marker::PhantomData;

use crate::{AccessError, AccessMode, PrimitiveType, Result, Type, Value, VarHandle};

mod sealed {
    pub trait Sealed {}
}

/// Rust types that stand for a primitive variable type.
pub trait Primitive: sealed::Sealed + Copy + Into<Value> + Send + Sync + 'static {
    const TYPE: PrimitiveType;

    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! primitive {
    ($($ty:ty => $prim:ident / $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Primitive for $ty {
                const TYPE: PrimitiveType = PrimitiveType::$prim;

                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

primitive! {
    bool => Boolean / Boolean,
    i8 => Byte / Byte,
    i16 => Short / Short,
    u16 => Char / Char,
    i32 => Int / Int,
    i64 => Long / Long,
    f32 => Float / Float,
    f64 => Double / Double,
}

/// A `VarHandle` whose variable type is fixed to `T` at compile time.
///
/// Coordinates stay dynamic, operands and results are `T`.
pub struct TypedVarHandle<T: Primitive> {
    handle: VarHandle,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Primitive> Clone for TypedVarHandle<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Primitive> std::fmt::Debug for TypedVarHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypedVarHandle").field(&self.handle).finish()
    }
}

impl VarHandle {
    /// View this handle with `T` as its static variable type.
    pub fn typed<T: Primitive>(&self) -> Result<TypedVarHandle<T>> {
        if self.variable_type() != T::TYPE {
            return Err(AccessError::WrongMethodType {
                mode: AccessMode::Get,
                expected: self.access_mode_type(AccessMode::Get),
                reason: format!("variable type is {}, not {}", self.variable_type(), T::TYPE),
            });
        }
        Ok(TypedVarHandle {
            handle: self.clone(),
            _marker: PhantomData,
        })
    }
}

macro_rules! typed_reads {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&self, coords: &[Value]) -> Result<T> {
                self.read(AccessMode::$mode, coords)
            }
        )*
    };
}

macro_rules! typed_writes {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&self, coords: &[Value], value: T) -> Result<()> {
                self.write(AccessMode::$mode, coords, value)
            }
        )*
    };
}

macro_rules! typed_cas {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&self, coords: &[Value], expected: T, new: T) -> Result<bool> {
                self.compare(AccessMode::$mode, coords, expected, new)
            }
        )*
    };
}

macro_rules! typed_exchanges {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&self, coords: &[Value], expected: T, new: T) -> Result<T> {
                self.exchange(AccessMode::$mode, coords, expected, new)
            }
        )*
    };
}

macro_rules! typed_updates {
    ($($name:ident => $mode:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&self, coords: &[Value], value: T) -> Result<T> {
                self.update(AccessMode::$mode, coords, value)
            }
        )*
    };
}

impl<T: Primitive> TypedVarHandle<T> {
    #[inline]
    pub fn untyped(&self) -> &VarHandle {
        &self.handle
    }

    fn call(&self, mode: AccessMode, coords: &[Value], operands: &[T]) -> Result<Value> {
        let mut args = Vec::with_capacity(coords.len() + operands.len());
        args.extend_from_slice(coords);
        args.extend(operands.iter().map(|v| (*v).into()));
        self.handle.access(mode, &args)
    }

    fn unwrap_result(&self, mode: AccessMode, value: Value) -> Result<T> {
        T::from_value(&value).ok_or_else(|| AccessError::WrongMethodType {
            mode,
            expected: self.handle.access_mode_type(mode),
            reason: format!("result {} is not {}", value.type_name(), T::TYPE),
        })
    }

    pub fn read(&self, mode: AccessMode, coords: &[Value]) -> Result<T> {
        let value = self.call(mode, coords, &[])?;
        self.unwrap_result(mode, value)
    }

    pub fn write(&self, mode: AccessMode, coords: &[Value], value: T) -> Result<()> {
        self.call(mode, coords, &[value]).map(|_| ())
    }

    pub fn compare(&self, mode: AccessMode, coords: &[Value], expected: T, new: T) -> Result<bool> {
        let value = self.call(mode, coords, &[expected, new])?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub fn exchange(&self, mode: AccessMode, coords: &[Value], expected: T, new: T) -> Result<T> {
        let value = self.call(mode, coords, &[expected, new])?;
        self.unwrap_result(mode, value)
    }

    pub fn update(&self, mode: AccessMode, coords: &[Value], value: T) -> Result<T> {
        let value = self.call(mode, coords, &[value])?;
        self.unwrap_result(mode, value)
    }

    pub fn access_mode_type(&self, mode: AccessMode) -> crate::MethodType {
        self.handle.access_mode_type(mode)
    }

    #[inline]
    pub fn variable_type(&self) -> Type {
        Type::Primitive(T::TYPE)
    }

    typed_reads! {
        get => Get,
        get_volatile => GetVolatile,
        get_acquire => GetAcquire,
        get_opaque => GetOpaque,
    }

    typed_writes! {
        set => Set,
        set_volatile => SetVolatile,
        set_release => SetRelease,
        set_opaque => SetOpaque,
    }

    typed_cas! {
        compare_and_set => CompareAndSet,
        weak_compare_and_set => WeakCompareAndSet,
        weak_compare_and_set_acquire => WeakCompareAndSetAcquire,
        weak_compare_and_set_release => WeakCompareAndSetRelease,
        weak_compare_and_set_volatile => WeakCompareAndSetVolatile,
    }

    typed_exchanges! {
        compare_and_exchange => CompareAndExchange,
        compare_and_exchange_acquire => CompareAndExchangeAcquire,
        compare_and_exchange_release => CompareAndExchangeRelease,
    }

    typed_updates! {
        get_and_set => GetAndSet,
        get_and_add => GetAndAdd,
        add_and_get => AddAndGet,
    }
}
