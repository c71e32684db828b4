//! Value: a dynamically typed argument or result of an access
//!
//! ObjectRef: reference to a container (instance, array, buffer) or a class mirror
//!
//! Primitive values are stored as raw bit patterns of their natural width,
//! `to_bits`/`from_bits` convert between the two.
use std::sync::Arc;

use crate::{Array, ByteBuffer, Class, Instance, PrimitiveType, RefType, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// result of modes that return nothing
    Void,
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Ref(ObjectRef),
}

#[derive(Debug, Clone)]
pub enum ObjectRef {
    Instance(Arc<Instance>),
    Array(Arc<Array>),
    Buffer(ByteBuffer),
    Class(Arc<Class>),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Value::Boolean(_) => PrimitiveType::Boolean,
            Value::Byte(_) => PrimitiveType::Byte,
            Value::Short(_) => PrimitiveType::Short,
            Value::Char(_) => PrimitiveType::Char,
            Value::Int(_) => PrimitiveType::Int,
            Value::Long(_) => PrimitiveType::Long,
            Value::Float(_) => PrimitiveType::Float,
            Value::Double(_) => PrimitiveType::Double,
            Value::Void | Value::Null | Value::Ref(_) => return None,
        })
    }

    /// Name of the value's type for diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Void => "void".to_string(),
            Value::Null => "null".to_string(),
            Value::Ref(obj) => obj.ref_type().name(),
            other => other
                .primitive_type()
                .map(|p| p.name().to_string())
                .unwrap_or_default(),
        }
    }

    /// Identity or widening conversion to `to`, `None` if not permitted.
    pub fn widen(&self, to: PrimitiveType) -> Option<Value> {
        let from = self.primitive_type()?;
        if !from.widens_to(to) {
            return None;
        }
        if from == to {
            return Some(self.clone());
        }
        // integral sources as i64, then narrowed to the target
        let integral = match *self {
            Value::Byte(v) => v as i64,
            Value::Short(v) => v as i64,
            Value::Char(v) => v as i64,
            Value::Int(v) => v as i64,
            Value::Long(v) => v,
            Value::Float(v) => return Some(Value::Double(v as f64)),
            _ => return None,
        };
        Some(match to {
            PrimitiveType::Short => Value::Short(integral as i16),
            PrimitiveType::Int => Value::Int(integral as i32),
            PrimitiveType::Long => Value::Long(integral),
            PrimitiveType::Float => Value::Float(integral as f32),
            PrimitiveType::Double => Value::Double(integral as f64),
            _ => return None,
        })
    }

    /// Raw bit pattern, zero extended from the natural width.
    pub fn to_bits(&self) -> Option<u64> {
        Some(match *self {
            Value::Boolean(v) => v as u64,
            Value::Byte(v) => v as u8 as u64,
            Value::Short(v) => v as u16 as u64,
            Value::Char(v) => v as u64,
            Value::Int(v) => v as u32 as u64,
            Value::Long(v) => v as u64,
            Value::Float(v) => v.to_bits() as u64,
            Value::Double(v) => v.to_bits(),
            Value::Void | Value::Null | Value::Ref(_) => return None,
        })
    }

    /// Inverse of `to_bits`, bits above the width of `ty` are ignored.
    pub fn from_bits(ty: PrimitiveType, bits: u64) -> Value {
        match ty {
            PrimitiveType::Boolean => Value::Boolean(bits & 0xFF != 0),
            PrimitiveType::Byte => Value::Byte(bits as u8 as i8),
            PrimitiveType::Short => Value::Short(bits as u16 as i16),
            PrimitiveType::Char => Value::Char(bits as u16),
            PrimitiveType::Int => Value::Int(bits as u32 as i32),
            PrimitiveType::Long => Value::Long(bits as i64),
            PrimitiveType::Float => Value::Float(f32::from_bits(bits as u32)),
            PrimitiveType::Double => Value::Double(f64::from_bits(bits)),
        }
    }

    /// Zero value of `ty`.
    pub fn zero(ty: PrimitiveType) -> Value {
        Value::from_bits(ty, 0)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Ref(obj) => Some(obj),
            _ => None,
        }
    }
}

impl ObjectRef {
    /// Dynamic type of the referenced object.
    pub fn ref_type(&self) -> RefType {
        match self {
            ObjectRef::Instance(instance) => RefType::Instance(instance.class().clone()),
            ObjectRef::Array(array) => RefType::Array(array.element()),
            ObjectRef::Buffer(_) => RefType::ByteBuffer,
            ObjectRef::Class(_) => RefType::ClassMirror,
        }
    }

    /// Whether this object may be used where `target` is declared.
    pub fn is_instance_of(&self, target: &RefType) -> bool {
        match (target, self) {
            (RefType::Object, _) => true,
            (RefType::Instance(class), ObjectRef::Instance(instance)) => {
                instance.class().is_subclass_of(class)
            }
            (RefType::Array(element), ObjectRef::Array(array)) => array.element() == *element,
            (RefType::ByteBuffer, ObjectRef::Buffer(_)) => true,
            (RefType::ClassMirror, ObjectRef::Class(_)) => true,
            _ => false,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ObjectRef::Instance(a), ObjectRef::Instance(b)) => Arc::ptr_eq(a, b),
            (ObjectRef::Array(a), ObjectRef::Array(b)) => Arc::ptr_eq(a, b),
            (ObjectRef::Buffer(a), ObjectRef::Buffer(b)) => a.same_view(b),
            (ObjectRef::Class(a), ObjectRef::Class(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&Value> for Type {
    fn from(value: &Value) -> Self {
        match value {
            Value::Void => Type::Void,
            Value::Null => Type::OBJECT,
            Value::Ref(obj) => Type::Reference(obj.ref_type()),
            other => other
                .primitive_type()
                .map(Type::Primitive)
                .unwrap_or(Type::Void),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    u16 => Char,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    ObjectRef => Ref,
}

impl From<Arc<Instance>> for Value {
    fn from(value: Arc<Instance>) -> Self {
        Value::Ref(ObjectRef::Instance(value))
    }
}

impl From<&Arc<Instance>> for Value {
    fn from(value: &Arc<Instance>) -> Self {
        Value::Ref(ObjectRef::Instance(value.clone()))
    }
}

impl From<Arc<Array>> for Value {
    fn from(value: Arc<Array>) -> Self {
        Value::Ref(ObjectRef::Array(value))
    }
}

impl From<&Arc<Array>> for Value {
    fn from(value: &Arc<Array>) -> Self {
        Value::Ref(ObjectRef::Array(value.clone()))
    }
}

impl From<ByteBuffer> for Value {
    fn from(value: ByteBuffer) -> Self {
        Value::Ref(ObjectRef::Buffer(value))
    }
}

impl From<&ByteBuffer> for Value {
    fn from(value: &ByteBuffer) -> Self {
        Value::Ref(ObjectRef::Buffer(value.clone()))
    }
}

impl From<Arc<Class>> for Value {
    fn from(value: Arc<Class>) -> Self {
        Value::Ref(ObjectRef::Class(value))
    }
}

impl From<&Arc<Class>> for Value {
    fn from(value: &Arc<Class>) -> Self {
        Value::Ref(ObjectRef::Class(value.clone()))
    }
}
