//! Static types seen by the call-site checker.
//!
//! PrimitiveType: the variable types a handle can expose
//!
//! RefType: container/receiver types used in coordinate positions
//!
//! Type: either of the two, or `Void` for modes that return nothing
use std::{fmt, sync::Arc};

use crate::Class;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefType {
    /// top type, accepts every reference
    Object,
    Instance(Arc<Class>),
    Array(PrimitiveType),
    ByteBuffer,
    /// the type of class mirrors (`Foo.class` values)
    ClassMirror,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Reference(RefType),
}

/// Signature of one access mode: `(params...) -> ret`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodType {
    pub params: Vec<Type>,
    pub ret: Type,
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// Storage width in bytes.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            PrimitiveType::Boolean | PrimitiveType::Byte => 1,
            PrimitiveType::Short | PrimitiveType::Char => 2,
            PrimitiveType::Int | PrimitiveType::Float => 4,
            PrimitiveType::Long | PrimitiveType::Double => 8,
        }
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean)
    }

    #[inline]
    pub const fn is_floating(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    /// Identity or primitive widening conversion from `self` to `to`.
    pub const fn widens_to(self, to: PrimitiveType) -> bool {
        use PrimitiveType::*;
        match (self, to) {
            (Boolean, Boolean) => true,
            (Boolean, _) | (_, Boolean) => false,
            (Byte, Byte | Short | Int | Long | Float | Double) => true,
            (Short, Short | Int | Long | Float | Double) => true,
            (Char, Char | Int | Long | Float | Double) => true,
            (Int, Int | Long | Float | Double) => true,
            (Long, Long | Float | Double) => true,
            (Float, Float | Double) => true,
            (Double, Double) => true,
            _ => false,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }
}

impl RefType {
    /// Class name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            RefType::Object => "Object".to_string(),
            RefType::Instance(class) => class.name().to_string(),
            RefType::Array(element) => format!("{}[]", element.name()),
            RefType::ByteBuffer => "ByteBuffer".to_string(),
            RefType::ClassMirror => "Class".to_string(),
        }
    }
}

impl Type {
    pub const BOOLEAN: Type = Type::Primitive(PrimitiveType::Boolean);
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const OBJECT: Type = Type::Reference(RefType::Object);

    #[inline]
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether a result of type `self` can be delivered to a call site
    /// expecting `requested`.
    pub fn returns_as(&self, requested: &Type) -> bool {
        match (self, requested) {
            (_, Type::Void) => true,
            (Type::Void, _) => false,
            (Type::Primitive(have), Type::Primitive(want)) => have.widens_to(*want),
            (Type::Primitive(_), Type::Reference(RefType::Object)) => true,
            (Type::Primitive(_), Type::Reference(_)) => false,
            (Type::Reference(have), Type::Reference(want)) => {
                matches!(want, RefType::Object) || have == want
            }
            (Type::Reference(_), Type::Primitive(_)) => false,
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Primitive(value)
    }
}

impl From<RefType> for Type {
    fn from(value: RefType) -> Self {
        Type::Reference(value)
    }
}

impl MethodType {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self { params, ret }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl ByteOrder {
    #[cfg(target_endian = "little")]
    pub const NATIVE: ByteOrder = ByteOrder::LittleEndian;
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::BigEndian;

    #[inline]
    pub const fn is_native(self) -> bool {
        self as u8 == Self::NATIVE as u8
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Primitive(p) => p.fmt(f),
            Type::Reference(r) => r.fmt(f),
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, "){}", self.ret)
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::BigEndian => f.write_str("BIG_ENDIAN"),
            ByteOrder::LittleEndian => f.write_str("LITTLE_ENDIAN"),
        }
    }
}
