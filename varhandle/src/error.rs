//! Faults raised by handle resolution and by accesses.
//!
//! Access faults are detected synchronously and returned to the caller,
//! nothing is retried or recovered internally.
use thiserror::Error;

use crate::{AccessMode, HandleKind, MethodType, PrimitiveType};

pub type Result<T> = std::result::Result<T, AccessError>;

/// Faults of a single access through a `VarHandle`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    /// A required container or primitive operand was `null`.
    #[error("null reference in argument {position}")]
    NullReference { position: usize },

    /// A reference argument is not an instance of the declared type.
    #[error("cannot cast {actual} to {expected} (argument {position})")]
    ClassCast {
        position: usize,
        expected: String,
        actual: String,
    },

    /// Arity, primitive conversion or return type does not fit the mode.
    #[error("wrong method type for {mode}: expected {expected}, {reason}")]
    WrongMethodType {
        mode: AccessMode,
        expected: MethodType,
        reason: String,
    },

    #[error("access mode {mode} is not supported by {kind:?} handles of {var_type}")]
    UnsupportedOperation {
        mode: AccessMode,
        kind: HandleKind,
        var_type: PrimitiveType,
    },

    #[error("{mode} on a read-only buffer")]
    ReadOnlyBuffer { mode: AccessMode },

    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("misaligned {mode} of {width} bytes at index {index}")]
    Misalignment {
        mode: AccessMode,
        index: i64,
        width: usize,
    },
}

/// Faults while declaring classes or resolving handles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("no such class: {0}")]
    NoSuchClass(String),

    #[error("class {0} is already defined")]
    DuplicateClass(String),

    #[error("no such field: {class}.{name}")]
    NoSuchField { class: String, name: String },

    #[error("field {class}.{name} is declared twice")]
    DuplicateField { class: String, name: String },

    #[error("field {class}.{name} is {actual}, not {requested}")]
    FieldTypeMismatch {
        class: String,
        name: String,
        requested: PrimitiveType,
        actual: PrimitiveType,
    },

    /// A static field was looked up as an instance field or vice versa.
    #[error("lookup of {found} field {class}.{name} as {requested} field")]
    FieldKindMismatch {
        class: String,
        name: String,
        requested: &'static str,
        found: &'static str,
    },

    #[error("initializer of {class}.{name} does not convert to {ty}")]
    InitializerMismatch {
        class: String,
        name: String,
        ty: PrimitiveType,
    },

    #[error("byte views of {0} are not supported")]
    UnsupportedViewType(PrimitiveType),
}

impl AccessError {
    /// Short name of the fault category.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AccessError::NullReference { .. } => "NullReference",
            AccessError::ClassCast { .. } => "ClassCast",
            AccessError::WrongMethodType { .. } => "WrongMethodType",
            AccessError::UnsupportedOperation { .. } => "UnsupportedOperation",
            AccessError::ReadOnlyBuffer { .. } => "ReadOnlyBuffer",
            AccessError::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            AccessError::Misalignment { .. } => "Misalignment",
        }
    }
}
