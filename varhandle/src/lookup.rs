use std::sync::Arc;

use crate::{
    ByteOrder, Class, HandleKind, LookupError, PrimitiveType, RefType, Type, VarHandle,
    location::Target,
};

/// Describes a storage-location family to build a handle for.
#[derive(Debug, Clone)]
pub enum Descriptor {
    InstanceField {
        class: Arc<Class>,
        name: String,
        ty: PrimitiveType,
    },
    StaticField {
        class: Arc<Class>,
        name: String,
        ty: PrimitiveType,
    },
    ArrayElement(PrimitiveType),
    /// `element` values packed into a `byte[]`
    ByteArrayView {
        element: PrimitiveType,
        order: ByteOrder,
    },
    ByteBufferView {
        element: PrimitiveType,
        order: ByteOrder,
    },
}

pub fn resolve(descriptor: &Descriptor) -> Result<VarHandle, LookupError> {
    let handle = match descriptor {
        Descriptor::InstanceField { class, name, ty } => instance_field(class, name, *ty)?,
        Descriptor::StaticField { class, name, ty } => static_field(class, name, *ty)?,
        Descriptor::ArrayElement(element) => array_element_var_handle(*element),
        Descriptor::ByteArrayView { element, order } => VarHandle::new(
            HandleKind::BufferView,
            view_element(*element)?,
            vec![Type::Reference(RefType::Array(PrimitiveType::Byte)), Type::INT],
            Target::ByteArrayView { order: *order },
        ),
        Descriptor::ByteBufferView { element, order } => VarHandle::new(
            HandleKind::BufferView,
            view_element(*element)?,
            vec![Type::Reference(RefType::ByteBuffer), Type::INT],
            Target::ByteBufferView { order: *order },
        ),
    };
    log::debug!("resolved {descriptor:?} to {handle:?}");
    Ok(handle)
}

fn view_element(element: PrimitiveType) -> Result<PrimitiveType, LookupError> {
    if element.width() < 2 {
        return Err(LookupError::UnsupportedViewType(element));
    }
    Ok(element)
}

fn check_type(
    class: &Class,
    name: &str,
    requested: PrimitiveType,
    actual: PrimitiveType,
) -> Result<(), LookupError> {
    if requested != actual {
        return Err(LookupError::FieldTypeMismatch {
            class: class.name().to_string(),
            name: name.to_string(),
            requested,
            actual,
        });
    }
    Ok(())
}

fn instance_field(
    class: &Arc<Class>,
    name: &str,
    ty: PrimitiveType,
) -> Result<VarHandle, LookupError> {
    let Some(field) = class.field(name) else {
        return Err(match class.static_field(name) {
            Some(_) => LookupError::FieldKindMismatch {
                class: class.name().to_string(),
                name: name.to_string(),
                requested: "instance",
                found: "static",
            },
            None => LookupError::NoSuchField {
                class: class.name().to_string(),
                name: name.to_string(),
            },
        });
    };
    check_type(class, name, ty, field.ty)?;
    let kind = if field.is_final {
        HandleKind::FinalInstanceField
    } else {
        HandleKind::InstanceField
    };
    Ok(VarHandle::new(
        kind,
        ty,
        vec![Type::Reference(RefType::Instance(class.clone()))],
        Target::Field { offset: field.offset },
    ))
}

fn static_field(
    class: &Arc<Class>,
    name: &str,
    ty: PrimitiveType,
) -> Result<VarHandle, LookupError> {
    let Some(field) = class.static_field(name) else {
        return Err(match class.field(name) {
            Some(_) => LookupError::FieldKindMismatch {
                class: class.name().to_string(),
                name: name.to_string(),
                requested: "static",
                found: "instance",
            },
            None => LookupError::NoSuchField {
                class: class.name().to_string(),
                name: name.to_string(),
            },
        });
    };
    check_type(class, name, ty, field.ty)?;
    let kind = if field.is_final {
        HandleKind::FinalStaticField
    } else {
        HandleKind::StaticField
    };
    Ok(VarHandle::new(
        kind,
        ty,
        Vec::new(),
        Target::Static {
            cell: field.cell.clone(),
        },
    ))
}

pub fn find_var_handle(
    class: &Arc<Class>,
    name: &str,
    ty: PrimitiveType,
) -> Result<VarHandle, LookupError> {
    resolve(&Descriptor::InstanceField {
        class: class.clone(),
        name: name.to_string(),
        ty,
    })
}

pub fn find_static_var_handle(
    class: &Arc<Class>,
    name: &str,
    ty: PrimitiveType,
) -> Result<VarHandle, LookupError> {
    resolve(&Descriptor::StaticField {
        class: class.clone(),
        name: name.to_string(),
        ty,
    })
}

/// Handle over elements of `element[]` arrays. Never fails.
pub fn array_element_var_handle(element: PrimitiveType) -> VarHandle {
    VarHandle::new(
        HandleKind::ArrayElement,
        element,
        vec![Type::Reference(RefType::Array(element)), Type::INT],
        Target::ArrayElement,
    )
}

pub fn byte_array_view_var_handle(
    element: PrimitiveType,
    order: ByteOrder,
) -> Result<VarHandle, LookupError> {
    resolve(&Descriptor::ByteArrayView { element, order })
}

pub fn byte_buffer_view_var_handle(
    element: PrimitiveType,
    order: ByteOrder,
) -> Result<VarHandle, LookupError> {
    resolve(&Descriptor::ByteBufferView { element, order })
}
