use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use crate::{LookupError, PrimitiveType, Storage, Value, memory};

static NEXT_CLASS_ID: AtomicU32 = AtomicU32::new(1);

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassId(u32);

/// An instance field with its offset inside the instance storage.
#[derive(Debug, Clone)]
pub struct FieldDesc {
    pub name: Arc<str>,
    pub ty: PrimitiveType,
    pub offset: usize,
    pub is_final: bool,
    pub initial: Value,
}

/// A static field, owns its own storage cell.
#[derive(Debug, Clone)]
pub struct StaticField {
    pub name: Arc<str>,
    pub ty: PrimitiveType,
    pub is_final: bool,
    pub(crate) cell: Arc<Storage>,
}

pub struct Class {
    id: ClassId,
    name: Arc<str>,
    super_class: Option<Arc<Class>>,
    // own fields only, inherited ones live in the super class
    fields: Vec<FieldDesc>,
    statics: Vec<StaticField>,
    instance_size: usize,
}

#[derive(Debug)]
struct FieldDecl {
    name: String,
    ty: PrimitiveType,
    is_final: bool,
    initial: Option<Value>,
}

#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    super_class: Option<Arc<Class>>,
    fields: Vec<FieldDecl>,
    statics: Vec<FieldDecl>,
}

/// An object of a declared class.
pub struct Instance {
    class: Arc<Class>,
    storage: Storage,
}

#[inline]
const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

impl Class {
    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn super_class(&self) -> Option<&Arc<Class>> {
        self.super_class.as_ref()
    }

    /// Bytes needed by an instance, inherited fields included.
    #[inline]
    pub fn instance_size(&self) -> usize {
        self.instance_size
    }

    /// Own instance fields.
    #[inline]
    pub fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }

    /// Own static fields.
    #[inline]
    pub fn statics(&self) -> &[StaticField] {
        &self.statics
    }

    fn ancestry(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |class| class.super_class.as_deref())
    }

    /// Instance field by name, searching super classes.
    pub fn field(&self, name: &str) -> Option<&FieldDesc> {
        self.ancestry()
            .find_map(|class| class.fields.iter().find(|f| &*f.name == name))
    }

    /// Static field by name, searching super classes.
    pub fn static_field(&self, name: &str) -> Option<&StaticField> {
        self.ancestry()
            .find_map(|class| class.statics.iter().find(|f| &*f.name == name))
    }

    /// All instance fields including inherited ones.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldDesc> {
        self.ancestry().flat_map(|class| class.fields.iter())
    }

    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.ancestry().any(|class| class.id == other.id)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id.0)
            .field("name", &self.name)
            .finish()
    }
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            fields: Vec::new(),
            statics: Vec::new(),
        }
    }

    pub fn extends(mut self, super_class: &Arc<Class>) -> Self {
        self.super_class = Some(super_class.clone());
        self
    }

    /// Mutable instance field starting at zero.
    pub fn field(self, name: impl Into<String>, ty: PrimitiveType) -> Self {
        self.instance(name, ty, false, None)
    }

    pub fn field_with(
        self,
        name: impl Into<String>,
        ty: PrimitiveType,
        initial: impl Into<Value>,
    ) -> Self {
        self.instance(name, ty, false, Some(initial.into()))
    }

    pub fn final_field(
        self,
        name: impl Into<String>,
        ty: PrimitiveType,
        initial: impl Into<Value>,
    ) -> Self {
        self.instance(name, ty, true, Some(initial.into()))
    }

    pub fn static_field(
        mut self,
        name: impl Into<String>,
        ty: PrimitiveType,
        initial: impl Into<Value>,
    ) -> Self {
        self.statics.push(FieldDecl {
            name: name.into(),
            ty,
            is_final: false,
            initial: Some(initial.into()),
        });
        self
    }

    pub fn static_final_field(
        mut self,
        name: impl Into<String>,
        ty: PrimitiveType,
        initial: impl Into<Value>,
    ) -> Self {
        self.statics.push(FieldDecl {
            name: name.into(),
            ty,
            is_final: true,
            initial: Some(initial.into()),
        });
        self
    }

    fn instance(
        mut self,
        name: impl Into<String>,
        ty: PrimitiveType,
        is_final: bool,
        initial: Option<Value>,
    ) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
            is_final,
            initial,
        });
        self
    }

    fn initial_value(&self, decl: &FieldDecl) -> Result<Value, LookupError> {
        match &decl.initial {
            None => Ok(Value::zero(decl.ty)),
            Some(value) => value.widen(decl.ty).ok_or_else(|| LookupError::InitializerMismatch {
                class: self.name.clone(),
                name: decl.name.clone(),
                ty: decl.ty,
            }),
        }
    }

    pub fn build(self) -> Result<Arc<Class>, LookupError> {
        let mut seen: Vec<&str> = Vec::new();
        for decl in self.fields.iter().chain(self.statics.iter()) {
            if seen.contains(&decl.name.as_str()) {
                return Err(LookupError::DuplicateField {
                    class: self.name.clone(),
                    name: decl.name.clone(),
                });
            }
            seen.push(&decl.name);
        }

        // widest first keeps every field naturally aligned with little padding
        let mut order: Vec<&FieldDecl> = self.fields.iter().collect();
        order.sort_by_key(|decl| std::cmp::Reverse(decl.ty.width()));

        let mut cursor = self.super_class.as_ref().map_or(0, |s| s.instance_size);
        let mut fields = Vec::with_capacity(order.len());
        for decl in order {
            let width = decl.ty.width();
            let offset = align_up(cursor, width);
            cursor = offset + width;
            fields.push(FieldDesc {
                name: Arc::from(decl.name.as_str()),
                ty: decl.ty,
                offset,
                is_final: decl.is_final,
                initial: self.initial_value(decl)?,
            });
        }

        let mut statics = Vec::with_capacity(self.statics.len());
        for decl in &self.statics {
            let initial = self.initial_value(decl)?;
            let cell = Storage::zeroed(decl.ty.width());
            if let Some(bits) = initial.to_bits() {
                // SAFETY: fresh cell of exactly `width` bytes, word aligned
                unsafe { memory::store(cell.ptr_at(0), decl.ty.width(), bits, Ordering::Release) };
            }
            statics.push(StaticField {
                name: Arc::from(decl.name.as_str()),
                ty: decl.ty,
                is_final: decl.is_final,
                cell: Arc::new(cell),
            });
        }

        let class = Class {
            id: ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed)),
            name: Arc::from(self.name.as_str()),
            super_class: self.super_class,
            fields,
            statics,
            instance_size: cursor,
        };
        log::debug!(
            "defined class {} ({} fields, {} statics, {} bytes)",
            class.name,
            class.fields.len(),
            class.statics.len(),
            class.instance_size
        );
        Ok(Arc::new(class))
    }
}

impl Instance {
    /// Allocate an instance with every field set to its initializer.
    pub fn new(class: &Arc<Class>) -> Arc<Instance> {
        let storage = Storage::zeroed(class.instance_size());
        for field in class.all_fields() {
            if let Some(bits) = field.initial.to_bits() {
                let ptr = storage.ptr_at(field.offset);
                // SAFETY: offsets come from the layout of this class and are
                // aligned to the field width
                unsafe { memory::store(ptr, field.ty.width(), bits, Ordering::Relaxed) };
            }
        }
        Arc::new(Instance {
            class: class.clone(),
            storage,
        })
    }

    #[inline]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    #[inline]
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .finish()
    }
}
