use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{Class, ClassBuilder, LookupError};

struct ClassRegistryImpl {
    classes: HashMap<Arc<str>, Arc<Class>>,
}

/// Thread-safe table of defined classes by name.
///
/// Cloning shares the table.
#[derive(Clone)]
pub struct ClassRegistry(Arc<RwLock<ClassRegistryImpl>>);

impl ClassRegistryImpl {
    fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    fn insert(&mut self, class: Arc<Class>) -> Result<Arc<Class>, LookupError> {
        if self.classes.contains_key(class.name()) {
            return Err(LookupError::DuplicateClass(class.name().to_string()));
        }
        self.classes.insert(Arc::from(class.name()), class.clone());
        Ok(class)
    }

    fn get(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.get(name).cloned()
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self(Arc::new(RwLock::new(ClassRegistryImpl::new())))
    }

    /// Build `builder` and register the class under its name.
    pub fn define(&self, builder: ClassBuilder) -> Result<Arc<Class>, LookupError> {
        let class = builder.build()?;
        self.register(class)
    }

    pub fn register(&self, class: Arc<Class>) -> Result<Arc<Class>, LookupError> {
        self.0.write().insert(class)
    }

    pub fn find(&self, name: &str) -> Result<Arc<Class>, LookupError> {
        self.0
            .read()
            .get(name)
            .ok_or_else(|| LookupError::NoSuchClass(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.read().classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.read();
        f.debug_set().entries(inner.classes.keys()).finish()
    }
}
