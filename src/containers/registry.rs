use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, trace};

use crate::interfaces::descriptor::short_type_name;

pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

struct Entry {
    name: &'static str,
    instance: Instance,
}

/// One shared instance per concrete type.
///
/// Lookups match on exact type identity only. Registering a second instance
/// of a type replaces the first.
pub struct Registry {
    instances: RwLock<HashMap<TypeId, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            instances: RwLock::new(HashMap::new()),
        }
    }

    pub fn register<T: Send + Sync + 'static>(&self, instance: T) -> Option<Arc<T>> {
        self.register_shared(Arc::new(instance))
    }

    /// Registers an instance the caller already shares.
    pub fn register_shared<T: Send + Sync + 'static>(&self, instance: Arc<T>) -> Option<Arc<T>> {
        let name = type_name::<T>();
        let previous = self.instances.write().insert(
            TypeId::of::<T>(),
            Entry {
                name,
                instance: instance as Instance,
            },
        );

        match previous {
            Some(entry) => {
                debug!(ty = %short_type_name(name), replaced = true, "registered dependency");
                entry.instance.downcast::<T>().ok()
            }
            None => {
                debug!(ty = %short_type_name(name), "registered dependency");
                None
            }
        }
    }

    pub fn lookup<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.lookup_by_id(TypeId::of::<T>())
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    pub fn lookup_by_id(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.instances
            .read()
            .get(&type_id)
            .map(|entry| Arc::clone(&entry.instance))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.instances.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    /// Short names of all registered types, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .instances
            .read()
            .values()
            .map(|entry| short_type_name(entry.name).into_owned())
            .collect();
        names.sort_unstable();
        names
    }

    /// Holds the read lock so a series of lookups sees one consistent state.
    /// Registrations block until the snapshot is dropped.
    pub(crate) fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            guard: self.instances.read(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.type_names())
            .finish()
    }
}

pub(crate) struct Snapshot<'a> {
    guard: RwLockReadGuard<'a, HashMap<TypeId, Entry>>,
}

impl Snapshot<'_> {
    pub(crate) fn lookup_by_id(&self, type_id: TypeId) -> Option<Instance> {
        let found = self.guard.get(&type_id).map(|entry| Arc::clone(&entry.instance));
        trace!(?type_id, found = found.is_some(), "registry lookup");
        found
    }
}
