use std::sync::Arc;

use crate::containers::registry::Registry;
use crate::error::ResolutionError;
use crate::interfaces::container::{Container, Injectable};
use crate::resolver::Resolver;

/// A registry paired with constructor resolution.
///
/// Meant to be created by whoever assembles the application and passed
/// explicitly to the code that builds components.
#[derive(Debug, Default)]
pub struct BasicContainer {
    registry: Registry,
}

impl BasicContainer {
    pub fn new() -> Self {
        BasicContainer {
            registry: Registry::new(),
        }
    }

    pub fn register<T: Send + Sync + 'static>(&self, instance: T) -> Option<Arc<T>> {
        self.registry.register(instance)
    }

    pub fn register_shared<T: Send + Sync + 'static>(&self, instance: Arc<T>) -> Option<Arc<T>> {
        self.registry.register_shared(instance)
    }

    pub fn lookup<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.registry.lookup()
    }

    pub fn construct<T: Injectable>(&self) -> Result<T, ResolutionError> {
        self.resolver().resolve()
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Container for BasicContainer {
    fn register<T: Send + Sync + 'static>(&self, instance: T) -> Option<Arc<T>> {
        BasicContainer::register(self, instance)
    }

    fn construct<T: Injectable>(&self) -> Result<T, ResolutionError> {
        BasicContainer::construct(self)
    }
}
