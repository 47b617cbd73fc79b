use std::sync::Arc;

use crate::error::ResolutionError;
use crate::interfaces::descriptor::TypeDescriptor;
use crate::resolver::Arguments;

/// A type that can be built from registered dependencies.
///
/// `descriptor` declares the constructor parameters in order; `construct`
/// receives the arguments staged for exactly those parameters. Usually
/// generated with `#[derive(Injectable)]`.
pub trait Injectable: Sized + 'static {
    fn descriptor() -> TypeDescriptor;

    fn construct(args: &mut Arguments) -> Result<Self, ResolutionError>;
}

pub trait Container: Send + Sync {
    /// Stores `instance` under its own type. Returns the instance it replaced.
    fn register<T: Send + Sync + 'static>(&self, instance: T) -> Option<Arc<T>>;

    fn construct<T: Injectable>(&self) -> Result<T, ResolutionError>;
}
