use thiserror::Error;

use crate::interfaces::descriptor::{short_type_name, DependencyType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// A constructor parameter had no registered instance of its exact type.
    #[error(
        "cannot construct `{}`: parameter `{parameter}` requires `{required}` which is not registered",
        short_type_name(.target)
    )]
    UnresolvedDependency {
        target: &'static str,
        parameter: &'static str,
        required: DependencyType,
    },
}

impl ResolutionError {
    pub fn target(&self) -> &'static str {
        match self {
            ResolutionError::UnresolvedDependency { target, .. } => target,
        }
    }

    pub fn parameter(&self) -> &'static str {
        match self {
            ResolutionError::UnresolvedDependency { parameter, .. } => parameter,
        }
    }

    pub fn required(&self) -> DependencyType {
        match self {
            ResolutionError::UnresolvedDependency { required, .. } => *required,
        }
    }
}
