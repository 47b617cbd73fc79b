//! Type-directed dependency resolution.
//!
//! Instances are registered into a [`Registry`] keyed by their own type. A
//! [`Resolver`] then builds any [`Injectable`] type by looking up each of its
//! declared constructor parameters by exact type and invoking the
//! constructor only once every parameter has been matched.
//!
//! ```rust
//! use std::sync::Arc;
//! use tioc::{BasicContainer, Injectable};
//!
//! struct Config {
//!     project: String,
//! }
//!
//! #[derive(Injectable)]
//! struct ReadFileTool {
//!     config: Arc<Config>,
//! }
//!
//! let container = BasicContainer::new();
//! container.register(Config { project: "demo".into() });
//!
//! let tool: ReadFileTool = container.construct().unwrap();
//! assert_eq!(tool.config.project, "demo");
//! ```

extern crate self as tioc;

pub mod containers;
pub mod error;
pub mod interfaces;
pub mod resolver;

pub use containers::basic::BasicContainer;
pub use containers::registry::Registry;
pub use error::ResolutionError;
pub use interfaces::container::{Container, Injectable};
pub use interfaces::descriptor::{DependencyType, ParamDescriptor, TypeDescriptor};
pub use resolver::{construct, Arguments, Resolver};

pub use tioc_derives::Injectable;
