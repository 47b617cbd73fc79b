//! Constructor resolution.
//!
//! A [`Resolver`] reads the target's [`TypeDescriptor`], looks every
//! parameter up in the [`Registry`] by exact type and stages the matches by
//! parameter name. The constructor runs only after the whole descriptor has
//! resolved; the first unresolved required parameter aborts construction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::containers::registry::{Instance, Registry};
use crate::error::ResolutionError;
use crate::interfaces::container::Injectable;
use crate::interfaces::descriptor::{short_type_name, DependencyType, TypeDescriptor};

/// Builds [`Injectable`] types from the instances held by a registry.
///
/// Resolution never mutates the registry and never caches results: every
/// call constructs a fresh value.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Resolver { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn resolve<T: Injectable>(&self) -> Result<T, ResolutionError> {
        let descriptor = T::descriptor();
        let mut args = self.stage(&descriptor)?;
        let injected = args.len();

        let instance = T::construct(&mut args)?;
        debug!(
            target_type = %short_type_name(descriptor.target),
            injected,
            "constructed"
        );
        Ok(instance)
    }

    /// Matches every declared parameter against one registry snapshot.
    fn stage(&self, descriptor: &TypeDescriptor) -> Result<Arguments, ResolutionError> {
        let snapshot = self.registry.snapshot();
        let mut staged = HashMap::with_capacity(descriptor.params.len());
        let mut defaulted = HashMap::new();

        for param in &descriptor.params {
            match snapshot.lookup_by_id(param.ty.id()) {
                Some(instance) => {
                    debug!(parameter = param.name, ty = %param.ty, "injecting");
                    staged.insert(param.name, instance);
                }
                // left unstaged: the constructor falls back to its default
                None if param.optional => {
                    debug!(parameter = param.name, ty = %param.ty, "using default");
                    defaulted.insert(param.name, param.ty);
                }
                None => {
                    debug!(
                        target_type = %short_type_name(descriptor.target),
                        parameter = param.name,
                        ty = %param.ty,
                        "unresolved dependency"
                    );
                    return Err(ResolutionError::UnresolvedDependency {
                        target: descriptor.target,
                        parameter: param.name,
                        required: param.ty,
                    });
                }
            }
        }

        Ok(Arguments {
            target: descriptor.target,
            staged,
            defaulted,
        })
    }
}

/// Builds `T` from `registry`.
pub fn construct<T: Injectable>(registry: &Registry) -> Result<T, ResolutionError> {
    Resolver::new(registry).resolve()
}

/// Arguments staged for one constructor call, keyed by parameter name.
pub struct Arguments {
    target: &'static str,
    staged: HashMap<&'static str, Instance>,
    /// Optional parameters with nothing registered for their type.
    defaulted: HashMap<&'static str, DependencyType>,
}

impl Arguments {
    /// Takes the instance staged for the required parameter `name`.
    ///
    /// Fails when the descriptor did not declare `name` with type `T`, or
    /// when `name` was already taken.
    pub fn take<T: Send + Sync + 'static>(&mut self, name: &'static str) -> Result<Arc<T>, ResolutionError> {
        self.staged
            .remove(name)
            .and_then(|instance| instance.downcast::<T>().ok())
            .ok_or_else(|| ResolutionError::UnresolvedDependency {
                target: self.target,
                parameter: name,
                required: DependencyType::of::<T>(),
            })
    }

    /// Takes the instance staged for the optional parameter `name`, or
    /// `T::default()` when nothing of type `T` was registered.
    ///
    /// Fails like [`Arguments::take`] when `name` was not declared as an
    /// optional parameter of type `T`.
    pub fn take_or_default<T: Default + Send + Sync + 'static>(
        &mut self,
        name: &'static str,
    ) -> Result<Arc<T>, ResolutionError> {
        match self.defaulted.get(name) {
            Some(ty) if ty.is::<T>() => {
                self.defaulted.remove(name);
                Ok(Arc::new(T::default()))
            }
            _ => self.take(name),
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.staged.keys().collect();
        names.sort_unstable();
        f.debug_struct("Arguments")
            .field("target", &short_type_name(self.target))
            .field("staged", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::any::type_name;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::interfaces::descriptor::ParamDescriptor;

    #[derive(Debug, Default)]
    struct Config(u32);

    #[derive(Debug, Default)]
    struct Approval(bool);

    struct Tool {
        config: Arc<Config>,
        approval: Arc<Approval>,
    }

    impl Injectable for Tool {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new::<Self>(vec![
                ParamDescriptor::required::<Config>("config"),
                ParamDescriptor::optional::<Approval>("approval"),
            ])
        }

        fn construct(args: &mut Arguments) -> Result<Self, ResolutionError> {
            Ok(Tool {
                config: args.take("config")?,
                approval: args.take_or_default("approval")?,
            })
        }
    }

    /// Declares one parameter but asks for another in its constructor.
    struct Mismatched;

    impl Injectable for Mismatched {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new::<Self>(vec![ParamDescriptor::required::<Config>("config")])
        }

        fn construct(args: &mut Arguments) -> Result<Self, ResolutionError> {
            args.take::<Approval>("config")?;
            Ok(Mismatched)
        }
    }

    /// Declares `approval` but asks for a misspelled name in its constructor.
    struct Misspelled {
        _approval: Arc<Approval>,
    }

    impl Injectable for Misspelled {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new::<Self>(vec![ParamDescriptor::optional::<Approval>("approval")])
        }

        fn construct(args: &mut Arguments) -> Result<Self, ResolutionError> {
            Ok(Misspelled {
                _approval: args.take_or_default("aproval")?,
            })
        }
    }

    static COUNTED_BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Injectable for Counted {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new::<Self>(vec![ParamDescriptor::required::<Config>("config")])
        }

        fn construct(args: &mut Arguments) -> Result<Self, ResolutionError> {
            COUNTED_BUILDS.fetch_add(1, Ordering::SeqCst);
            args.take::<Config>("config")?;
            Ok(Counted)
        }
    }

    struct Runtime;

    struct TwoMissing;

    impl Injectable for TwoMissing {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new::<Self>(vec![
                ParamDescriptor::required::<Runtime>("runtime"),
                ParamDescriptor::required::<Config>("config"),
            ])
        }

        fn construct(args: &mut Arguments) -> Result<Self, ResolutionError> {
            args.take::<Runtime>("runtime")?;
            args.take::<Config>("config")?;
            Ok(TwoMissing)
        }
    }

    #[test]
    fn test_resolve_with_default() {
        let registry = Registry::new();
        registry.register(Config(3));

        let tool: Tool = construct(&registry).unwrap();
        assert_eq!(tool.config.0, 3);
        assert!(!tool.approval.0);
    }

    #[test]
    fn test_registered_value_beats_default() {
        let registry = Registry::new();
        registry.register(Config(3));
        let approval = Arc::new(Approval(true));
        registry.register_shared(Arc::clone(&approval));

        let tool: Tool = Resolver::new(&registry).resolve().unwrap();
        assert!(Arc::ptr_eq(&tool.approval, &approval));
    }

    #[test]
    fn test_required_parameter_fails_fast() {
        let registry = Registry::new();
        registry.register(Approval(true));

        let err = construct::<Tool>(&registry).err().unwrap();
        assert_eq!(err.parameter(), "config");
        assert!(err.required().is::<Config>());
        assert_eq!(err.target(), type_name::<Tool>());
    }

    #[test]
    fn test_constructor_type_mismatch_is_reported() {
        let registry = Registry::new();
        registry.register(Config(1));

        let err = construct::<Mismatched>(&registry).err().unwrap();
        assert_eq!(err.parameter(), "config");
        assert!(err.required().is::<Approval>());
    }

    #[test]
    fn test_arguments_debug() {
        let registry = Registry::new();
        registry.register(Config(1));
        let args = Resolver::new(&registry).stage(&Tool::descriptor()).unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(format!("{:?}", args), r#"Arguments { target: "Tool", staged: ["config"] }"#);
    }

    #[test]
    fn test_default_only_for_declared_optional_parameter() {
        let registry = Registry::new();
        registry.register(Approval(true));

        let err = construct::<Misspelled>(&registry).err().unwrap();
        assert_eq!(err.parameter(), "aproval");
        assert!(err.required().is::<Approval>());

        // nothing registered: the declared name still falls back to the default
        let empty = Registry::new();
        let mut args = Resolver::new(&empty).stage(&Misspelled::descriptor()).unwrap();
        assert!(args.take_or_default::<Approval>("aproval").is_err());
        assert!(args.take_or_default::<Config>("approval").is_err());
        let approval = args.take_or_default::<Approval>("approval").unwrap();
        assert!(!approval.0);
    }

    #[test]
    fn test_constructor_not_invoked_on_failure() {
        let registry = Registry::new();
        assert!(construct::<Counted>(&registry).is_err());
        assert_eq!(COUNTED_BUILDS.load(Ordering::SeqCst), 0);

        registry.register(Config(1));
        assert!(construct::<Counted>(&registry).is_ok());
        assert_eq!(COUNTED_BUILDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_missing_parameter_is_reported() {
        let registry = Registry::new();
        let err = construct::<TwoMissing>(&registry).err().unwrap();
        assert_eq!(err.parameter(), "runtime");
        assert!(err.required().is::<Runtime>());

        registry.register(Runtime);
        let err = construct::<TwoMissing>(&registry).err().unwrap();
        assert_eq!(err.parameter(), "config");
    }

    /// Collects the `parameter` field of DEBUG events with the given message.
    struct DebugEvents {
        message: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[derive(Default)]
    struct EventFields {
        message: String,
        parameter: String,
    }

    impl Visit for EventFields {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "parameter" {
                self.parameter = value.to_string();
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.message = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for DebugEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() != Level::DEBUG {
                return;
            }
            let mut fields = EventFields::default();
            event.record(&mut fields);
            if fields.message == self.message {
                self.seen.lock().unwrap().push(fields.parameter);
            }
        }
    }

    #[test]
    fn test_injections_logged_at_debug() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(DebugEvents {
            message: "injecting",
            seen: Arc::clone(&seen),
        });

        let registry = Registry::new();
        registry.register(Config(1));
        tracing::subscriber::with_default(subscriber, || {
            construct::<Tool>(&registry).unwrap();
        });

        assert_eq!(*seen.lock().unwrap(), vec!["config".to_string()]);
    }
}
