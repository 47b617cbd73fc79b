use std::any::{type_name, TypeId};
use std::borrow::Cow;
use std::fmt;

/// Identity of a dependency type: the key used for registry lookups plus a
/// readable name for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DependencyType {
    id: TypeId,
    name: &'static str,
}

impl DependencyType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        DependencyType {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module paths, e.g. `Config` for `app::deps::Config`.
    pub fn short_name(&self) -> Cow<'static, str> {
        short_type_name(self.name)
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// One declared constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub ty: DependencyType,
    /// The constructor supplies its own default when nothing is registered.
    pub optional: bool,
}

impl ParamDescriptor {
    pub fn required<T: 'static>(name: &'static str) -> Self {
        ParamDescriptor {
            name,
            ty: DependencyType::of::<T>(),
            optional: false,
        }
    }

    pub fn optional<T: 'static>(name: &'static str) -> Self {
        ParamDescriptor {
            name,
            ty: DependencyType::of::<T>(),
            optional: true,
        }
    }
}

/// Constructor signature of an injectable type, parameters in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub target: &'static str,
    pub params: Vec<ParamDescriptor>,
}

impl TypeDescriptor {
    pub fn new<T: 'static>(params: Vec<ParamDescriptor>) -> Self {
        TypeDescriptor {
            target: type_name::<T>(),
            params,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn param(&self, name: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", short_type_name(self.target))?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", param.name, param.ty)?;
            if param.optional {
                f.write_str(" = default")?;
            }
        }
        f.write_str(")")
    }
}

/// Strips module paths from every path in a type name:
/// `(a::B, &c::D<e::F>)` becomes `(B, &D<F>)`.
pub(crate) fn short_type_name(name: &str) -> Cow<'_, str> {
    if !name.contains("::") {
        return Cow::Borrowed(name);
    }

    let mut short = String::with_capacity(name.len());
    let mut start = 0;
    for (idx, ch) in name.char_indices() {
        if matches!(ch, '<' | '>' | '(' | ')' | '[' | ']' | ',' | ';' | '&' | '*' | ' ') {
            short.push_str(last_segment(&name[start..idx]));
            short.push(ch);
            start = idx + ch.len_utf8();
        }
    }
    short.push_str(last_segment(&name[start..]));
    Cow::Owned(short)
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
