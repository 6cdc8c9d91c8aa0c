use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All dynamic-boundary errors must be Send + Sync
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// We assume that a multithreaded async runtime may drive resolution,
/// so anything injectable needs to be Send + Sync + 'static.
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type Name and Type Id of a `'static` type
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeToken {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeToken {
    pub fn of<T: 'static + ?Sized>() -> TypeToken {
        TypeToken {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Opaque address of a dependency within the registry and the container.
///
/// Either an explicit symbolic name given at a declaration site, or the
/// declaration target itself when no name was given.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Identifier {
    /// Explicit string/symbolic id
    Named(Arc<str>),
    /// The declaration target's own type
    Type(TypeToken),
}
impl Identifier {
    pub fn named(name: impl Into<Arc<str>>) -> Identifier {
        Identifier::Named(name.into())
    }

    pub fn of<T: 'static>() -> Identifier {
        Identifier::Type(TypeToken::of::<T>())
    }
}
impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Named(name) => f.write_str(name),
            Identifier::Type(token) => token.fmt(f),
        }
    }
}
impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::named(name)
    }
}
impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::named(name)
    }
}
impl From<TypeToken> for Identifier {
    fn from(token: TypeToken) -> Self {
        Identifier::Type(token)
    }
}

/// Lifecycle policy of a resolved value.
///
/// Forwarded opaquely to the container, which alone interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// One shared value per container
    #[default]
    Singleton,
    /// A fresh value on every resolution
    PerResolution,
}

/// A produced or captured dependency value, tagged with its concrete type
#[derive(Clone)]
pub struct Value {
    pub info: TypeToken,
    value: Arc<dyn Any + Send + Sync>,
}

impl Value {
    pub fn new<T: Injectable>(value: T) -> Self {
        Value {
            info: TypeToken::of::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn from_arc<T: Injectable>(value: Arc<T>) -> Self {
        Value {
            info: TypeToken::of::<T>(),
            value,
        }
    }

    /// Wraps an already type-erased value under the given token
    pub fn from_boxed(info: TypeToken, value: Box<dyn Any + Send + Sync>) -> Self {
        Value {
            info,
            value: Arc::from(value),
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.value.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Value").field(&self.info.type_name).finish()
    }
}
