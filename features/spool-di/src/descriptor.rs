use std::{any::Any, future::Future, marker::PhantomData, sync::Arc};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    errors::RegisterError,
    types::{DynError, Identifier, Injectable, Lifecycle, TypeToken, Value},
};

/// Production strategy of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    /// Produced by constructing the target type
    Type,
    /// Produced by invoking the bound factory function
    Factory,
    /// A precomputed value
    Instance,
}

/// Two-phase construction protocol for a concrete type.
///
/// The base value is built from positional arguments first; resolved
/// property children are attached afterwards, one [`assign`](Constructible::assign)
/// call per member, before anyone gets to see the value.
pub trait Constructible: Injectable + Sized {
    fn token() -> TypeToken {
        TypeToken::of::<Self>()
    }

    /// Builds the base value from positional arguments
    fn construct(args: Vec<Value>) -> Result<Self, DynError>;

    /// Attaches one resolved property. The default knows no members.
    fn assign(&mut self, member: &str, value: Value) -> Result<(), DynError> {
        let _ = value;
        Err(format!("no injectable member '{member}' on {}", Self::token()).into())
    }
}

/// Dyn-safe construction target
pub trait Construct: Send + Sync {
    fn token(&self) -> TypeToken;

    fn construct(&self, args: Vec<Value>) -> Result<Box<dyn Any + Send + Sync>, DynError>;

    fn assign(
        &self,
        instance: &mut (dyn Any + Send + Sync),
        member: &str,
        value: Value,
    ) -> Result<(), DynError>;
}

/// Bridges a [Constructible] into the dyn-safe [Construct]
pub struct TypedConstruct<T>(PhantomData<fn() -> T>);
impl<T> Default for TypedConstruct<T> {
    fn default() -> Self {
        TypedConstruct(PhantomData)
    }
}
impl<T: Constructible> Construct for TypedConstruct<T> {
    fn token(&self) -> TypeToken {
        T::token()
    }

    fn construct(&self, args: Vec<Value>) -> Result<Box<dyn Any + Send + Sync>, DynError> {
        T::construct(args).map(|built| Box::new(built) as Box<dyn Any + Send + Sync>)
    }

    fn assign(
        &self,
        instance: &mut (dyn Any + Send + Sync),
        member: &str,
        value: Value,
    ) -> Result<(), DynError> {
        let concrete = instance
            .downcast_mut::<T>()
            .ok_or_else(|| DynError::from(format!("instance is not a {}", T::token())))?;
        concrete.assign(member, value)
    }
}

/// Invokes the bound factory function; factories may be asynchronous
pub trait Produce: Send + Sync {
    fn token(&self) -> TypeToken;

    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'static, Result<Value, DynError>>;
}

/// Lifts an async closure into a [Produce] target
pub struct FnProduce {
    token: TypeToken,
    run: Box<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, DynError>> + Send + Sync>,
}
impl FnProduce {
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, DynError>> + Send + 'static,
    {
        FnProduce {
            token: TypeToken::of::<F>(),
            run: Box::new(move |args| run(args).boxed()),
        }
    }
}
impl Produce for FnProduce {
    fn token(&self) -> TypeToken {
        self.token
    }

    fn invoke(&self, args: Vec<Value>) -> BoxFuture<'static, Result<Value, DynError>> {
        (self.run)(args)
    }
}

/// The underlying thing a descriptor produces its value from
#[derive(Clone)]
pub enum Target {
    Type(Arc<dyn Construct>),
    Factory(Arc<dyn Produce>),
    Instance(Value),
}
impl Target {
    pub fn of_type<T: Constructible>() -> Target {
        Target::Type(Arc::new(TypedConstruct::<T>::default()))
    }

    pub fn factory(produce: impl Produce + 'static) -> Target {
        Target::Factory(Arc::new(produce))
    }

    pub fn instance<T: Injectable>(value: T) -> Target {
        Target::Instance(Value::new(value))
    }
}
impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Type(construct) => f.debug_tuple("Type").field(&construct.token()).finish(),
            Target::Factory(produce) => f.debug_tuple("Factory").field(&produce.token()).finish(),
            Target::Instance(value) => f.debug_tuple("Instance").field(value).finish(),
        }
    }
}

/// An unordered property-style child of a descriptor
#[derive(Debug, Clone)]
pub struct PropertyDep {
    /// The member assigned after construction
    pub member: Arc<str>,
    pub identifier: Identifier,
}

/// Metadata record describing one injectable dependency
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub identifier: Identifier,
    pub kind: DepKind,
    /// `None` while the descriptor is only a placeholder created from a
    /// parameter or property reference
    pub target: Option<Target>,
    pub lifecycle: Lifecycle,
    /// Positional children; `None` marks a slot whose descriptor is not yet
    /// known. No gaps may remain once registration begins.
    pub params: Vec<Option<Identifier>>,
    /// Unordered property children
    pub properties: Vec<PropertyDep>,
}

impl Descriptor {
    /// A stub entry for an identifier only referenced so far
    pub fn placeholder(identifier: Identifier) -> Descriptor {
        Descriptor {
            identifier,
            kind: DepKind::Type,
            target: None,
            lifecycle: Lifecycle::default(),
            params: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// A standalone precomputed value
    pub fn instance(identifier: impl Into<Identifier>, value: Value) -> Descriptor {
        Descriptor {
            identifier: identifier.into(),
            kind: DepKind::Instance,
            target: Some(Target::Instance(value)),
            lifecycle: Lifecycle::default(),
            params: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Descriptor {
        self.lifecycle = lifecycle;
        self
    }

    /// The positional identifiers in declaration order; fails on the first
    /// slot that was never filled.
    pub fn positional(&self) -> Result<Vec<Identifier>, RegisterError> {
        self.params
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.clone().ok_or_else(|| RegisterError::UnfilledPosition {
                    owner: self.identifier.clone(),
                    index,
                })
            })
            .collect()
    }
}
