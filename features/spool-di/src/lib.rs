//! Spool DI assembles declaration-site metadata into a dependency graph and
//! registers each node with an external injection container.
//!
//! The crate consists of four major parts:
//! 1. [DescriptorRegistry] - the single source of truth for what has been declared
//! 2. [DescriptorBuilder] - turns declaration events into registry updates
//! 3. [GraphRegistrar] - walks a root's closure and registers every node exactly once
//! 4. [Injector] - binds one container to one top-level request and resolves it
//!
//! The injection container and the type-reflection facility are consumed
//! through the [Container], [Handle], and [TypeReflector] traits; this crate
//! implements neither.
//!
//! # Example
//!
//! ```
//! use spool_di::{Descriptor, DescriptorRegistry, Identifier, Value};
//!
//! let registry = DescriptorRegistry::new();
//! registry.upsert(Descriptor::instance("retries", Value::new(3_u32)));
//! assert!(registry.get(&Identifier::named("retries")).is_some());
//! ```

pub mod builder;
pub mod container;
pub mod descriptor;
pub mod errors;
pub mod graph;
pub mod reflect;
pub mod registrar;
pub mod registry;
pub mod session;
mod strategy;
pub mod types;

pub use builder::{DescriptorBuilder, RootTarget};
pub use container::{Container, Handle, HandleExt, ProducerFn};
pub use descriptor::{
    Construct, Constructible, DepKind, Descriptor, FnProduce, Produce, PropertyDep, Target,
    TypedConstruct,
};
pub use errors::{DeclarationSite, DeclareError, RegisterError, ResolveError, SessionError};
pub use graph::{verify, GraphIssue, GraphIssues};
pub use reflect::{NullReflector, ReflectedType, SimpleKind, StaticReflector, TypeReflector};
pub use registrar::GraphRegistrar;
pub use registry::DescriptorRegistry;
pub use session::{
    ContainerProvider, DeferredInjection, ErrorSink, Injector, SessionLookup, TracingSink,
};
pub use types::{DynError, Identifier, Injectable, Lifecycle, TypeToken, Value};
