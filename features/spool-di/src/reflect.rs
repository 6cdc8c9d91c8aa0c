//! Boundary to the host's type-reflection facility.
//!
//! Rust has no ambient runtime reflection, so declaration sites feed their
//! own metadata into a [StaticReflector] table, or run against the
//! [NullReflector] and spell out an explicit identifier for every injected
//! site.

use std::{
    collections::HashMap,
    sync::RwLock,
};

use crate::types::TypeToken;

/// Kinds of values that carry no unique registrable identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleKind {
    Number,
    Text,
    Boolean,
    Object,
    Function,
}

/// A parameter or member type as reported by the reflection facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectedType {
    /// A concrete, uniquely addressable type
    Class(TypeToken),
    /// A bare primitive-ish type
    Simple(SimpleKind),
    /// Reflection could not produce a type for this site
    Opaque,
}
impl ReflectedType {
    pub fn class<T: 'static>() -> ReflectedType {
        ReflectedType::Class(TypeToken::of::<T>())
    }
}

/// Supplies parameter and return/member types for declaration sites.
///
/// Both lookups return empty/absent when unavailable, which the builder
/// treats as "no implicit dependencies".
pub trait TypeReflector: Send + Sync {
    /// Ordered parameter types of a constructor (member = `None`) or member
    fn param_types(&self, target: &TypeToken, member: Option<&str>) -> Vec<ReflectedType>;
    /// Return type of a factory, or the type of a member
    fn return_type(&self, target: &TypeToken, member: Option<&str>) -> Option<ReflectedType>;
}

/// Reports nothing; every injected site then needs an explicit identifier
pub struct NullReflector;
impl TypeReflector for NullReflector {
    fn param_types(&self, _target: &TypeToken, _member: Option<&str>) -> Vec<ReflectedType> {
        Vec::new()
    }

    fn return_type(&self, _target: &TypeToken, _member: Option<&str>) -> Option<ReflectedType> {
        None
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct Site {
    target: TypeToken,
    member: Option<String>,
}

/// Declaration-time metadata tables
#[derive(Default)]
pub struct StaticReflector {
    params: RwLock<HashMap<Site, Vec<ReflectedType>>>,
    returns: RwLock<HashMap<Site, ReflectedType>>,
}

impl StaticReflector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the ordered parameter types of a declaration site
    pub fn record_params(
        &self,
        target: TypeToken,
        member: Option<&str>,
        types: impl IntoIterator<Item = ReflectedType>,
    ) {
        let site = Site {
            target,
            member: member.map(str::to_owned),
        };
        self.params
            .write()
            .unwrap()
            .insert(site, types.into_iter().collect());
    }

    /// Records the return/member type of a declaration site
    pub fn record_return(&self, target: TypeToken, member: Option<&str>, ty: ReflectedType) {
        let site = Site {
            target,
            member: member.map(str::to_owned),
        };
        self.returns.write().unwrap().insert(site, ty);
    }
}

impl TypeReflector for StaticReflector {
    fn param_types(&self, target: &TypeToken, member: Option<&str>) -> Vec<ReflectedType> {
        let site = Site {
            target: *target,
            member: member.map(str::to_owned),
        };
        self.params
            .read()
            .unwrap()
            .get(&site)
            .cloned()
            .unwrap_or_default()
    }

    fn return_type(&self, target: &TypeToken, member: Option<&str>) -> Option<ReflectedType> {
        let site = Site {
            target: *target,
            member: member.map(str::to_owned),
        };
        self.returns.read().unwrap().get(&site).copied()
    }
}
