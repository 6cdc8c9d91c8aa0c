use std::sync::Arc;

use futures_channel::oneshot;
use thiserror::Error;

use crate::{
    descriptor::DepKind,
    types::{DynError, Identifier},
};

/// The declaration site an error points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationSite {
    Parameter(usize),
    Property(Arc<str>),
    ReturnType,
}
impl std::fmt::Display for DeclarationSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclarationSite::Parameter(index) => write!(f, "parameter {index}"),
            DeclarationSite::Property(member) => write!(f, "property '{member}'"),
            DeclarationSite::ReturnType => f.write_str("return type"),
        }
    }
}

/// Errors raised synchronously while declaring descriptors
#[derive(Error, Debug)]
pub enum DeclareError {
    /// A simple-typed or unreflectable site carries no unique identity;
    /// nothing is committed for the offending declaration.
    #[error("{site} of '{owner}' carries no registrable identity - declare it with an explicit identifier")]
    MissingIdentifier {
        owner: Identifier,
        site: DeclarationSite,
    },
}

/// Errors raised while registering a closure with the container
#[derive(Error, Debug)]
pub enum RegisterError {
    /// The descriptor's kind disagrees with its target - a corrupted or
    /// hand-crafted entry, treated as a programming error.
    #[error("descriptor '{identifier}' declares kind {kind:?} but its target disagrees - refusing to register")]
    UnknownKind {
        identifier: Identifier,
        kind: DepKind,
    },
    /// A referenced child was never declared
    #[error("'{required_by}' needs '{dependency}' but it was never declared")]
    MissingDependency {
        dependency: Identifier,
        required_by: Identifier,
    },
    /// A placeholder was referenced as a dependency but never bound
    #[error("'{identifier}' is referenced as a dependency but never received a target")]
    UnboundTarget { identifier: Identifier },
    /// A positional slot was left unfilled
    #[error("parameter {index} of '{owner}' was never declared")]
    UnfilledPosition { owner: Identifier, index: usize },
}

/// Failures surfaced while the container drives a registered producer
#[derive(Error, Debug)]
pub enum ResolveError {
    /// An identifier the producer needs is unknown to the container
    #[error("dependency '{identifier}' is not registered with the container")]
    Unregistered { identifier: Identifier },
    /// A property child failed to resolve or to attach
    #[error("property '{member}' of '{owner}' failed - error: {error:?}")]
    Property {
        owner: Identifier,
        member: Arc<str>,
        error: DynError,
    },
    #[error("failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors raised by session handling
#[derive(Error, Debug)]
pub enum SessionError {
    /// No session container is current
    #[error("no session is active - begin one before resolving")]
    NoActiveSession,
    /// The requested root was never declared
    #[error("'{identifier}' was never declared")]
    UndeclaredRoot { identifier: Identifier },
    /// The named member is not an injectable property of the root
    #[error("'{owner}' has no injectable member '{member}'")]
    UnknownMember { owner: Identifier, member: String },
    #[error(transparent)]
    Register(#[from] RegisterError),
    /// The container accepted the registration but returned no handle
    #[error("container returned no handle for '{identifier}'")]
    HandleMissing { identifier: Identifier },
    /// The deferred resolution task could not be scheduled
    #[error("failed to schedule deferred resolution: {0}")]
    Spawn(futures::task::SpawnError),
    /// The deferred resolution went away without reporting a value
    #[error("deferred resolution was dropped before completing")]
    DeferredDropped,
}
impl From<oneshot::Canceled> for SessionError {
    fn from(_: oneshot::Canceled) -> Self {
        Self::DeferredDropped
    }
}
