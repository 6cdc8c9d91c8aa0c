//! Binds one container to one top-level registration request.
//!
//! Only one session is current at a time; beginning a new one overwrites the
//! pointer (last writer wins). Callers finish one root - at least through
//! handle acquisition - before starting the next, or accept that the earlier
//! container becomes unreachable through this pathway.

use std::sync::{Arc, Mutex};

use futures::task::{Spawn, SpawnExt};
use futures_channel::oneshot;

use crate::{
    container::{Container, Handle},
    errors::SessionError,
    registrar::GraphRegistrar,
    registry::DescriptorRegistry,
    types::{DynError, Identifier, Lifecycle, Value},
};

/// Creates the per-session containers this crate registers into
pub trait ContainerProvider: Send + Sync {
    fn create_container(
        &self,
        name: Option<&str>,
        default_lifecycle: Lifecycle,
    ) -> Arc<dyn Container>;
}

/// Receives failures that have no synchronous caller left to report to
pub trait ErrorSink: Send + Sync {
    fn report(&self, context: &str, error: &DynError);
}

/// The default sink: log and drop
pub struct TracingSink;
impl ErrorSink for TracingSink {
    fn report(&self, context: &str, error: &DynError) {
        tracing::error!("{context}: {error:?}");
    }
}

/// Session-bound lookup over the container created by [Injector::begin_session]
pub struct SessionLookup {
    container: Arc<dyn Container>,
}
impl SessionLookup {
    pub fn get(&self, identifier: &Identifier) -> Option<Arc<dyn Handle>> {
        self.container.get_dep(identifier)
    }

    pub fn container(&self) -> &Arc<dyn Container> {
        &self.container
    }
}

/// A deferred post-declaration resolution in flight
pub struct DeferredInjection {
    pub handle: Arc<dyn Handle>,
    /// Completes with the resolved value; cancelled when the deferred
    /// resolution fails (the failure itself goes to the error sink).
    pub completed: oneshot::Receiver<Value>,
}

struct CurrentSession {
    container: Arc<dyn Container>,
}

/// Coordinates declaration metadata, the registrar, and session containers
pub struct Injector {
    registry: Arc<DescriptorRegistry>,
    registrar: GraphRegistrar,
    provider: Arc<dyn ContainerProvider>,
    spawner: Arc<dyn Spawn + Send + Sync>,
    sink: Arc<dyn ErrorSink>,
    current: Mutex<Option<CurrentSession>>,
}

impl Injector {
    pub fn new(
        registry: Arc<DescriptorRegistry>,
        provider: Arc<dyn ContainerProvider>,
        spawner: Arc<dyn Spawn + Send + Sync>,
    ) -> Self {
        Injector {
            registrar: GraphRegistrar::new(registry.clone()),
            registry,
            provider,
            spawner,
            sink: Arc::new(TracingSink),
            current: Mutex::new(None),
        }
    }

    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Creates a fresh container and makes it current
    pub fn begin_session(
        &self,
        name: Option<&str>,
        default_lifecycle: Option<Lifecycle>,
    ) -> SessionLookup {
        let container = self
            .provider
            .create_container(name, default_lifecycle.unwrap_or_default());
        tracing::debug!("session opened for '{}'", name.unwrap_or("<anonymous>"));
        *self.current.lock().unwrap() = Some(CurrentSession {
            container: container.clone(),
        });
        SessionLookup { container }
    }

    /// Registers the stored graph for `target` - optionally narrowed to one
    /// of its injectable members - against the current session container and
    /// returns the container's handle for it.
    ///
    /// Clears the current-session pointer on the way out, so a later,
    /// unrelated call cannot accidentally reuse this container.
    pub fn resolve_via_session(
        &self,
        target: &Identifier,
        member: Option<&str>,
    ) -> Result<Arc<dyn Handle>, SessionError> {
        let descriptor =
            self.registry
                .get(target)
                .ok_or_else(|| SessionError::UndeclaredRoot {
                    identifier: target.clone(),
                })?;

        let root = match member {
            None => descriptor.identifier.clone(),
            Some(member) => descriptor
                .properties
                .iter()
                .find(|property| property.member.as_ref() == member)
                .map(|property| property.identifier.clone())
                .ok_or_else(|| SessionError::UnknownMember {
                    owner: target.clone(),
                    member: member.to_owned(),
                })?,
        };

        let container = self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|session| session.container.clone())
            .ok_or(SessionError::NoActiveSession)?;

        self.registrar.register_graph(&root, &container)?;

        let handle = container
            .get_dep(&root)
            .ok_or_else(|| SessionError::HandleMissing {
                identifier: root.clone(),
            })?;

        *self.current.lock().unwrap() = None;

        Ok(handle)
    }

    /// Declaration-triggered convenience: session, registration, handle, and
    /// a detached resolution on the next scheduling turn.
    ///
    /// The declaring call site has no return channel for asynchronous
    /// failure, so a deferred failure is reported to the error sink and
    /// dropped; the completion channel on the returned [DeferredInjection] is
    /// cancelled in that case.
    pub fn trigger_implicit_injection(
        &self,
        identifier: Identifier,
        name: Option<&str>,
        lifecycle: Option<Lifecycle>,
    ) -> Result<DeferredInjection, SessionError> {
        // The triggering target stays injectable into others under its own
        // identifier; only its lifecycle is amended here.
        let known = self
            .registry
            .update(&identifier, |descriptor| {
                if let Some(lifecycle) = lifecycle {
                    descriptor.lifecycle = lifecycle;
                }
            })
            .is_some();
        if !known {
            return Err(SessionError::UndeclaredRoot { identifier });
        }

        self.begin_session(name, lifecycle);
        let handle = self.resolve_via_session(&identifier, None)?;

        let (done_tx, done_rx) = oneshot::channel();
        let task_handle = handle.clone();
        let sink = self.sink.clone();
        let described = identifier.to_string();
        self.spawner
            .spawn(async move {
                match task_handle.inject().await {
                    Ok(value) => {
                        let _ = done_tx.send(value);
                    }
                    Err(error) => {
                        sink.report(&format!("deferred injection of '{described}' failed"), &error)
                    }
                }
            })
            .map_err(SessionError::Spawn)?;

        Ok(DeferredInjection {
            handle,
            completed: done_rx,
        })
    }
}
