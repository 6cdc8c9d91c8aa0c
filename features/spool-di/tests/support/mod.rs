//! Shared fixtures: an in-memory lazily-resolving container, a capturing
//! task queue, and small helpers for writing declaration scenarios.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use futures::{
    future::{BoxFuture, FutureExt},
    task::{FutureObj, Spawn, SpawnError},
};
use spool_di::{
    Container, ContainerProvider, DynError, ErrorSink, Handle, Identifier, Injectable, Lifecycle,
    ProducerFn, Value,
};

/// Minimal container double: resolves lazily by identifier, caches
/// singletons, and records every registration so tests can assert
/// idempotence.
pub struct RecordingContainer {
    state: Arc<ContainerState>,
}

struct ContainerState {
    entries: RwLock<HashMap<Identifier, Entry>>,
    singletons: RwLock<HashMap<Identifier, Value>>,
    log: RwLock<Vec<Identifier>>,
}

#[derive(Clone)]
enum Entry {
    Factory {
        producer: ProducerFn,
        dependencies: Vec<Identifier>,
        lifecycle: Lifecycle,
    },
    Instance {
        value: Value,
    },
}

impl RecordingContainer {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingContainer {
            state: Arc::new(ContainerState {
                entries: RwLock::new(HashMap::new()),
                singletons: RwLock::new(HashMap::new()),
                log: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Every identifier passed to a register call, in call order
    pub fn registration_log(&self) -> Vec<Identifier> {
        self.state.log.read().unwrap().clone()
    }

    pub fn times_registered(&self, identifier: &Identifier) -> usize {
        self.state
            .log
            .read()
            .unwrap()
            .iter()
            .filter(|logged| *logged == identifier)
            .count()
    }
}

impl Container for RecordingContainer {
    fn register_factory(
        &self,
        identifier: Identifier,
        producer: ProducerFn,
        dependencies: Vec<Identifier>,
        lifecycle: Lifecycle,
    ) {
        self.state.log.write().unwrap().push(identifier.clone());
        self.state.entries.write().unwrap().insert(
            identifier,
            Entry::Factory {
                producer,
                dependencies,
                lifecycle,
            },
        );
    }

    fn register_instance(
        &self,
        identifier: Identifier,
        value: Value,
        _dependencies: Vec<Identifier>,
        _lifecycle: Lifecycle,
    ) {
        self.state.log.write().unwrap().push(identifier.clone());
        self.state
            .entries
            .write()
            .unwrap()
            .insert(identifier, Entry::Instance { value });
    }

    fn get_dep(&self, identifier: &Identifier) -> Option<Arc<dyn Handle>> {
        if !self.state.entries.read().unwrap().contains_key(identifier) {
            return None;
        }
        Some(Arc::new(LazyHandle {
            identifier: identifier.clone(),
            state: self.state.clone(),
        }))
    }
}

struct LazyHandle {
    identifier: Identifier,
    state: Arc<ContainerState>,
}

impl Handle for LazyHandle {
    fn inject(&self) -> BoxFuture<'static, Result<Value, DynError>> {
        resolve(self.state.clone(), self.identifier.clone())
    }

    fn injected(&self) -> Option<Value> {
        if let Some(value) = self.state.singletons.read().unwrap().get(&self.identifier) {
            return Some(value.clone());
        }
        match self.state.entries.read().unwrap().get(&self.identifier) {
            Some(Entry::Instance { value }) => Some(value.clone()),
            _ => None,
        }
    }
}

fn resolve(
    state: Arc<ContainerState>,
    identifier: Identifier,
) -> BoxFuture<'static, Result<Value, DynError>> {
    async move {
        if let Some(value) = state.singletons.read().unwrap().get(&identifier).cloned() {
            return Ok(value);
        }

        let entry = state
            .entries
            .read()
            .unwrap()
            .get(&identifier)
            .cloned()
            .ok_or_else(|| DynError::from(format!("'{identifier}' is not registered")))?;

        match entry {
            Entry::Instance { value } => Ok(value),
            Entry::Factory {
                producer,
                dependencies,
                lifecycle,
            } => {
                let mut args = Vec::with_capacity(dependencies.len());
                for dependency in dependencies {
                    args.push(resolve(state.clone(), dependency).await?);
                }
                let value = producer(args).await?;
                if lifecycle == Lifecycle::Singleton {
                    state
                        .singletons
                        .write()
                        .unwrap()
                        .insert(identifier, value.clone());
                }
                Ok(value)
            }
        }
    }
    .boxed()
}

/// Hands out [RecordingContainer]s and keeps them reachable for assertions
pub struct TestPlatform {
    created: Mutex<Vec<(Option<String>, Arc<RecordingContainer>)>>,
}

impl TestPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(TestPlatform {
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn container(&self, index: usize) -> Arc<RecordingContainer> {
        self.created.lock().unwrap()[index].1.clone()
    }

    pub fn last(&self) -> Arc<RecordingContainer> {
        self.created.lock().unwrap().last().unwrap().1.clone()
    }

    pub fn name_of(&self, index: usize) -> Option<String> {
        self.created.lock().unwrap()[index].0.clone()
    }
}

impl ContainerProvider for TestPlatform {
    fn create_container(
        &self,
        name: Option<&str>,
        _default_lifecycle: Lifecycle,
    ) -> Arc<dyn Container> {
        let container = RecordingContainer::new();
        self.created
            .lock()
            .unwrap()
            .push((name.map(str::to_owned), container.clone()));
        container
    }
}

/// Captures detached tasks so tests decide when the next scheduling turn runs
pub struct QueueSpawner {
    tasks: Mutex<Vec<FutureObj<'static, ()>>>,
}

impl QueueSpawner {
    pub fn new() -> Arc<Self> {
        Arc::new(QueueSpawner {
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Runs everything queued, including tasks queued while draining
    pub fn drain(&self) {
        loop {
            let drained: Vec<_> = std::mem::take(&mut *self.tasks.lock().unwrap());
            if drained.is_empty() {
                break;
            }
            for task in drained {
                futures::executor::block_on(task);
            }
        }
    }
}

impl Spawn for QueueSpawner {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.tasks.lock().unwrap().push(future);
        Ok(())
    }
}

/// Collects sink reports for assertions
pub struct CapturingSink {
    reports: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(CapturingSink {
            reports: Mutex::new(Vec::new()),
        })
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorSink for CapturingSink {
    fn report(&self, context: &str, error: &DynError) {
        self.reports
            .lock()
            .unwrap()
            .push(format!("{context}: {error:?}"));
    }
}

/// Positional-argument accessor for construct/factory bodies
pub fn arg<T: Injectable>(args: &[Value], index: usize) -> Result<Arc<T>, DynError> {
    args.get(index)
        .ok_or_else(|| DynError::from(format!("missing argument {index}")))?
        .downcast::<T>()
        .map_err(|actual| {
            DynError::from(format!(
                "argument {index}: required '{}' actual '{actual}'",
                std::any::type_name::<T>()
            ))
        })
}
