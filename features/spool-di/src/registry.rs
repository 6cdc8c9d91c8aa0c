use std::{collections::HashMap, sync::RwLock};

use crate::{descriptor::Descriptor, types::Identifier};

/// The single source of truth for what has been declared.
///
/// Keyed by identifier, append/update-only; entries are never removed during
/// normal operation. The registry is an explicit object handed to the builder
/// and registrar rather than hidden process state, so isolated registries can
/// exist side by side.
#[derive(Default)]
pub struct DescriptorRegistry {
    entries: RwLock<HashMap<Identifier, Descriptor>>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the descriptor stored under `identifier`
    pub fn get(&self, identifier: &Identifier) -> Option<Descriptor> {
        self.entries.read().unwrap().get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.entries.read().unwrap().contains_key(identifier)
    }

    /// Inserts or replaces the entry for the descriptor's identifier
    pub fn upsert(&self, descriptor: Descriptor) {
        self.entries
            .write()
            .unwrap()
            .insert(descriptor.identifier.clone(), descriptor);
    }

    /// Fetch-or-create, then amend the entry in place
    pub(crate) fn ensure_then<R>(
        &self,
        identifier: &Identifier,
        amend: impl FnOnce(&mut Descriptor) -> R,
    ) -> R {
        let mut entries = self.entries.write().unwrap();
        let entry = entries
            .entry(identifier.clone())
            .or_insert_with(|| Descriptor::placeholder(identifier.clone()));
        amend(entry)
    }

    /// Amend an existing entry in place; `None` when the identifier is unknown
    pub(crate) fn update<R>(
        &self,
        identifier: &Identifier,
        amend: impl FnOnce(&mut Descriptor) -> R,
    ) -> Option<R> {
        self.entries.write().unwrap().get_mut(identifier).map(amend)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}
