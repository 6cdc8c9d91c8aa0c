use std::sync::Arc;

use crate::{
    container::Container, errors::RegisterError, registry::DescriptorRegistry, strategy,
    types::Identifier,
};

/// Walks a root's transitive closure and registers every node exactly once.
///
/// Completeness is the contract, not topological order: the container
/// resolves lazily by identifier, so siblings may register in any order as
/// long as every referenced identifier is registered before the session asks
/// for the root.
pub struct GraphRegistrar {
    registry: Arc<DescriptorRegistry>,
}

impl GraphRegistrar {
    pub fn new(registry: Arc<DescriptorRegistry>) -> Self {
        GraphRegistrar { registry }
    }

    /// Registers `root` and every transitively reachable, not-yet-registered
    /// descriptor with `container`.
    ///
    /// Holds no state beyond the per-call work list, so independent roots may
    /// be registered through the same registrar.
    pub fn register_graph(
        &self,
        root: &Identifier,
        container: &Arc<dyn Container>,
    ) -> Result<(), RegisterError> {
        let mut work = vec![(root.clone(), root.clone())];

        while let Some((identifier, required_by)) = work.pop() {
            // The same shared node may be reachable along several paths, and
            // registering it twice is undefined behavior in the container.
            if container.get_dep(&identifier).is_some() {
                continue;
            }

            let descriptor = self.registry.get(&identifier).ok_or_else(|| {
                RegisterError::MissingDependency {
                    dependency: identifier.clone(),
                    required_by,
                }
            })?;

            for slot in descriptor.params.iter().flatten() {
                work.push((slot.clone(), identifier.clone()));
            }
            for property in &descriptor.properties {
                work.push((property.identifier.clone(), identifier.clone()));
            }

            strategy::register_node(&descriptor, &self.registry, container)?;
            tracing::debug!("registered '{identifier}' [{} queued]", work.len());
        }

        Ok(())
    }
}
