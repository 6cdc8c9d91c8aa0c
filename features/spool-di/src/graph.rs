//! Diagnostic verification of a declared closure.
//!
//! Never invoked implicitly: registration tolerates some of what this pass
//! flags (a property cycle, for instance, is served fine by a lazily
//! resolving container), so verification stays an explicit opt-in.

use std::collections::HashSet;

use thiserror::Error;

use crate::{registry::DescriptorRegistry, types::Identifier};

/// A single defect found while walking a closure
#[derive(Error, Debug, Clone)]
pub enum GraphIssue {
    #[error("'{required_by}' needs '{dependency}' but it was never declared")]
    Missing {
        dependency: Identifier,
        required_by: Identifier,
    },
    #[error("'{identifier}' is referenced but never received a target")]
    Unbound { identifier: Identifier },
    #[error("parameter {index} of '{owner}' was never declared")]
    Unfilled { owner: Identifier, index: usize },
    #[error("'{from}' participates in a constructor cycle through {chain:?}")]
    Circular {
        from: Identifier,
        chain: Vec<Identifier>,
    },
}

/// Everything wrong with one closure, reported in a single pass
#[derive(Error, Debug, Clone)]
pub struct GraphIssues {
    pub issues: Vec<GraphIssue>,
}
impl std::fmt::Display for GraphIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The declared graph had one or more issues:".to_string());
        for issue in &self.issues {
            display.push(format!("- {issue}"));
        }
        f.write_str(&display.join("\n"))
    }
}

/// Walks the closure under `root` without touching any container
pub fn verify(registry: &DescriptorRegistry, root: &Identifier) -> Result<(), GraphIssues> {
    let mut checked = HashSet::new();
    let mut issues = Vec::new();
    let mut chain = Vec::new();
    walk(registry, &mut checked, &mut issues, &mut chain, root, root);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(GraphIssues { issues })
    }
}

fn walk(
    registry: &DescriptorRegistry,
    checked: &mut HashSet<Identifier>,
    issues: &mut Vec<GraphIssue>,
    chain: &mut Vec<Identifier>,
    identifier: &Identifier,
    required_by: &Identifier,
) {
    // Constructor cycle check
    if chain.contains(identifier) {
        let mut full_chain = chain.clone();
        full_chain.push(identifier.clone());
        issues.push(GraphIssue::Circular {
            from: identifier.clone(),
            chain: full_chain,
        });
        return;
    }

    let Some(descriptor) = registry.get(identifier) else {
        issues.push(GraphIssue::Missing {
            dependency: identifier.clone(),
            required_by: required_by.clone(),
        });
        return;
    };

    // Skip further checks if already walked
    if !checked.insert(identifier.clone()) {
        return;
    }

    if descriptor.target.is_none() {
        issues.push(GraphIssue::Unbound {
            identifier: identifier.clone(),
        });
    }

    chain.push(identifier.clone());
    for (index, slot) in descriptor.params.iter().enumerate() {
        match slot {
            Some(child) => walk(registry, checked, issues, chain, child, identifier),
            None => issues.push(GraphIssue::Unfilled {
                owner: identifier.clone(),
                index,
            }),
        }
    }
    chain.pop();

    // Property children resolve while the owner is being produced; they get
    // their own chain and never extend the constructor one.
    for property in &descriptor.properties {
        let mut property_chain = Vec::new();
        walk(
            registry,
            checked,
            issues,
            &mut property_chain,
            &property.identifier,
            identifier,
        );
    }
}
