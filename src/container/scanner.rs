//! Namespace scanning.
//!
//! Walks a dot-separated namespace tree and collects every type name found
//! beneath a base namespace. Sibling order is whatever the source yields;
//! callers must not depend on it.

use std::collections::BTreeSet;

/// One direct child of a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEntry {
    /// Fully-qualified name of a nested namespace.
    Namespace(String),
    /// Fully-qualified name of a type.
    Type(String),
}

/// Anything that can enumerate a namespace tree.
pub trait NamespaceSource {
    /// Direct children of `namespace`, or `None` if it does not exist.
    fn list(&self, namespace: &str) -> Option<Vec<NamespaceEntry>>;
}

/// Error raised when a namespace cannot be enumerated.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("namespace `{0}` cannot be resolved")]
    Unresolvable(String),
}

/// Collect every type name beneath `base`, recursing into nested namespaces.
pub fn scan(source: &dyn NamespaceSource, base: &str) -> Result<BTreeSet<String>, DiscoveryError> {
    let mut found = BTreeSet::new();
    let mut pending = vec![base.to_string()];

    while let Some(namespace) = pending.pop() {
        let entries = source
            .list(&namespace)
            .ok_or_else(|| DiscoveryError::Unresolvable(namespace.clone()))?;

        for entry in entries {
            match entry {
                NamespaceEntry::Namespace(child) => pending.push(child),
                NamespaceEntry::Type(name) => {
                    found.insert(name);
                }
            }
        }
    }

    tracing::debug!(namespace = %base, types = found.len(), "Namespace scanned");
    Ok(found)
}
