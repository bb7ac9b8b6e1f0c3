//! Namespace → search-root index.

use std::collections::HashMap;
use std::path::MAIN_SEPARATOR;

/// Strip trailing namespace separators. e.g. "App\Models\" -> "App\Models"
pub fn normalize_namespace(namespace: &str) -> String {
    namespace.trim_end_matches('\\').to_string()
}

/// Ensure exactly one trailing path separator. e.g. "/src/Models" -> "/src/Models/"
pub fn normalize_root(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', MAIN_SEPARATOR]);
    format!("{}{}", trimmed, MAIN_SEPARATOR)
}

#[derive(Clone, Debug, Default)]
pub struct NamespaceIndex {
    roots: HashMap<String, Vec<String>>,
}

impl NamespaceIndex {
    pub fn new() -> Self {
        NamespaceIndex::default()
    }

    /// Returns false when the (namespace, root) pair was already registered.
    pub fn insert(&mut self, namespace: &str, root: &str) -> bool {
        let namespace = normalize_namespace(namespace);
        let root = normalize_root(root);
        let roots = self.roots.entry(namespace).or_default();
        if roots.contains(&root) {
            return false;
        }
        roots.push(root);
        true
    }

    /// Roots for a normalized namespace, in registration order.
    pub fn roots(&self, namespace: &str) -> Option<&[String]> {
        self.roots.get(namespace).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
