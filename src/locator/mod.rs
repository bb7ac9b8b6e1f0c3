//! Symbol locator: resolves namespace-qualified type names to source files under registered roots.

mod index;
mod scanner;

pub use index::{normalize_namespace, normalize_root, NamespaceIndex};
pub use scanner::{BraceDepthScanner, DeclarationKind, DeclarationRecord, DeclarationScanner};

use std::collections::HashSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::{Mutex, RwLock};

/// Default source file extension.
pub const DEFAULT_SOURCE_EXTENSION: &str = "php";

/// Host hook that brings a located file into the running program.
pub trait SourceLoader: Send + Sync {
    fn load(&self, path: &Path);
}

impl<F> SourceLoader for F
where
    F: Fn(&Path) + Send + Sync,
{
    fn load(&self, path: &Path) {
        self(path)
    }
}

fn log_load(path: &Path) {
    tracing::debug!(path = %path.display(), "source loaded");
}

pub struct SymbolLocator {
    index: RwLock<NamespaceIndex>,
    loaded: Mutex<HashSet<PathBuf>>,
    scanner: Box<dyn DeclarationScanner>,
    loader: Box<dyn SourceLoader>,
    extension: String,
}

impl Default for SymbolLocator {
    fn default() -> Self {
        SymbolLocator::new()
    }
}

impl SymbolLocator {
    pub fn new() -> Self {
        SymbolLocator {
            index: RwLock::new(NamespaceIndex::new()),
            loaded: Mutex::new(HashSet::new()),
            scanner: Box::new(BraceDepthScanner),
            loader: Box::new(log_load),
            extension: DEFAULT_SOURCE_EXTENSION.to_string(),
        }
    }

    pub fn with_scanner(mut self, scanner: impl DeclarationScanner + 'static) -> Self {
        self.scanner = Box::new(scanner);
        self
    }

    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Add a search root for a namespace. Registering the same pair twice is a no-op.
    pub fn register_root(&self, namespace: &str, root: impl AsRef<Path>) {
        let root = root.as_ref().to_string_lossy();
        let mut index = self.index.write().unwrap_or_else(|p| p.into_inner());
        if index.insert(namespace, &root) {
            tracing::debug!(namespace = %normalize_namespace(namespace), root = %normalize_root(&root), "root registered");
        }
    }

    pub fn register_roots<I, P>(&self, namespace: &str, roots: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for root in roots {
            self.register_root(namespace, root);
        }
    }

    /// Find and load the file declaring `name`. `None` means "not here": callers
    /// should fall through to other resolvers.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let name = name.trim_start_matches('\\');
        let index = self.index.read().unwrap_or_else(|p| p.into_inner());
        let mut namespace = name;
        let mut segments: Vec<&str> = Vec::new();

        while let Some(pos) = namespace.rfind('\\') {
            segments.insert(0, &namespace[pos + 1..]);
            namespace = &namespace[..pos];

            let Some(roots) = index.roots(namespace) else { continue };
            tracing::debug!(name, namespace, "namespace registered");
            let relative = format!(
                "{}.{}",
                segments.join(&MAIN_SEPARATOR.to_string()),
                self.extension
            );
            for root in roots {
                let path = PathBuf::from(format!("{}{}", root, relative));
                if !path.is_file() {
                    continue;
                }
                if self.declares(&path, name) {
                    self.load_once(&path);
                    return Some(path);
                }
                tracing::warn!(name, path = %path.display(), "symbol not declared in file");
            }
        }
        None
    }

    /// Whether the file at `path` declares `name` at top level.
    fn declares(&self, path: &Path, name: &str) -> bool {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable source file");
                return false;
            }
        };
        let mut records = self.scanner.scan(&source);
        records.sort_by_key(|r| r.kind);
        match records.iter().find(|r| r.full_name == name) {
            Some(r) => {
                tracing::debug!(name, kind = ?r.kind, "symbol found");
                true
            }
            None => false,
        }
    }

    fn load_once(&self, path: &Path) {
        let mut loaded = self.loaded.lock().unwrap_or_else(|p| p.into_inner());
        if loaded.insert(path.to_path_buf()) {
            self.loader.load(path);
        }
    }
}
