//! Virtual host resolution
//!
//! A Host header value selects the document root a request is served from.
//! The mapping is built once before the listener starts and is only read
//! afterwards.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Immutable mapping from Host header value to document root.
#[derive(Debug, Clone, Default)]
pub struct VirtualHosts {
    roots: HashMap<String, PathBuf>,
}

impl VirtualHosts {
    /// Validates and canonicalizes every document root.
    ///
    /// Fails if a root does not exist or is not a directory.
    pub fn new(roots: HashMap<String, PathBuf>) -> Result<Self> {
        let mut canonical = HashMap::with_capacity(roots.len());

        for (host, root) in roots {
            let metadata = std::fs::metadata(&root)
                .with_context(|| format!("document root {} for {host}", root.display()))?;

            if !metadata.is_dir() {
                bail!("document root {} for {host} is not a directory", root.display());
            }

            let root = root
                .canonicalize()
                .with_context(|| format!("failed resolving document root {}", root.display()))?;

            tracing::debug!(host = %host, root = %root.display(), "virtual host registered");
            canonical.insert(host, root);
        }

        Ok(Self { roots: canonical })
    }

    /// Returns the document root for `host`. Matching is exact, port included.
    pub fn resolve(&self, host: &str) -> Option<&Path> {
        if host.is_empty() {
            return None;
        }
        self.roots.get(host).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
