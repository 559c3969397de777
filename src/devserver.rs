//! Dev-mode static file server + file-watcher boundary: not part of the
//! renderer pipeline, kept here only so the crate has a concrete type to
//! wire into a binary. The one invariant worth enforcing even in a stub
//! is path containment — never serve outside `root`.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ChangedPath(pub PathBuf);

pub trait DevServerHandle {
    fn serve(&mut self, root: PathBuf, port: u16) -> crate::error::Result<()>;
    fn notify(&self) -> Vec<ChangedPath>;
}

/// In-memory stub: records the root and port, answers `notify()` with
/// nothing. No actual socket is opened.
pub struct StubDevServer {
    root: Option<PathBuf>,
    port: u16,
}

impl StubDevServer {
    pub fn new() -> Self {
        Self { root: None, port: 0 }
    }

    /// Resolve `candidate` against `root`, rejecting anything that
    /// escapes it via `..` or a symlink.
    pub fn resolve_within_root(root: &Path, candidate: &Path) -> Option<PathBuf> {
        let joined = root.join(candidate);
        let canonical_root = root.canonicalize().ok()?;
        let canonical = joined.canonicalize().ok()?;
        canonical.starts_with(&canonical_root).then_some(canonical)
    }
}

impl Default for StubDevServer {
    fn default() -> Self {
        Self::new()
    }
}

impl DevServerHandle for StubDevServer {
    fn serve(&mut self, root: PathBuf, port: u16) -> crate::error::Result<()> {
        self.root = Some(root);
        self.port = port;
        Ok(())
    }

    fn notify(&self) -> Vec<ChangedPath> {
        Vec::new()
    }
}
