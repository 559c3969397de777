//! Per-page session registry: each tracked page owns its own CDP client,
//! shared id generator, and snapshot store, independently lockable so one
//! page's render doesn't block a lookup against another.

use crate::cdp::client::CdpClient;
use crate::config::Config;
use crate::render::id_generator::ElementIdGenerator;
use crate::render::pipeline::RendererPipeline;
use crate::snapshot::SnapshotStore;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct PageSession {
    pub pipeline: RendererPipeline,
    pub snapshots: Mutex<SnapshotStore>,
}

impl PageSession {
    pub fn new(client: CdpClient, config: &Config) -> Self {
        let shared_ids = Arc::new(Mutex::new(ElementIdGenerator::new()));
        Self {
            pipeline: RendererPipeline::new(client, shared_ids, config),
            snapshots: Mutex::new(SnapshotStore::new(config.clamped_snapshot_depth())),
        }
    }
}

/// Keyed by whatever the tool dispatcher calls a page (a CDP target id, a
/// profile name, …) — opaque to the registry itself.
#[derive(Default)]
pub struct SessionRegistry {
    pages: DashMap<String, Arc<PageSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, page_id: impl Into<String>, session: PageSession) -> Arc<PageSession> {
        let session = Arc::new(session);
        self.pages.insert(page_id.into(), session.clone());
        session
    }

    pub fn get(&self, page_id: &str) -> Option<Arc<PageSession>> {
        self.pages.get(page_id).map(|entry| entry.clone())
    }

    pub fn remove(&self, page_id: &str) -> Option<Arc<PageSession>> {
        self.pages.remove(page_id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_independent_pages() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("tab-1").is_none());
        assert!(registry.remove("tab-1").is_none());
    }
}
