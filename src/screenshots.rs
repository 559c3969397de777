//! Screenshot artifact store boundary: out of scope for the renderer
//! pipeline, present only as a stub collaborator other tools could write
//! through. No thumbnailing, no compaction.

#[derive(Debug, Clone)]
pub struct ScreenshotMeta {
    pub id: u64,
    pub format: String,
    pub bytes_len: usize,
}

pub trait ScreenshotStore {
    fn save(&mut self, bytes: Vec<u8>, format: &str) -> u64;
    fn index(&self) -> Vec<ScreenshotMeta>;
}

/// Directory-backed stub: writes each capture to `dir/<id>.<format>`,
/// no retention policy.
pub struct DirScreenshotStore {
    dir: std::path::PathBuf,
    next_id: u64,
    saved: Vec<ScreenshotMeta>,
}

impl DirScreenshotStore {
    pub fn new(dir: std::path::PathBuf) -> Self {
        Self { dir, next_id: 1, saved: Vec::new() }
    }
}

impl ScreenshotStore for DirScreenshotStore {
    fn save(&mut self, bytes: Vec<u8>, format: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let path = self.dir.join(format!("{}.{}", id, format));
        if std::fs::create_dir_all(&self.dir).is_ok() {
            let _ = std::fs::write(&path, &bytes);
        }
        self.saved.push(ScreenshotMeta { id, format: format.to_string(), bytes_len: bytes.len() });
        id
    }

    fn index(&self) -> Vec<ScreenshotMeta> {
        self.saved.clone()
    }
}
