//! Load-once artifact cache
//!
//! Owned by the serving process and handed to the prediction service. The
//! bundle is read from disk at most once; every caller afterwards shares the
//! same immutable [`ModelArtifacts`].

use boxoffice_core::{ModelArtifacts, PipelineError};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug)]
pub struct ArtifactCache {
    dir: PathBuf,
    artifacts: OnceCell<Arc<ModelArtifacts>>,
    loads: AtomicUsize,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            artifacts: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Loaded artifacts, reading the bundle on first use.
    ///
    /// A failed load leaves the cache empty so the error is reported again on
    /// the next call; nothing is ever served from a partial bundle.
    pub fn get(&self) -> Result<Arc<ModelArtifacts>, PipelineError> {
        self.artifacts
            .get_or_try_init(|| {
                self.loads.fetch_add(1, Ordering::SeqCst);
                info!("Loading artifact bundle from {}", self.dir.display());
                match ModelArtifacts::load(&self.dir) {
                    Ok(artifacts) => Ok(Arc::new(artifacts)),
                    Err(e) => {
                        error!("Failed to load artifacts: {}", e);
                        Err(e)
                    }
                }
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }

    /// Number of times the bundle was read from disk
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}
