//! Plan storage backends
//!
//! A store turns a plan identifier into a [`PlanSource`]: the bytes plus the
//! kind declared by the uploaded file name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{PlanId, PlanKind, PlanSource};
use crate::error::PlanError;

/// Source of plan documents
pub trait PlanStore {
    /// Fetch a plan's bytes and declared kind
    fn fetch(&self, id: &PlanId) -> impl Future<Output = Result<PlanSource, PlanError>> + Send;
}

/// Plans stored as files in one directory, addressed by file name
#[derive(Debug, Clone)]
pub struct FsPlanStore {
    root: PathBuf,
}

impl FsPlanStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &PlanId) -> Result<PathBuf, PlanError> {
        let name = Path::new(id.as_str());
        // Identifiers are bare file names; anything else could escape the root
        if name.components().count() != 1 || name.file_name().is_none() {
            return Err(PlanError::fetch(
                id.clone(),
                "plan identifier is not a plain file name",
            ));
        }
        Ok(self.root.join(name))
    }
}

impl PlanStore for FsPlanStore {
    async fn fetch(&self, id: &PlanId) -> Result<PlanSource, PlanError> {
        let path = self.path_for(id)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|err| PlanError::fetch(id.clone(), err))?;
        log::debug!("Fetched plan {} ({} bytes) from {}", id, bytes.len(), path.display());
        Ok(PlanSource::from_file_name(id.clone(), id.as_str(), bytes))
    }
}

/// In-memory plans, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct MemoryPlanStore {
    plans: Arc<RwLock<HashMap<PlanId, (PlanKind, Arc<[u8]>)>>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a plan, taking its kind from the declared file name
    pub async fn insert(&self, id: PlanId, file_name: &str, bytes: impl Into<Arc<[u8]>>) {
        let kind = PlanKind::from_file_name(file_name);
        self.plans.write().await.insert(id, (kind, bytes.into()));
    }

    /// Remove a plan, returning whether it existed
    pub async fn remove(&self, id: &PlanId) -> bool {
        self.plans.write().await.remove(id).is_some()
    }
}

impl PlanStore for MemoryPlanStore {
    async fn fetch(&self, id: &PlanId) -> Result<PlanSource, PlanError> {
        let plans = self.plans.read().await;
        let (kind, bytes) = plans.get(id).ok_or_else(|| {
            PlanError::fetch(
                id.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such plan"),
            )
        })?;
        Ok(PlanSource::new(id.clone(), *kind, bytes.clone()))
    }
}
