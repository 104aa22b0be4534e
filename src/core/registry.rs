//! Model Registry - name -> artifact map and the single active model slot
//!
//! Selection clears the slot before anything else, so a failed load leaves
//! no model active rather than the previous one. The write lock is held
//! across the whole clear-then-load sequence: concurrent predictions see
//! either the pre-selection model or the selection's final outcome.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{info, warn};

use crate::core::classifier::{Classifier, ModelArtifact};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::ModelKind;
use crate::utils::constants::{model_file_for, MODEL_FILE_MAP};

/// Active model slot
#[derive(Clone, Default)]
pub struct ActiveModel {
    pub model: Option<Arc<dyn Classifier>>,
    pub name: Option<String>,
    pub kind: Option<ModelKind>,
}

impl ActiveModel {
    fn loaded(name: &str, model: Arc<dyn Classifier>) -> Self {
        Self {
            model: Some(model),
            name: Some(name.to_string()),
            kind: Some(ModelKind::Ml),
        }
    }
}

/// Snapshot handed to a single prediction
#[derive(Clone)]
pub struct ActiveHandle {
    pub name: String,
    pub model: Arc<dyn Classifier>,
}

/// Registered model and whether its file is on disk
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub file: String,
    pub available: bool,
}

/// Summary of the active model
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSummary {
    pub name: String,
    pub kind: ModelKind,
    pub family: String,
}

pub struct ModelRegistry {
    models_dir: PathBuf,
    active: RwLock<ActiveModel>,
}

impl ModelRegistry {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            active: RwLock::new(ActiveModel::default()),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Load the model registered under `name` and make it the active one
    pub fn select(&self, name: &str) -> AppResult<ActiveSummary> {
        let start = Instant::now();
        // the slot is only ever replaced wholesale, so a poisoned guard is still coherent
        let mut slot = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *slot = ActiveModel::default();

        let file = model_file_for(name).ok_or_else(|| {
            warn!("❌ Unknown model name requested: '{}'", name);
            AppError::unknown_model(name)
        })?;

        let path = self.models_dir.join(file);
        if !path.exists() {
            warn!("❌ Model file missing: {}", path.display());
            return Err(AppError::model_file_not_found(&path));
        }

        let artifact = ModelArtifact::from_path(&path).map_err(|e| {
            warn!("❌ {}", e);
            e
        })?;
        let family = artifact.family();
        *slot = ActiveModel::loaded(name, Arc::new(artifact));

        info!(
            "🧠 Model '{}' loaded successfully ({}, {}ms)",
            name,
            family,
            start.elapsed().as_millis()
        );
        Ok(ActiveSummary {
            name: name.to_string(),
            kind: ModelKind::Ml,
            family: family.to_string(),
        })
    }

    /// Install an already-built classifier as the active model
    pub fn install(&self, name: &str, model: Arc<dyn Classifier>) {
        let mut slot = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *slot = ActiveModel::loaded(name, model);
    }

    /// Drop the active model
    pub fn clear(&self) {
        let mut slot = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *slot = ActiveModel::default();
    }

    /// The active model, if any
    pub fn active(&self) -> Option<ActiveHandle> {
        let slot = self.active.read().unwrap_or_else(PoisonError::into_inner);
        match (&slot.model, &slot.name) {
            (Some(model), Some(name)) => Some(ActiveHandle {
                name: name.clone(),
                model: model.clone(),
            }),
            _ => None,
        }
    }

    pub fn active_summary(&self) -> Option<ActiveSummary> {
        let slot = self.active.read().unwrap_or_else(PoisonError::into_inner);
        match (&slot.model, &slot.name, slot.kind) {
            (Some(model), Some(name), Some(kind)) => Some(ActiveSummary {
                name: name.clone(),
                kind,
                family: model.family().to_string(),
            }),
            _ => None,
        }
    }

    /// Every registered model with file availability
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        MODEL_FILE_MAP
            .iter()
            .map(|(name, file)| CatalogEntry {
                name: name.to_string(),
                file: file.to_string(),
                available: self.models_dir.join(file).is_file(),
            })
            .collect()
    }
}
