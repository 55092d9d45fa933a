//! Model Store
//!
//! Lazily loads the model artifact once and hands out the same shared,
//! immutable instance afterwards. There is no reload path: the artifact is
//! fixed for the life of the process.

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::core::model::{LinearPriceModel, PriceModel};
use crate::models::errors::{AppError, AppResult};

/// Shared handle to a loaded model
pub type SharedModel = Arc<dyn PriceModel>;

/// One-time loader for the model artifact
pub struct ModelStore {
    path: PathBuf,
    model: OnceCell<SharedModel>,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: OnceCell::new(),
        }
    }

    /// Get the model, loading it on first call.
    ///
    /// A failed load is not cached; the next caller tries again.
    pub fn get(&self) -> AppResult<SharedModel> {
        let model = self.model.get_or_try_init(|| {
            let model = LinearPriceModel::load(&self.path)?;
            info!(path = %self.path.display(), "Model cached for process lifetime");
            Ok::<SharedModel, AppError>(Arc::new(model))
        })?;
        Ok(Arc::clone(model))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use crate::models::types::feature_schema;
    use std::collections::HashMap;

    fn write_artifact(dir: &Path) -> PathBuf {
        let model = LinearPriceModel {
            name: "store-test".to_string(),
            version: "1".to_string(),
            columns: feature_schema(),
            intercept: 1.0,
            numeric: HashMap::new(),
            categorical: HashMap::new(),
            target: Default::default(),
        };
        let path = dir.join("best_model.json");
        std::fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_loads_once_and_shares() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(write_artifact(dir.path()));
        assert!(!store.is_loaded());

        let a = store.get().unwrap();
        // Removing the file proves the second call does not touch disk
        std::fs::remove_file(store.path()).unwrap();
        let b = store.get().unwrap();

        assert!(store.is_loaded());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.name(), "store-test");
    }

    #[test]
    fn test_missing_artifact_fails() {
        let store = ModelStore::new("/nonexistent/best_model.json");
        let err = match store.get() {
            Ok(_) => panic!("expected load failure"),
            Err(e) => e,
        };
        assert_eq!(err.code, ErrorCode::ArtifactLoad);
        assert!(err.code.is_fatal_to_process());
        assert!(!store.is_loaded());
    }
}
