//! Resolution of human-given model names.
//!
//! Names are either qualified (`app.model`, looked up directly) or bare
//! (`model`, looked up case-insensitively in a cache built once from the
//! registry). A bare name present in more than one app is ambiguous and can
//! only be reached through its qualified form.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use seedling_core::{ModelDef, ModelRegistry};

use crate::errors::GenerationError;

#[derive(Debug)]
struct FinderCache {
    unique: BTreeMap<String, Arc<ModelDef>>,
    ambiguous: BTreeSet<String>,
}

/// Finds models by name. Share one finder (behind an `Arc`) between
/// builders so the bare-name cache is built once.
#[derive(Debug)]
pub struct ModelFinder {
    registry: Arc<ModelRegistry>,
    cache: OnceLock<FinderCache>,
}

impl ModelFinder {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            cache: OnceLock::new(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Resolves `app.model` or a bare model name.
    pub fn get_model(&self, name: &str) -> Result<Arc<ModelDef>, GenerationError> {
        let model = match name.split_once('.') {
            Some((app_label, model_name)) => self.registry.get_model(app_label, model_name),
            None => self.get_model_by_name(name)?,
        };
        model.ok_or_else(|| GenerationError::ModelNotFound(name.to_string()))
    }

    /// Bare-name lookup; fails when the name exists in more than one app.
    pub fn get_model_by_name(&self, name: &str) -> Result<Option<Arc<ModelDef>>, GenerationError> {
        let name = name.to_lowercase();
        let cache = self.cache();
        if cache.ambiguous.contains(&name) {
            return Err(GenerationError::AmbiguousModelName(name));
        }
        Ok(cache.unique.get(&name).cloned())
    }

    /// Whether a bare name is claimed by several apps.
    pub fn is_ambiguous(&self, name: &str) -> bool {
        self.cache().ambiguous.contains(&name.to_lowercase())
    }

    fn cache(&self) -> &FinderCache {
        self.cache.get_or_init(|| populate(&self.registry))
    }
}

fn populate(registry: &ModelRegistry) -> FinderCache {
    let mut unique = BTreeMap::new();
    let mut ambiguous = BTreeSet::new();

    for (_, models) in registry.apps() {
        for (name, model) in models {
            if unique.contains_key(name) {
                ambiguous.insert(name.clone());
            } else {
                unique.insert(name.clone(), Arc::clone(model));
            }
        }
    }

    for name in &ambiguous {
        unique.remove(name);
    }

    debug!(
        models = unique.len(),
        ambiguous = ambiguous.len(),
        "model finder cache built"
    );
    FinderCache { unique, ambiguous }
}
