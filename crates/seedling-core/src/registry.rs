use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{CONTENT_TYPE_MODEL, ModelDef};

/// Known models grouped by app label, keyed by lowercased model name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    apps: BTreeMap<String, BTreeMap<String, Arc<ModelDef>>>,
}

/// On-disk form of a registry (`models.json`).
#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    models: Vec<ModelDef>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every model, then validates relation targets.
    pub fn from_models(models: impl IntoIterator<Item = ModelDef>) -> Result<Self> {
        let mut registry = Self::new();
        for model in models {
            registry.register(model)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(contents)?;
        Self::from_models(file.models)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = RegistryFile {
            models: self.models().map(|model| model.as_ref().clone()).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn register(&mut self, model: ModelDef) -> Result<Arc<ModelDef>> {
        let models = self.apps.entry(model.app_label.clone()).or_default();
        let key = model.model_name();
        if models.contains_key(&key) {
            return Err(Error::InvalidSchema(format!(
                "duplicate model: {}",
                model.label()
            )));
        }
        let model = Arc::new(model);
        models.insert(key, Arc::clone(&model));
        Ok(model)
    }

    /// Direct lookup; the model name is matched case-insensitively.
    pub fn get_model(&self, app_label: &str, model_name: &str) -> Option<Arc<ModelDef>> {
        self.apps
            .get(app_label)
            .and_then(|models| models.get(&model_name.to_lowercase()))
            .cloned()
    }

    /// Lookup by qualified label (`app.model`).
    pub fn get_by_label(&self, label: &str) -> Option<Arc<ModelDef>> {
        let (app_label, model_name) = label.split_once('.')?;
        self.get_model(app_label, model_name)
    }

    /// Enumerates models per app label.
    pub fn apps(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Arc<ModelDef>>)> {
        self.apps
            .iter()
            .map(|(app_label, models)| (app_label.as_str(), models))
    }

    pub fn models(&self) -> impl Iterator<Item = &Arc<ModelDef>> {
        self.apps.values().flat_map(|models| models.values())
    }

    pub fn len(&self) -> usize {
        self.apps.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate internal consistency.
    ///
    /// This checks:
    /// - duplicate field names within a model
    /// - relation fields declare a target
    /// - relation targets are registered (the content-type registry excepted)
    pub fn validate(&self) -> Result<()> {
        for model in self.models() {
            let mut names = BTreeSet::new();
            for field in model.fields.iter().chain(model.many_to_many.iter()) {
                if !names.insert(field.name.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate field name: {}.{}",
                        model.label(),
                        field.name
                    )));
                }

                let is_relation = field.field_type.is_relation() || field.field_type.is_many();
                if !is_relation {
                    continue;
                }
                let target = field.related_model.as_deref().ok_or_else(|| {
                    Error::InvalidSchema(format!(
                        "relation field without target: {}.{}",
                        model.label(),
                        field.name
                    ))
                })?;
                if target != CONTENT_TYPE_MODEL && self.get_by_label(target).is_none() {
                    return Err(Error::InvalidSchema(format!(
                        "relation target not found: {}.{} -> {}",
                        model.label(),
                        field.name,
                        target
                    )));
                }
            }
        }
        Ok(())
    }
}
