//! Named presets of field values bound to a model.

use std::collections::BTreeMap;
use std::sync::Arc;

use seedling_core::{Instance, Store, Value};

use crate::builder::ModelRef;
use crate::errors::GenerationError;
use crate::overrides::Overrides;
use crate::seeder::Seeder;

/// Another recipe used as the value of a relation field.
#[derive(Debug, Clone)]
pub enum RecipeRef {
    Recipe(Arc<Recipe>),
    /// `"namespace.name"`, or a bare name looked up in the namespace of the
    /// recipe being built. Resolved at build time.
    Named(String),
}

impl From<Arc<Recipe>> for RecipeRef {
    fn from(recipe: Arc<Recipe>) -> Self {
        RecipeRef::Recipe(recipe)
    }
}

impl From<&Arc<Recipe>> for RecipeRef {
    fn from(recipe: &Arc<Recipe>) -> Self {
        RecipeRef::Recipe(Arc::clone(recipe))
    }
}

impl From<&str> for RecipeRef {
    fn from(name: &str) -> Self {
        RecipeRef::Named(name.to_string())
    }
}

impl From<String> for RecipeRef {
    fn from(name: String) -> Self {
        RecipeRef::Named(name)
    }
}

#[derive(Debug, Clone)]
pub enum RecipeValue {
    Value(Value),
    /// Built from another recipe, persisted when the outer call persists.
    ForeignKey(RecipeRef),
}

/// Relation value built from another recipe.
pub fn foreign_key(recipe: impl Into<RecipeRef>) -> RecipeValue {
    RecipeValue::ForeignKey(recipe.into())
}

#[derive(Debug, Clone)]
pub struct Recipe {
    model: ModelRef,
    attrs: BTreeMap<String, RecipeValue>,
}

impl Recipe {
    pub fn new(model: impl Into<ModelRef>) -> Self {
        Self {
            model: model.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_value(field, RecipeValue::Value(value.into()))
    }

    pub fn with_foreign_key(self, field: impl Into<String>, recipe: impl Into<RecipeRef>) -> Self {
        self.with_value(field, foreign_key(recipe))
    }

    pub fn with_value(mut self, field: impl Into<String>, value: RecipeValue) -> Self {
        self.attrs.insert(field.into(), value);
        self
    }

    pub fn model(&self) -> &ModelRef {
        &self.model
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &RecipeValue)> {
        self.attrs.iter().map(|(field, value)| (field.as_str(), value))
    }

    /// Builds and persists an instance, `overrides` taking precedence over
    /// the recipe's values.
    pub fn make<S: Store>(
        self: &Arc<Self>,
        seeder: &mut Seeder<S>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        seeder.make_from(self, overrides)
    }

    pub fn prepare<S: Store>(
        self: &Arc<Self>,
        seeder: &mut Seeder<S>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        seeder.prepare_from(self, overrides)
    }
}

/// Recipes keyed by `"namespace.name"`.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: BTreeMap<String, Arc<Recipe>>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, namespace: &str, name: &str, recipe: Recipe) -> Arc<Recipe> {
        let recipe = Arc::new(recipe);
        self.recipes
            .insert(format!("{namespace}.{name}"), Arc::clone(&recipe));
        recipe
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Recipe>> {
        self.recipes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Looks up `"namespace.name"`, or a bare name inside `namespace`.
    pub fn find(
        &self,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<Arc<Recipe>, GenerationError> {
        let recipe = match (name.contains('.'), namespace) {
            (true, _) | (false, None) => self.recipes.get(name),
            (false, Some(namespace)) => self.recipes.get(&format!("{namespace}.{name}")),
        };
        recipe
            .cloned()
            .ok_or_else(|| GenerationError::RecipeNotFound(name.to_string()))
    }

    /// Namespace a recipe was registered under, if it was.
    pub fn namespace_of(&self, recipe: &Arc<Recipe>) -> Option<String> {
        self.recipes
            .iter()
            .find(|(_, registered)| Arc::ptr_eq(registered, recipe))
            .and_then(|(key, _)| key.rsplit_once('.'))
            .map(|(namespace, _)| namespace.to_string())
    }

    /// Resolves a relation reference made from a recipe in `namespace`.
    pub fn resolve(
        &self,
        reference: &RecipeRef,
        namespace: Option<&str>,
    ) -> Result<Arc<Recipe>, GenerationError> {
        match reference {
            RecipeRef::Recipe(recipe) => Ok(Arc::clone(recipe)),
            RecipeRef::Named(name) => self.find(name, namespace),
        }
    }
}
