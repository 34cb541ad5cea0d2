use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use seedling_core::{InMemoryStore, Instance, ModelRegistry, Store, Value};

use crate::builder::{Builder, ModelRef};
use crate::errors::GenerationError;
use crate::finder::ModelFinder;
use crate::mapping::GeneratorMapping;
use crate::model::FactoryOptions;
use crate::overrides::Overrides;
use crate::recipe::{Recipe, RecipeBook, RecipeValue};

/// Entry points of the factory.
///
/// Owns the store, the rng and the recipe book; every call borrows a fresh
/// [`Builder`] over them. Seeded runs are reproducible: the same seed and
/// the same sequence of calls yield the same values.
pub struct Seeder<S: Store = InMemoryStore> {
    finder: Arc<ModelFinder>,
    store: S,
    rng: ChaCha8Rng,
    options: FactoryOptions,
    mapping: GeneratorMapping,
    recipes: RecipeBook,
}

impl Seeder<InMemoryStore> {
    /// Seeder over an in-memory store with default options.
    pub fn new(registry: ModelRegistry) -> Self {
        Self::with_store(
            Arc::new(ModelFinder::new(Arc::new(registry))),
            InMemoryStore::new(),
            FactoryOptions::default(),
        )
    }
}

impl<S: Store> Seeder<S> {
    pub fn with_store(finder: Arc<ModelFinder>, store: S, options: FactoryOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self {
            finder,
            store,
            rng,
            options,
            mapping: GeneratorMapping::new(),
            recipes: RecipeBook::new(),
        }
    }

    /// Replaces the options, reseeding when they carry a seed.
    pub fn with_options(mut self, options: FactoryOptions) -> Self {
        if let Some(seed) = options.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        self.options = options;
        self
    }

    pub fn with_mapping(mut self, mapping: GeneratorMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_recipes(mut self, recipes: RecipeBook) -> Self {
        self.recipes = recipes;
        self
    }

    pub fn finder(&self) -> &Arc<ModelFinder> {
        &self.finder
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn recipes_mut(&mut self) -> &mut RecipeBook {
        &mut self.recipes
    }

    /// Builder over this seeder's store, rng and mapping.
    pub fn builder(&mut self) -> Builder<'_> {
        Builder::new(&self.finder, &mut self.store, &mut self.rng, &self.options)
            .with_mapping(self.mapping.clone())
    }

    /// Builds and persists one instance, generating many-to-many members.
    pub fn make_one(
        &mut self,
        model: impl Into<ModelRef>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        self.builder().make(model, overrides)
    }

    /// Like [`Seeder::make_one`], leaving required many-to-many relations
    /// empty.
    pub fn make_one_without_m2m(
        &mut self,
        model: impl Into<ModelRef>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        self.builder().with_make_m2m(false).make(model, overrides)
    }

    /// Builds one instance without persisting anything.
    pub fn prepare_one(
        &mut self,
        model: impl Into<ModelRef>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        self.builder().prepare(model, overrides)
    }

    /// Builds and persists `quantity` instances; `None` or zero falls back
    /// to the configured many quantity.
    pub fn make_many(
        &mut self,
        model: impl Into<ModelRef>,
        quantity: Option<usize>,
        overrides: &Overrides,
    ) -> Result<Vec<Instance>, GenerationError> {
        let quantity = self.quantity(quantity);
        self.builder().build(model, quantity, true, overrides)
    }

    /// Builds and persists from the recipe registered as `"namespace.name"`.
    pub fn make_recipe(
        &mut self,
        name: &str,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let recipe = self.recipes.find(name, None)?;
        self.make_from(&recipe, overrides)
    }

    pub fn prepare_recipe(
        &mut self,
        name: &str,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let recipe = self.recipes.find(name, None)?;
        self.prepare_from(&recipe, overrides)
    }

    pub fn make_many_from_recipe(
        &mut self,
        name: &str,
        quantity: Option<usize>,
        overrides: &Overrides,
    ) -> Result<Vec<Instance>, GenerationError> {
        let quantity = self.quantity(quantity);
        let recipe = self.recipes.find(name, None)?;
        let mut instances = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            instances.push(self.make_from(&recipe, overrides)?);
        }
        info!(recipe = name, quantity, "recipe batch built");
        Ok(instances)
    }

    pub fn make_from(
        &mut self,
        recipe: &Arc<Recipe>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let namespace = self.recipes.namespace_of(recipe);
        self.build_recipe(recipe, namespace.as_deref(), true, overrides)
    }

    pub fn prepare_from(
        &mut self,
        recipe: &Arc<Recipe>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let namespace = self.recipes.namespace_of(recipe);
        self.build_recipe(recipe, namespace.as_deref(), false, overrides)
    }

    fn build_recipe(
        &mut self,
        recipe: &Recipe,
        namespace: Option<&str>,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let mut merged = Overrides::new();
        for (field, value) in recipe.attrs() {
            match value {
                RecipeValue::Value(value) => merged.insert(field, value.clone()),
                RecipeValue::ForeignKey(_) if overrides.contains(field) => {}
                RecipeValue::ForeignKey(reference) => {
                    let related = self.recipes.resolve(reference, namespace)?;
                    let related_namespace = self
                        .recipes
                        .namespace_of(&related)
                        .or_else(|| namespace.map(str::to_string));
                    let instance = self.build_recipe(
                        &related,
                        related_namespace.as_deref(),
                        commit,
                        &Overrides::new(),
                    )?;
                    merged.insert(field, Value::from(instance));
                }
            }
        }
        merged.merge(overrides.clone());

        let model = recipe.model().clone();
        let mut builder = self.builder();
        if commit {
            builder.make(model, &merged)
        } else {
            builder.prepare(model, &merged)
        }
    }

    fn quantity(&self, quantity: Option<usize>) -> usize {
        match quantity {
            Some(quantity) if quantity > 0 => quantity,
            _ => self.options.many_quantity,
        }
    }
}
