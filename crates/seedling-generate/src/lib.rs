//! Test-data factory for model instances.
//!
//! Given a model definition, this crate fills every required field with a
//! plausible random value, honours caller overrides (including nested
//! `relation__field` paths), resolves relations recursively and optionally
//! persists the result through a [`seedling_core::Store`].

pub mod assets;
pub mod builder;
pub mod errors;
pub mod finder;
pub mod generators;
pub mod mapping;
pub mod model;
pub mod overrides;
pub mod params;
pub mod recipe;
pub mod seeder;

pub use builder::{Builder, ModelRef};
pub use errors::GenerationError;
pub use finder::ModelFinder;
pub use generators::{Generator, GeneratorContext, Requirement};
pub use mapping::{GeneratorMapping, Strategy};
pub use model::{FactoryOptions, MAX_MANY_QUANTITY, MAX_SELF_REFERENCE_LOOPS};
pub use overrides::Overrides;
pub use params::Params;
pub use recipe::{Recipe, RecipeBook, RecipeRef, RecipeValue, foreign_key};
pub use seeder::Seeder;
