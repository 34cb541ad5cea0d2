use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use seedling_core::{FieldDef, ModelDef, ModelRegistry, Value};

use crate::errors::GenerationError;
use crate::params::Params;

pub mod primitives;

/// Field attribute a generator needs before it runs.
#[derive(Clone, Copy)]
pub enum Requirement {
    /// Copy the named field attribute (e.g. `max_length`) into the params.
    Attr(&'static str),
    /// Derive a `(key, value)` pair from the field.
    Derive(fn(&FieldDef) -> (String, Value)),
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Attr(name) => f.debug_tuple("Attr").field(name).finish(),
            Requirement::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

/// What a generator sees of the field being filled.
pub struct GeneratorContext<'a> {
    pub model: &'a ModelDef,
    pub field: &'a FieldDef,
    pub registry: &'a ModelRegistry,
}

/// Produces a random value of one semantic type.
///
/// Generators hold no state between calls; everything they need comes from
/// the resolved params and the rng.
pub trait Generator: Send + Sync {
    fn id(&self) -> &'static str;

    fn required(&self) -> &[Requirement] {
        &[]
    }

    fn generate(
        &self,
        ctx: &GeneratorContext<'_>,
        params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError>;
}

/// Resolves the declared requirements of `generator` against `field`.
pub fn required_values(
    generator: &str,
    required: &[Requirement],
    field: &FieldDef,
) -> Result<Params, GenerationError> {
    let mut params = Params::new();
    for requirement in required {
        match requirement {
            Requirement::Attr(name) => {
                let value = field.attribute(name).ok_or_else(|| {
                    GenerationError::InvalidRequirementDeclaration {
                        generator: generator.to_string(),
                        requirement: (*name).to_string(),
                    }
                })?;
                params.insert(*name, value);
            }
            Requirement::Derive(derive) => {
                let (key, value) = derive(field);
                params.insert(key, value);
            }
        }
    }
    Ok(params)
}

type GenerateFn = dyn Fn(&Params, &mut dyn RngCore) -> Value + Send + Sync;

/// Generator backed by a closure, for per-attribute or per-type overrides.
pub struct FnGenerator {
    id: &'static str,
    required: Vec<Requirement>,
    generate: Box<GenerateFn>,
}

impl FnGenerator {
    pub fn new<F>(id: &'static str, generate: F) -> Self
    where
        F: Fn(&Params, &mut dyn RngCore) -> Value + Send + Sync + 'static,
    {
        Self {
            id,
            required: Vec::new(),
            generate: Box::new(generate),
        }
    }

    pub fn with_required(mut self, required: impl IntoIterator<Item = Requirement>) -> Self {
        self.required = required.into_iter().collect();
        self
    }
}

impl Generator for FnGenerator {
    fn id(&self) -> &'static str {
        self.id
    }

    fn required(&self) -> &[Requirement] {
        &self.required
    }

    fn generate(
        &self,
        _ctx: &GeneratorContext<'_>,
        params: &Params,
        rng: &mut dyn RngCore,
    ) -> Result<Value, GenerationError> {
        Ok((self.generate)(params, rng))
    }
}

/// Shorthand for an `Arc<dyn Generator>` built from a closure.
pub fn from_fn<F>(id: &'static str, generate: F) -> Arc<dyn Generator>
where
    F: Fn(&Params, &mut dyn RngCore) -> Value + Send + Sync + 'static,
{
    Arc::new(FnGenerator::new(id, generate))
}

/// Always returns the same value.
pub fn constant(value: impl Into<Value>) -> Arc<dyn Generator> {
    let value = value.into();
    from_fn("constant", move |_, _| value.clone())
}
