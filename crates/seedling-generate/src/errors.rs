use thiserror::Error;

use seedling_core::StoreError;

/// Errors emitted by the factory.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("could not find model '{0}'")]
    ModelNotFound(String),
    #[error("'{0}' is a model in more than one app; use the form \"app.model\"")]
    AmbiguousModelName(String),
    #[error("{field_type} is not supported for automatic generation ({model}.{field})")]
    UnsupportedFieldType {
        model: String,
        field: String,
        field_type: String,
    },
    #[error("generator '{generator}' requires unknown field attribute '{requirement}'")]
    InvalidRequirementDeclaration {
        generator: String,
        requirement: String,
    },
    #[error("invalid param: {0}")]
    InvalidParam(String),
    #[error("invalid override for {model}.{field}: {message}")]
    InvalidOverride {
        model: String,
        field: String,
        message: String,
    },
    #[error("recipe not found: {0}")]
    RecipeNotFound(String),
    #[error(transparent)]
    Schema(#[from] seedling_core::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
