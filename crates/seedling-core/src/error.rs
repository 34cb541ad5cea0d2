use thiserror::Error;

/// Core error type shared across Seedling crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The model registry violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A value was supplied for a field the model does not declare.
    #[error("'{field}' is not a field of {model}")]
    UnknownField { model: String, field: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by Seedling crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by a [`Store`](crate::store::Store) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation needs an instance that already has an identity.
    #[error("{model} instance must be saved first")]
    UnsavedInstance { model: String },
    /// The instance points at a related instance that was never saved.
    #[error("{model}.{field} refers to an unsaved instance")]
    UnsavedRelated { model: String, field: String },
    /// Storage backend failure, propagated unchanged.
    #[error("storage error: {0}")]
    Backend(String),
}
