//! Core contracts for Seedling.
//!
//! This crate defines the model descriptors the factory reads, the dynamic
//! values and instances it produces, the namespace-keyed model registry and
//! the persistence seam used to save generated instances.

pub mod error;
pub mod registry;
pub mod schema;
pub mod store;
pub mod value;

pub use error::{Error, Result, StoreError};
pub use registry::ModelRegistry;
pub use schema::{CONTENT_TYPE_MODEL, FieldDef, FieldType, ModelDef};
pub use store::{InMemoryStore, Link, Store};
pub use value::{Instance, Value};
