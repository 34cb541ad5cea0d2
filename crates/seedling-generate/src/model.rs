use serde::{Deserialize, Serialize};

/// Members generated for a many-to-many relation, and the batch size of
/// `make_many` when no quantity is given.
pub const MAX_MANY_QUANTITY: usize = 5;

/// Recursive levels allowed through a relation pointing back at a model
/// already being built.
pub const MAX_SELF_REFERENCE_LOOPS: usize = 2;

/// Options for the factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryOptions {
    /// Generate members for required many-to-many relations.
    pub make_m2m: bool,
    /// Members per generated many-to-many relation.
    pub many_quantity: usize,
    /// Depth bound for self-referencing relation chains.
    pub max_self_reference_loops: usize,
    /// Seed for a reproducible run; random when unset.
    pub seed: Option<u64>,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            make_m2m: true,
            many_quantity: MAX_MANY_QUANTITY,
            max_self_reference_loops: MAX_SELF_REFERENCE_LOOPS,
            seed: None,
        }
    }
}
