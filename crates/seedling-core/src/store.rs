use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::value::{Instance, Value};

/// Persistence seam used by the factory.
pub trait Store {
    /// Persists `instance`, assigning its identity when it has none.
    fn save(&mut self, instance: &mut Instance) -> Result<(), StoreError>;

    /// Attaches `related` to the multi-valued `relation` of a saved instance.
    fn associate(
        &mut self,
        instance: &Instance,
        relation: &str,
        related: &Instance,
    ) -> Result<(), StoreError>;
}

/// A many-to-many row recorded by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub model: String,
    pub pk: i64,
    pub relation: String,
    pub related_model: String,
    pub related_pk: i64,
}

/// Store keeping saved rows per model label.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: BTreeMap<String, BTreeMap<i64, Instance>>,
    next_ids: BTreeMap<String, i64>,
    links: Vec<Link>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, model: &str) -> usize {
        self.rows.get(model).map(BTreeMap::len).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, model: &str, pk: i64) -> Option<&Instance> {
        self.rows.get(model).and_then(|rows| rows.get(&pk))
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_for(&self, instance: &Instance, relation: &str) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|link| {
                link.model == instance.model
                    && Some(link.pk) == instance.pk
                    && link.relation == relation
            })
            .collect()
    }

    fn next_id(&mut self, model: &str) -> i64 {
        let next = self.next_ids.entry(model.to_string()).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }
}

impl Store for InMemoryStore {
    fn save(&mut self, instance: &mut Instance) -> Result<(), StoreError> {
        for (field, value) in &instance.fields {
            if let Value::Instance(related) = value
                && !related.is_persisted()
            {
                return Err(StoreError::UnsavedRelated {
                    model: instance.model.clone(),
                    field: field.clone(),
                });
            }
        }

        let pk = match instance.pk {
            Some(pk) => pk,
            None => {
                let pk = self.next_id(&instance.model);
                instance.pk = Some(pk);
                pk
            }
        };
        self.rows
            .entry(instance.model.clone())
            .or_default()
            .insert(pk, instance.clone());
        Ok(())
    }

    fn associate(
        &mut self,
        instance: &Instance,
        relation: &str,
        related: &Instance,
    ) -> Result<(), StoreError> {
        let pk = instance.pk.ok_or_else(|| StoreError::UnsavedInstance {
            model: instance.model.clone(),
        })?;
        let related_pk = related.pk.ok_or_else(|| StoreError::UnsavedRelated {
            model: instance.model.clone(),
            field: relation.to_string(),
        })?;
        self.links.push(Link {
            model: instance.model.clone(),
            pk,
            relation: relation.to_string(),
            related_model: related.model.clone(),
            related_pk,
        });
        Ok(())
    }
}
