use std::collections::BTreeMap;
use std::sync::Arc;

use rand::RngCore;
use tracing::{debug, info, warn};

use seedling_core::{FieldDef, FieldType, Instance, ModelDef, Store, Value};

use crate::errors::GenerationError;
use crate::finder::ModelFinder;
use crate::generators::{GeneratorContext, Requirement, required_values};
use crate::mapping::{GeneratorMapping, Strategy};
use crate::model::FactoryOptions;
use crate::overrides::Overrides;

/// A model given either by name (`"app.model"` or a bare name) or by
/// definition.
#[derive(Debug, Clone)]
pub enum ModelRef {
    Name(String),
    Model(Arc<ModelDef>),
}

impl From<&str> for ModelRef {
    fn from(name: &str) -> Self {
        ModelRef::Name(name.to_string())
    }
}

impl From<String> for ModelRef {
    fn from(name: String) -> Self {
        ModelRef::Name(name)
    }
}

impl From<Arc<ModelDef>> for ModelRef {
    fn from(model: Arc<ModelDef>) -> Self {
        ModelRef::Model(model)
    }
}

impl From<&Arc<ModelDef>> for ModelRef {
    fn from(model: &Arc<ModelDef>) -> Self {
        ModelRef::Model(Arc::clone(model))
    }
}

/// Requirement of the related-instance strategy: the target model label.
fn related_model(field: &FieldDef) -> (String, Value) {
    let label = field
        .related_model
        .clone()
        .map(Value::Text)
        .unwrap_or(Value::Null);
    ("model".to_string(), label)
}

const RELATED_REQUIRED: &[Requirement] = &[Requirement::Derive(related_model)];

/// Assembles model instances field by field.
///
/// A builder borrows the finder, the store and the rng for the duration of
/// one or more calls. Related instances are built by the same builder, so
/// they share its mapping and many-to-many setting and inherit the
/// persisting mode of the outermost call.
pub struct Builder<'a> {
    finder: &'a ModelFinder,
    store: &'a mut dyn Store,
    rng: &'a mut dyn RngCore,
    mapping: GeneratorMapping,
    make_m2m: bool,
    many_quantity: usize,
    max_self_reference_loops: usize,
    /// Labels of the models currently being built, outermost first.
    chain: Vec<String>,
}

impl<'a> Builder<'a> {
    pub fn new(
        finder: &'a ModelFinder,
        store: &'a mut dyn Store,
        rng: &'a mut dyn RngCore,
        options: &FactoryOptions,
    ) -> Self {
        Self {
            finder,
            store,
            rng,
            mapping: GeneratorMapping::new(),
            make_m2m: options.make_m2m,
            many_quantity: options.many_quantity,
            max_self_reference_loops: options.max_self_reference_loops,
            chain: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: GeneratorMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_make_m2m(mut self, make_m2m: bool) -> Self {
        self.make_m2m = make_m2m;
        self
    }

    /// Builds and persists one instance.
    pub fn make(
        &mut self,
        model: impl Into<ModelRef>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let model = self.resolve(model.into())?;
        self.make_one(&model, true, overrides)
    }

    /// Builds one instance without persisting it or anything it refers to.
    pub fn prepare(
        &mut self,
        model: impl Into<ModelRef>,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let model = self.resolve(model.into())?;
        self.make_one(&model, false, overrides)
    }

    /// Builds `quantity` independent instances, all receiving the same
    /// overrides.
    pub fn build(
        &mut self,
        model: impl Into<ModelRef>,
        quantity: usize,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Vec<Instance>, GenerationError> {
        let model = self.resolve(model.into())?;
        let mut instances = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            instances.push(self.make_one(&model, commit, overrides)?);
        }
        if quantity > 1 {
            info!(model = %model.label(), quantity, commit, "batch built");
        }
        Ok(instances)
    }

    fn resolve(&self, model: ModelRef) -> Result<Arc<ModelDef>, GenerationError> {
        match model {
            ModelRef::Name(name) => self.finder.get_model(&name),
            ModelRef::Model(model) => Ok(model),
        }
    }

    fn make_one(
        &mut self,
        model: &Arc<ModelDef>,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        self.chain.push(model.label());
        let result = self.assemble(model, commit, overrides);
        self.chain.pop();
        result
    }

    fn assemble(
        &mut self,
        model: &ModelDef,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Instance, GenerationError> {
        let label = model.label();
        let mut attrs: BTreeMap<String, Value> = overrides
            .direct()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect();

        for field in &model.fields {
            if field.field_type.is_relation() && overrides.has_nested(&field.name) {
                if attrs.contains_key(&field.name) {
                    warn!(
                        model = %label,
                        field = %field.name,
                        "direct override replaced by nested overrides"
                    );
                }
                match self.generate_value(model, field, commit, overrides)? {
                    Some(value) => attrs.insert(field.name.clone(), value),
                    None => attrs.remove(&field.name),
                };
                continue;
            }

            if overrides.has_nested(&field.name) {
                warn!(
                    model = %label,
                    field = %field.name,
                    "nested overrides ignored on a field that is not a relation"
                );
            }

            if attrs.contains_key(&field.name) {
                continue;
            }
            if field.field_type.is_auto() {
                continue;
            }
            if field.null {
                debug!(model = %label, field = %field.name, "nullable field skipped");
                continue;
            }
            if (field.blank || field.has_default()) && field.field_type != FieldType::Boolean {
                debug!(model = %label, field = %field.name, "blank or defaulted field skipped");
                continue;
            }

            // Relations reaching this point have no nested overrides of
            // their own, so nothing is passed down to them.
            let generated = self.generate_value(model, field, commit, &Overrides::new())?;
            if let Some(value) = generated {
                attrs.insert(field.name.clone(), value);
            }
        }

        let mut members = BTreeMap::new();
        for field in &model.many_to_many {
            if let Some(value) = attrs.remove(&field.name) {
                members.insert(field.name.clone(), members_from_override(model, field, value)?);
                continue;
            }
            if field.field_type == FieldType::GenericRelation {
                continue;
            }
            if field.null {
                continue;
            }
            if !self.make_m2m {
                members.insert(field.name.clone(), Vec::new());
                continue;
            }
            let generated = self.generate_members(model, field, commit, overrides)?;
            members.insert(field.name.clone(), generated);
        }

        let mut instance = model.instantiate(attrs)?;

        if commit {
            self.store.save(&mut instance)?;
            for (relation, related) in &members {
                for member in related {
                    self.store.associate(&instance, relation, member)?;
                }
            }
            info!(model = %label, pk = instance.pk, "instance saved");
        }
        instance.many_to_many = members
            .into_iter()
            .filter(|(_, related)| !related.is_empty())
            .collect();

        Ok(instance)
    }

    /// Value for one field. `None` leaves the field unset, which happens
    /// when a self-referencing chain is cut short.
    fn generate_value(
        &mut self,
        model: &ModelDef,
        field: &FieldDef,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Option<Value>, GenerationError> {
        let strategy = self
            .mapping
            .resolve(field)
            .ok_or_else(|| unsupported(model, field))?;

        match strategy {
            Strategy::Generate(generator) => {
                let params = required_values(generator.id(), generator.required(), field)?;
                let finder = self.finder;
                let ctx = GeneratorContext {
                    model,
                    field,
                    registry: finder.registry(),
                };
                let value = generator.generate(&ctx, &params, &mut *self.rng)?;
                debug!(
                    model = %model.label(),
                    field = %field.name,
                    generator = generator.id(),
                    "value generated"
                );
                Ok(Some(value))
            }
            Strategy::MakeRelated => self.make_related(model, field, commit, overrides),
            Strategy::MakeMany => Err(unsupported(model, field)),
        }
    }

    fn make_related(
        &mut self,
        model: &ModelDef,
        field: &FieldDef,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Option<Value>, GenerationError> {
        let Some(target) = self.target_model(model, field)? else {
            return Ok(None);
        };
        let nested = overrides.for_relation(&field.name);
        if !overrides.has_nested(&field.name) && self.loops_exhausted(&target) {
            warn!(
                model = %model.label(),
                field = %field.name,
                depth = self.chain.len(),
                "self-referencing chain cut short"
            );
            return Ok(None);
        }

        let related = self.make_one(&target, commit, &nested)?;
        Ok(Some(Value::from(related)))
    }

    /// Members for a many-to-many relation. A custom strategy mapped for the
    /// field must yield related instances.
    fn generate_members(
        &mut self,
        model: &ModelDef,
        field: &FieldDef,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Vec<Instance>, GenerationError> {
        let strategy = self
            .mapping
            .resolve(field)
            .ok_or_else(|| unsupported(model, field))?;
        if matches!(strategy, Strategy::MakeMany) {
            return self.make_members(model, field, commit, overrides);
        }
        match self.generate_value(model, field, commit, overrides)? {
            Some(value) => members_from_override(model, field, value),
            None => Ok(Vec::new()),
        }
    }

    fn make_members(
        &mut self,
        model: &ModelDef,
        field: &FieldDef,
        commit: bool,
        overrides: &Overrides,
    ) -> Result<Vec<Instance>, GenerationError> {
        let Some(target) = self.target_model(model, field)? else {
            return Ok(Vec::new());
        };
        if self.loops_exhausted(&target) {
            warn!(
                model = %model.label(),
                field = %field.name,
                depth = self.chain.len(),
                "self-referencing chain cut short"
            );
            return Ok(Vec::new());
        }

        let nested = overrides.nested(&field.name).cloned().unwrap_or_default();
        let mut related = Vec::with_capacity(self.many_quantity);
        for _ in 0..self.many_quantity {
            related.push(self.make_one(&target, commit, &nested)?);
        }
        debug!(
            model = %model.label(),
            field = %field.name,
            members = related.len(),
            "many-to-many members generated"
        );
        Ok(related)
    }

    fn target_model(
        &self,
        model: &ModelDef,
        field: &FieldDef,
    ) -> Result<Option<Arc<ModelDef>>, GenerationError> {
        let params = required_values("related", RELATED_REQUIRED, field)?;
        match params.get_str("model")? {
            Some(label) => self.finder.get_model(label).map(Some),
            None => Err(GenerationError::InvalidOverride {
                model: model.label(),
                field: field.name.clone(),
                message: "relation declares no target model".to_string(),
            }),
        }
    }

    fn loops_exhausted(&self, target: &ModelDef) -> bool {
        let label = target.label();
        let depth = self.chain.iter().filter(|built| **built == label).count();
        depth > self.max_self_reference_loops
    }
}

fn unsupported(model: &ModelDef, field: &FieldDef) -> GenerationError {
    GenerationError::UnsupportedFieldType {
        model: model.label(),
        field: field.name.clone(),
        field_type: field.field_type.to_string(),
    }
}

/// Members given directly for a many-to-many relation.
fn members_from_override(
    model: &ModelDef,
    field: &FieldDef,
    value: Value,
) -> Result<Vec<Instance>, GenerationError> {
    match value {
        Value::Instances(members) => Ok(members),
        Value::Instance(member) => Ok(vec![*member]),
        Value::Null => Ok(Vec::new()),
        other => Err(GenerationError::InvalidOverride {
            model: model.label(),
            field: field.name.clone(),
            message: format!("expected related instances, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classroom() -> ModelDef {
        ModelDef::new("school", "Classroom")
            .field(FieldDef::many_to_many("students", "generic.person"))
    }

    #[test]
    fn single_instance_override_becomes_one_member() {
        let model = classroom();
        let field = model.get_field("students").expect("students field");
        let member = Instance::new("generic.person", BTreeMap::new());
        let members = members_from_override(&model, field, Value::from(member.clone()))
            .expect("members");
        assert_eq!(members, vec![member]);
    }

    #[test]
    fn scalar_override_for_many_to_many_is_rejected() {
        let model = classroom();
        let field = model.get_field("students").expect("students field");
        let result = members_from_override(&model, field, Value::from("alice"));
        assert!(matches!(
            result,
            Err(GenerationError::InvalidOverride { .. })
        ));
    }

    #[test]
    fn related_requirement_reads_target_label() {
        let field = FieldDef::foreign_key("owner", "generic.person");
        assert_eq!(
            related_model(&field),
            ("model".to_string(), Value::from("generic.person"))
        );
    }
}
