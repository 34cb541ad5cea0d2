use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use seedling_core::{CONTENT_TYPE_MODEL, FieldDef, FieldType};

use crate::generators::primitives::{self, ContentTypeGenerator, FromChoices};
use crate::generators::Generator;

/// How a field without an override gets its value.
#[derive(Clone)]
pub enum Strategy {
    /// Call a value generator.
    Generate(Arc<dyn Generator>),
    /// Build one instance of the related model, persisting it when the
    /// outer call persists.
    MakeRelated,
    /// Build a batch of related instances for a many-to-many relation.
    MakeMany,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Generate(generator) => {
                f.debug_tuple("Generate").field(&generator.id()).finish()
            }
            Strategy::MakeRelated => f.write_str("MakeRelated"),
            Strategy::MakeMany => f.write_str("MakeMany"),
        }
    }
}

pub type TypeTable = HashMap<FieldType, Strategy>;

/// Process-wide default field type → strategy table.
pub fn default_type_table() -> &'static TypeTable {
    static TABLE: OnceLock<TypeTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = TypeTable::new();
        primitives::register(&mut table);
        table.insert(FieldType::ForeignKey, Strategy::MakeRelated);
        table.insert(FieldType::OneToOne, Strategy::MakeRelated);
        table.insert(FieldType::ManyToMany, Strategy::MakeMany);
        table
    })
}

/// Generator configuration owned by a builder: the default type table plus
/// per-type and per-attribute-name overrides.
#[derive(Clone, Default)]
pub struct GeneratorMapping {
    types: TypeTable,
    attrs: HashMap<String, Arc<dyn Generator>>,
    content_type: Option<Arc<dyn Generator>>,
}

impl GeneratorMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, field_type: FieldType, strategy: Strategy) -> Self {
        self.types.insert(field_type, strategy);
        self
    }

    pub fn with_type_generator(self, field_type: FieldType, generator: Arc<dyn Generator>) -> Self {
        self.with_type(field_type, Strategy::Generate(generator))
    }

    /// Generator used for every field with this name, whatever its type.
    pub fn with_attr(mut self, name: impl Into<String>, generator: Arc<dyn Generator>) -> Self {
        self.attrs.insert(name.into(), generator);
        self
    }

    pub fn with_content_type(mut self, generator: Arc<dyn Generator>) -> Self {
        self.content_type = Some(generator);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&Arc<dyn Generator>> {
        self.attrs.get(name)
    }

    pub fn strategy(&self, field_type: &FieldType) -> Option<&Strategy> {
        self.types
            .get(field_type)
            .or_else(|| default_type_table().get(field_type))
    }

    pub fn content_type(&self) -> Arc<dyn Generator> {
        self.content_type
            .clone()
            .unwrap_or_else(|| Arc::new(ContentTypeGenerator))
    }

    /// Picks the strategy for `field`, first match wins:
    /// attribute-name override, declared choices, content-type foreign key,
    /// then the type table. `None` means the type is unsupported.
    pub fn resolve(&self, field: &FieldDef) -> Option<Strategy> {
        if let Some(generator) = self.attr(&field.name) {
            return Some(Strategy::Generate(Arc::clone(generator)));
        }
        if !field.choices.is_empty() {
            return Some(Strategy::Generate(Arc::new(FromChoices::new(
                field.choices.clone(),
            ))));
        }
        if field.field_type == FieldType::ForeignKey
            && field.related_model.as_deref() == Some(CONTENT_TYPE_MODEL)
        {
            return Some(Strategy::Generate(self.content_type()));
        }
        self.strategy(&field.field_type).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::constant;

    fn generator_id(strategy: Option<Strategy>) -> Option<&'static str> {
        match strategy {
            Some(Strategy::Generate(generator)) => Some(generator.id()),
            _ => None,
        }
    }

    #[test]
    fn attribute_override_beats_choices_and_type() {
        let mapping = GeneratorMapping::new().with_attr("gender", constant("X"));
        let field = FieldDef::char("gender", 1).with_choices(["M", "F"]);
        assert_eq!(generator_id(mapping.resolve(&field)), Some("constant"));
    }

    #[test]
    fn choices_beat_type_table() {
        let field = FieldDef::char("gender", 1).with_choices(["M", "F"]);
        assert_eq!(generator_id(GeneratorMapping::new().resolve(&field)), Some("choices"));
    }

    #[test]
    fn content_type_foreign_key_uses_registry_generator() {
        let field = FieldDef::foreign_key("content_type", CONTENT_TYPE_MODEL);
        assert_eq!(
            generator_id(GeneratorMapping::new().resolve(&field)),
            Some("content_type")
        );
    }

    #[test]
    fn relations_map_to_builder_strategies() {
        let mapping = GeneratorMapping::new();
        let fk = FieldDef::foreign_key("owner", "generic.person");
        let m2m = FieldDef::many_to_many("friends", "generic.person");
        assert!(matches!(mapping.resolve(&fk), Some(Strategy::MakeRelated)));
        assert!(matches!(mapping.resolve(&m2m), Some(Strategy::MakeMany)));
    }

    #[test]
    fn type_override_replaces_default() {
        let mapping =
            GeneratorMapping::new().with_type_generator(FieldType::Char, constant("fixed"));
        let field = FieldDef::char("name", 10);
        assert_eq!(generator_id(mapping.resolve(&field)), Some("constant"));
        let other = GeneratorMapping::new();
        assert_eq!(generator_id(other.resolve(&field)), Some("string"));
    }

    #[test]
    fn unknown_kinds_are_unresolved() {
        let field = FieldDef::new("ip", FieldType::Other("ip_address".to_string()));
        assert!(GeneratorMapping::new().resolve(&field).is_none());
    }
}
