use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{Instance, Value};

/// Label of the polymorphic-type registry model targeted by generic relations.
pub const CONTENT_TYPE_MODEL: &str = "contenttypes.contenttype";

/// Closed set of field kinds understood by the factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Auto,
    BigAuto,
    Boolean,
    Integer,
    BigInteger,
    SmallInteger,
    PositiveInteger,
    PositiveSmallInteger,
    Float,
    Decimal,
    Char,
    Text,
    Slug,
    Url,
    Email,
    Uuid,
    Date,
    DateTime,
    Time,
    File,
    Image,
    /// Single-valued relation owned by this model.
    ForeignKey,
    /// Single-valued relation with exclusive pairing.
    OneToOne,
    /// Multi-valued relation backed by a join table.
    ManyToMany,
    /// Virtual multi-valued relation without a concrete join.
    GenericRelation,
    /// Field kind declared by the schema but unknown to the factory.
    Other(String),
}

impl FieldType {
    /// Identity columns filled in by the persistence layer.
    pub fn is_auto(&self) -> bool {
        matches!(self, FieldType::Auto | FieldType::BigAuto)
    }

    /// Single-valued relations (foreign key and one-to-one).
    pub fn is_relation(&self) -> bool {
        matches!(self, FieldType::ForeignKey | FieldType::OneToOne)
    }

    /// Multi-valued relations, stored apart from the concrete fields.
    pub fn is_many(&self) -> bool {
        matches!(self, FieldType::ManyToMany | FieldType::GenericRelation)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Auto => "auto",
            FieldType::BigAuto => "big_auto",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::BigInteger => "big_integer",
            FieldType::SmallInteger => "small_integer",
            FieldType::PositiveInteger => "positive_integer",
            FieldType::PositiveSmallInteger => "positive_small_integer",
            FieldType::Float => "float",
            FieldType::Decimal => "decimal",
            FieldType::Char => "char",
            FieldType::Text => "text",
            FieldType::Slug => "slug",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::Uuid => "uuid",
            FieldType::Date => "date",
            FieldType::DateTime => "date_time",
            FieldType::Time => "time",
            FieldType::File => "file",
            FieldType::Image => "image",
            FieldType::ForeignKey => "foreign_key",
            FieldType::OneToOne => "one_to_one",
            FieldType::ManyToMany => "many_to_many",
            FieldType::GenericRelation => "generic_relation",
            FieldType::Other(name) => name,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field metadata for one attribute of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub null: bool,
    #[serde(default)]
    pub blank: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values, in declaration order. Empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
    /// Qualified label (`app.model`) of the relation target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_model: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            null: false,
            blank: false,
            default: None,
            choices: Vec::new(),
            max_length: None,
            max_digits: None,
            decimal_places: None,
            related_model: None,
        }
    }

    pub fn char(name: impl Into<String>, max_length: u32) -> Self {
        Self::new(name, FieldType::Char).with_max_length(max_length)
    }

    pub fn foreign_key(name: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(name, FieldType::ForeignKey).related_to(to)
    }

    pub fn one_to_one(name: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(name, FieldType::OneToOne).related_to(to)
    }

    pub fn many_to_many(name: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(name, FieldType::ManyToMany).related_to(to)
    }

    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    pub fn blank_allowed(mut self) -> Self {
        self.blank = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_decimal(mut self, max_digits: u32, decimal_places: u32) -> Self {
        self.max_digits = Some(max_digits);
        self.decimal_places = Some(decimal_places);
        self
    }

    pub fn related_to(mut self, to: impl Into<String>) -> Self {
        self.related_model = Some(to.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Reads a declared attribute by name.
    ///
    /// Returns `None` when `name` is not an attribute fields carry, and
    /// `Some(Value::Null)` when the attribute exists but is unset.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let value = match name {
            "name" => Value::Text(self.name.clone()),
            "null" => Value::Bool(self.null),
            "blank" => Value::Bool(self.blank),
            "default" => self.default.clone().unwrap_or(Value::Null),
            "max_length" => optional_u32(self.max_length),
            "max_digits" => optional_u32(self.max_digits),
            "decimal_places" => optional_u32(self.decimal_places),
            "related_model" => self
                .related_model
                .clone()
                .map(Value::Text)
                .unwrap_or(Value::Null),
            _ => return None,
        };
        Some(value)
    }
}

fn optional_u32(value: Option<u32>) -> Value {
    value.map(|value| Value::Int(i64::from(value))).unwrap_or(Value::Null)
}

/// A model definition: concrete fields in declared order plus
/// multi-valued relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    pub app_label: String,
    pub name: String,
    pub fields: Vec<FieldDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub many_to_many: Vec<FieldDef>,
}

impl ModelDef {
    pub fn new(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            name: name.into(),
            fields: Vec::new(),
            many_to_many: Vec::new(),
        }
    }

    /// Appends a field, routing multi-valued relations to `many_to_many`.
    pub fn field(mut self, field: FieldDef) -> Self {
        if field.field_type.is_many() {
            self.many_to_many.push(field);
        } else {
            self.fields.push(field);
        }
        self
    }

    /// Lowercased model name used for lookups.
    pub fn model_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Qualified label in the form `app.model`.
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name())
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .chain(self.many_to_many.iter())
            .find(|field| field.name == name)
    }

    /// Builds an unsaved instance from a field-name → value mapping.
    ///
    /// Fields missing from `values` take their declared default, or null.
    /// Multi-valued relations cannot be assigned here.
    pub fn instantiate(&self, mut values: BTreeMap<String, Value>) -> Result<Instance> {
        if let Some(name) = values
            .keys()
            .find(|name| !self.fields.iter().any(|field| &field.name == *name))
        {
            return Err(Error::UnknownField {
                model: self.label(),
                field: name.clone(),
            });
        }

        let mut fields = BTreeMap::new();
        for field in &self.fields {
            let value = values
                .remove(&field.name)
                .or_else(|| field.default.clone())
                .unwrap_or(Value::Null);
            fields.insert(field.name.clone(), value);
        }

        Ok(Instance::new(self.label(), fields))
    }
}
