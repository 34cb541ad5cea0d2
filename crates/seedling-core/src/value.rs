use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A field value, either caller-supplied or generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Fixed-point number kept in its textual form (e.g. `"123.45"`).
    Decimal(String),
    Uuid(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    /// Path of a fixture file.
    File(String),
    /// Label of a model picked from the polymorphic-type registry.
    ContentType(String),
    Instance(Box<Instance>),
    Instances(Vec<Instance>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value)
            | Value::Decimal(value)
            | Value::Uuid(value)
            | Value::File(value)
            | Value::ContentType(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_instances(&self) -> Option<&[Instance]> {
        match self {
            Value::Instances(instances) => Some(instances),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Instance(Box::new(value))
    }
}

impl From<Vec<Instance>> for Value {
    fn from(value: Vec<Instance>) -> Self {
        Value::Instances(value)
    }
}

/// A built model instance.
///
/// `pk` is assigned by the store on save. `many_to_many` holds the members
/// attached after saving, or the pending members of an unsaved instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub model: String,
    pub pk: Option<i64>,
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub many_to_many: BTreeMap<String, Vec<Instance>>,
}

impl Instance {
    pub fn new(model: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        Self {
            model: model.into(),
            pk: None,
            fields,
            many_to_many: BTreeMap::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.pk.is_some()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Related instance stored under a single-valued relation field.
    pub fn related(&self, field: &str) -> Option<&Instance> {
        self.get(field).and_then(Value::as_instance)
    }

    /// Members of a multi-valued relation; empty when none were attached.
    pub fn members(&self, relation: &str) -> &[Instance] {
        self.many_to_many
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
