use std::collections::BTreeMap;

use seedling_core::Value;

use crate::errors::GenerationError;

/// Arguments handed to a generator, copied or derived from the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    map: BTreeMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.map.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Missing and null params read as `None`.
    pub fn get_u32(&self, key: &str) -> Result<Option<u32>, GenerationError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Int(value)) => u32::try_from(*value).map(Some).map_err(|_| {
                GenerationError::InvalidParam(format!("{key} must be a non-negative integer"))
            }),
            Some(_) => Err(GenerationError::InvalidParam(format!(
                "{key} must be an integer"
            ))),
        }
    }

    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, GenerationError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Int(value)) => Ok(Some(*value)),
            Some(_) => Err(GenerationError::InvalidParam(format!(
                "{key} must be an integer"
            ))),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>, GenerationError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Text(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(GenerationError::InvalidParam(format!(
                "{key} must be a string"
            ))),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }
}
