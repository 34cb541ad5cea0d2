//! Caller-supplied field values.
//!
//! Flat keys such as `owner__name` are parsed once into a tree: the part
//! before the first `__` names a field of the model being built, the rest is
//! an override for the related model reached through that field.

use std::collections::BTreeMap;

use seedling_core::Value;

/// Separator between a relation field and an attribute of its target.
pub const PATH_SEPARATOR: &str = "__";

/// Override for one field: a direct value, nested overrides for the related
/// model, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOverride {
    pub value: Option<Value>,
    pub nested: Overrides,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    entries: BTreeMap<String, FieldOverride>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Overrides::insert`].
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Attaches a whole override tree under a relation field.
    pub fn nest(mut self, field: &str, nested: Overrides) -> Self {
        self.entries
            .entry(field.to_string())
            .or_default()
            .nested
            .merge(nested);
        self
    }

    /// Inserts `value` at a possibly nested `key`.
    pub fn insert(&mut self, key: &str, value: Value) {
        match key.split_once(PATH_SEPARATOR) {
            Some((field, rest)) => self
                .entries
                .entry(field.to_string())
                .or_default()
                .nested
                .insert(rest, value),
            None => self.entries.entry(key.to_string()).or_default().value = Some(value),
        }
    }

    /// Overlays `other`; its values win on conflicts.
    pub fn merge(&mut self, other: Overrides) {
        for (field, incoming) in other.entries {
            let entry = self.entries.entry(field).or_default();
            if incoming.value.is_some() {
                entry.value = incoming.value;
            }
            entry.nested.merge(incoming.nested);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldOverride> {
        self.entries.get(field)
    }

    /// Fields with a direct value and the value itself.
    pub fn direct(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(field, entry)| entry.value.as_ref().map(|value| (field.as_str(), value)))
    }

    pub fn direct_value(&self, field: &str) -> Option<&Value> {
        self.entries.get(field).and_then(|entry| entry.value.as_ref())
    }

    pub fn has_nested(&self, field: &str) -> bool {
        self.entries
            .get(field)
            .is_some_and(|entry| !entry.nested.is_empty())
    }

    pub fn nested(&self, field: &str) -> Option<&Overrides> {
        self.entries
            .get(field)
            .map(|entry| &entry.nested)
            .filter(|nested| !nested.is_empty())
    }

    /// Overrides handed to the related build of relation `field`.
    ///
    /// The field's own nested overrides, one level down, plus the nested
    /// overrides of every other relation passed through unchanged so paths
    /// spanning several hops keep reaching their target.
    pub fn for_relation(&self, field: &str) -> Overrides {
        let mut related = Overrides::new();
        for (name, entry) in &self.entries {
            if name != field && !entry.nested.is_empty() {
                related.entries.insert(
                    name.clone(),
                    FieldOverride {
                        value: None,
                        nested: entry.nested.clone(),
                    },
                );
            }
        }
        if let Some(nested) = self.nested(field) {
            related.merge(nested.clone());
        }
        related
    }

    /// Flattens back to `relation__field` keys.
    pub fn to_pairs(&self) -> Vec<(String, Value)> {
        let mut pairs = Vec::new();
        for (field, entry) in &self.entries {
            if let Some(value) = &entry.value {
                pairs.push((field.clone(), value.clone()));
            }
            for (key, value) in entry.nested.to_pairs() {
                pairs.push((format!("{field}{PATH_SEPARATOR}{key}"), value));
            }
        }
        pairs
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut overrides = Overrides::new();
        for (key, value) in iter {
            overrides.insert(key.as_ref(), value);
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_direct_and_nested_keys() {
        let overrides = Overrides::new()
            .set("name", "Rex")
            .set("owner__name", "Ana")
            .set("owner__address__city", "Recife");

        assert_eq!(overrides.direct_value("name"), Some(&Value::from("Rex")));
        assert!(!overrides.has_nested("name"));
        assert!(overrides.has_nested("owner"));
        assert_eq!(overrides.direct_value("owner"), None);

        let owner = overrides.nested("owner").expect("owner overrides");
        assert_eq!(owner.direct_value("name"), Some(&Value::from("Ana")));
        let address = owner.nested("address").expect("address overrides");
        assert_eq!(address.direct_value("city"), Some(&Value::from("Recife")));
    }

    #[test]
    fn relation_overrides_strip_one_level_and_pass_siblings_through() {
        let overrides = Overrides::new()
            .set("breed", "beagle")
            .set("owner__name", "Ana")
            .set("vet__clinic__name", "Pets");

        let related = overrides.for_relation("owner");
        assert_eq!(related.direct_value("name"), Some(&Value::from("Ana")));
        assert!(!related.contains("breed"));
        assert!(!related.contains("owner"));
        let vet = related.nested("vet").expect("vet passed through");
        assert!(vet.has_nested("clinic"));
    }

    #[test]
    fn own_nested_overrides_win_over_passed_through_siblings() {
        let overrides = Overrides::new()
            .set("owner__vet__name", "mine")
            .set("vet__name", "sibling");

        let related = overrides.for_relation("owner");
        let vet = related.nested("vet").expect("vet overrides");
        assert_eq!(vet.direct_value("name"), Some(&Value::from("mine")));
    }

    #[test]
    fn merge_prefers_incoming_values() {
        let mut base = Overrides::new().set("name", "John Doe").set("age", 18);
        base.merge(Overrides::new().set("name", "Jane").set("owner__name", "x"));

        assert_eq!(base.direct_value("name"), Some(&Value::from("Jane")));
        assert_eq!(base.direct_value("age"), Some(&Value::Int(18)));
        assert!(base.has_nested("owner"));
    }

    #[test]
    fn collects_from_flat_pairs() {
        let overrides: Overrides = [
            ("owner__name", Value::from("Rex's Owner")),
            ("name", Value::from("Rex")),
        ]
        .into_iter()
        .collect();

        let mut pairs = overrides.to_pairs();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), Value::from("Rex")),
                ("owner__name".to_string(), Value::from("Rex's Owner")),
            ]
        );
    }
}
