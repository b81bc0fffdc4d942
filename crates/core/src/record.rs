//! The field-keyed record behind every form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Mapping from field key to value for the scalar part of a form.
///
/// A record is seeded with every field the definition declares, so the
/// key set doubles as the list of fields that may be edited.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Missing keys count as empty.
    pub fn is_empty_at(&self, key: &str) -> bool {
        self.fields.get(key).map_or(true, FieldValue::is_empty)
    }

    /// Insert or replace a value. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FormRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        FormRecord {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_blank_fields_are_empty() {
        let mut record = FormRecord::new();
        record.insert("borrowerName", FieldValue::empty_text());
        record.insert("facilityType", "Term Loan".into());

        assert!(record.is_empty_at("borrowerName"));
        assert!(record.is_empty_at("notDeclared"));
        assert!(!record.is_empty_at("facilityType"));
    }

    #[test]
    fn serializes_as_flat_object() {
        let record: FormRecord = [
            ("a".to_string(), FieldValue::from("x")),
            ("b".to_string(), FieldValue::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({"a": "x", "b": null})
        );
    }
}
