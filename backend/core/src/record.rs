//! Complete and partial field records.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::field::{FieldName, FIELD_COUNT};

/// A complete record: every one of the 12 fields has a value.
///
/// A value is either empty ("not known") or a non-empty trimmed string.
/// All writes go through [`FieldRecord::set`], which trims, so the invariant
/// cannot be broken from outside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    values: [String; FIELD_COUNT],
}

impl FieldRecord {
    /// An all-empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldName) -> &str {
        &self.values[field.index()]
    }

    /// Set a field, trimming the value. Returns `true` if the stored value changed.
    pub fn set(&mut self, field: FieldName, value: impl AsRef<str>) -> bool {
        let value = value.as_ref().trim();
        let slot = &mut self.values[field.index()];
        if slot == value {
            return false;
        }
        *slot = value.to_string();
        true
    }

    /// Reset a field to empty. Returns `true` if it held a value.
    pub fn clear(&mut self, field: FieldName) -> bool {
        self.set(field, "")
    }

    /// Iterate all fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        FieldName::ALL
            .iter()
            .map(move |f| (*f, self.values[f.index()].as_str()))
    }

    /// Number of fields holding a non-empty value.
    pub fn populated_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_empty()).count()
    }

    pub fn is_blank(&self) -> bool {
        self.populated_count() == 0
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldRecord {
    /// Missing keys deserialize as empty; unknown keys are rejected.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<FieldName, String>::deserialize(deserializer)?;
        let mut record = FieldRecord::new();
        for (field, value) in raw {
            record.set(field, value);
        }
        Ok(record)
    }
}

/// The result of one extraction attempt: any subset of the 12 fields.
///
/// An absent key means "leave unchanged". Values are always non-empty and
/// trimmed; inserting an empty value is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    values: BTreeMap<FieldName, String>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Empty (after trim) values are ignored; returns whether
    /// the value was kept.
    pub fn insert(&mut self, field: FieldName, value: impl AsRef<str>) -> bool {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return false;
        }
        self.values.insert(field, value.to_string());
        true
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.values.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fields present, in form order.
    pub fn fields(&self) -> Vec<FieldName> {
        self.values.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

impl FromIterator<(FieldName, String)> for PartialRecord {
    fn from_iter<I: IntoIterator<Item = (FieldName, String)>>(iter: I) -> Self {
        let mut partial = PartialRecord::new();
        for (field, value) in iter {
            partial.insert(field, value);
        }
        partial
    }
}

impl Serialize for PartialRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PartialRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<FieldName, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
