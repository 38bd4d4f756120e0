//! Field values supplied for a template's placeholders.

use serde_json::Value;

use crate::error::{FillError, Result};

/// The value for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Markdown text, rendered line by line.
    Scalar(String),
    /// Items forced into a bullet list; only inline markdown applies.
    ItemList(Vec<String>),
    /// Rows of cells; row 0 is the header. Rows may differ in length.
    Table(Vec<Vec<String>>),
}

impl FieldValue {
    /// Interpret a JSON value, stringifying anything that isn't text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) if items.iter().any(Value::is_array) => {
                FieldValue::Table(items.iter().map(table_row).collect())
            }
            Value::Array(items) => FieldValue::ItemList(
                items
                    .iter()
                    .filter(|item| !is_falsy(item))
                    .map(stringify)
                    .collect(),
            ),
            other => FieldValue::Scalar(stringify(other)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Scalar(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Scalar(text)
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A row that isn't an array becomes a single cell holding its text.
fn table_row(row: &Value) -> Vec<String> {
    match row {
        Value::Array(cells) => cells.iter().map(stringify).collect(),
        other => vec![stringify(other)],
    }
}

/// Named field values in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `name: value` pairs, keeping key order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(FillError::InvalidFields {
                message: format!("expected a JSON object of fields, found {}", json_kind(value)),
            });
        };
        Ok(Self {
            entries: map
                .iter()
                .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
                .collect(),
        })
    }

    /// Add a field, replacing the value of an existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter().position(|(existing, _)| *existing == name) {
            Some(at) => self.entries[at].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_stringified() {
        assert_eq!(FieldValue::from_json(&json!("text")), FieldValue::from("text"));
        assert_eq!(FieldValue::from_json(&json!(42)), FieldValue::from("42"));
        assert_eq!(FieldValue::from_json(&json!(true)), FieldValue::from("true"));
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::from(""));
        assert_eq!(
            FieldValue::from_json(&json!({"a": 1})),
            FieldValue::Scalar("{\"a\":1}".to_string())
        );
    }

    #[test]
    fn item_lists_drop_falsy_entries() {
        assert_eq!(
            FieldValue::from_json(&json!(["Risk A", "", "Risk B", null, false, 0])),
            FieldValue::ItemList(vec![
                "Risk A".to_string(),
                "Risk B".to_string(),
                "0".to_string()
            ])
        );
    }

    #[test]
    fn nested_arrays_are_tables() {
        assert_eq!(
            FieldValue::from_json(&json!([["Item", "Cost"], ["Widget", 5, null], "loose"])),
            FieldValue::Table(vec![
                vec!["Item".to_string(), "Cost".to_string()],
                vec!["Widget".to_string(), "5".to_string(), String::new()],
                vec!["loose".to_string()],
            ])
        );
    }

    #[test]
    fn fields_keep_declaration_order() {
        let fields = Fields::from_json_str(r#"{"zeta": "z", "alpha": ["a"], "mid": 1}"#).unwrap();
        let names: Vec<_> = fields.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            fields.get("alpha"),
            Some(&FieldValue::ItemList(vec!["a".to_string()]))
        );
    }

    #[test]
    fn non_object_input_is_rejected() {
        let err = Fields::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, FillError::InvalidFields { .. }));
        assert!(err.to_string().contains("an array"));

        let err = Fields::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, FillError::Json(_)));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut fields = Fields::new();
        assert!(fields.is_empty());
        fields.insert("a", "1");
        fields.insert("b", "2");
        fields.insert("a", "3");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("a"), Some(&FieldValue::from("3")));
        assert_eq!(fields.iter().next().map(|(name, _)| name), Some("a"));
    }
}
