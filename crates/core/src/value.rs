//! Field values stored in form records and table cells.
//!
//! Values keep the plain JSON shape of the submitted record: a text input
//! is a JSON string, a number input a JSON number, and so on. Dates are
//! carried as text in `YYYY-MM-DD` form, exactly as the date input emits
//! them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single value held by a form field or table cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<FieldValue>),
    Record(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// The empty text value new inputs start with.
    pub fn empty_text() -> Self {
        FieldValue::Text(String::new())
    }

    /// True when the value counts as "not filled in" for required checks.
    ///
    /// Whitespace-only text is empty. Numbers and booleans never are,
    /// so `0` and `false` satisfy a required rule.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Record(map) => map.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used for display totals. Text cells holding a number
    /// (as typed into an input) are accepted.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => parse_decimal(&n.to_string()),
            FieldValue::Text(s) => parse_decimal(s.trim()),
            _ => None,
        }
    }

    /// Plain text for static (print) rendering. Empty values render as "".
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::display_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Record(map) => map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v.display_text()))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::from("   ").is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::from(0i64).is_empty());
        assert!(!FieldValue::from(false).is_empty());
        assert!(!FieldValue::from("x").is_empty());
    }

    #[test]
    fn json_shape_is_plain() {
        let v: FieldValue = serde_json::from_str(r#"{"a": [1, "two", null]}"#).unwrap();
        let FieldValue::Record(map) = &v else {
            panic!("expected record, got {:?}", v);
        };
        assert_eq!(
            map["a"],
            FieldValue::List(vec![FieldValue::from(1i64), "two".into(), FieldValue::Null])
        );
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            serde_json::json!({"a": [1, "two", null]})
        );
    }

    #[test]
    fn decimal_view_accepts_typed_text() {
        assert_eq!(
            FieldValue::from("12.50").as_decimal(),
            Some(Decimal::new(1250, 2))
        );
        assert_eq!(FieldValue::from(3i64).as_decimal(), Some(Decimal::from(3)));
        assert_eq!(FieldValue::from("n/a").as_decimal(), None);
        assert_eq!(FieldValue::empty_text().as_decimal(), None);
    }
}
