//! Dynamic tables: ordered rows with a fixed schema plus user-added columns.
//!
//! Each table owns a [`ColumnRegistry`] of ad hoc columns shared by all of
//! its rows. Adding a column never backfills existing rows: a row's
//! `dynamicFields` map only gains the key once that cell is edited.
//! Removing a column purges the key from every row so no orphaned values
//! survive in the submitted record.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DefinitionError, FormError};
use crate::value::FieldValue;

/// Derive a column key from a user-entered label by stripping all whitespace.
///
/// `"Cost Center"` becomes `"CostCenter"`.
pub fn normalize_column_key(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

/// A user-added column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub key: String,
    pub label: String,
}

/// The ordered list of dynamic columns for one table. Keys are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDefinition>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Register a column for `label`. Rejects duplicates without touching
    /// the registry.
    pub fn register(&mut self, label: &str) -> Result<&ColumnDefinition, FormError> {
        let key = normalize_column_key(label);
        if key.is_empty() {
            return Err(FormError::EmptyColumnLabel);
        }
        if self.contains(&key) {
            return Err(FormError::DuplicateColumn { key });
        }
        self.columns.push(ColumnDefinition {
            key,
            label: label.trim().to_string(),
        });
        let last = self.columns.len() - 1;
        Ok(&self.columns[last])
    }

    pub fn unregister(&mut self, key: &str) -> Result<ColumnDefinition, FormError> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| FormError::UnknownColumn {
                key: key.to_string(),
            })?;
        Ok(self.columns.remove(pos))
    }
}

/// One row: fixed-schema fields plus values for dynamic columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub dynamic_fields: BTreeMap<String, FieldValue>,
}

/// Fixed columns of a table and the value each starts with in a new row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowSchema {
    columns: Vec<(String, FieldValue)>,
}

impl RowSchema {
    pub fn new<I, K>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        RowSchema {
            columns: columns.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    /// A fresh row with every fixed field at its default and no dynamic values.
    pub fn seed_row(&self) -> TableRow {
        TableRow {
            fields: self.columns.iter().cloned().collect(),
            dynamic_fields: BTreeMap::new(),
        }
    }
}

/// An ordered sequence of rows sharing one dynamic column registry.
///
/// Rows are appended and removed by explicit action and never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicTable {
    #[serde(skip)]
    schema: RowSchema,
    #[serde(default)]
    columns: ColumnRegistry,
    #[serde(default)]
    rows: Vec<TableRow>,
}

impl DynamicTable {
    /// Create a table holding one seed row.
    pub fn new(schema: RowSchema) -> Self {
        let rows = vec![schema.seed_row()];
        DynamicTable {
            schema,
            columns: ColumnRegistry::new(),
            rows,
        }
    }

    /// Attach the fixed schema to a deserialized table, filling fixed
    /// fields a row is missing with their defaults.
    ///
    /// Rejects any shape the editing operations could not have produced.
    pub(crate) fn bind(&mut self, table: &str, schema: RowSchema) -> Result<(), DefinitionError> {
        let mut seen = HashSet::new();
        for (i, column) in self.columns.iter().enumerate() {
            let path = format!("tables.{}.columns[{}].key", table, i);
            if column.key.is_empty() {
                return Err(DefinitionError::invalid(path, "column key must not be empty"));
            }
            if column.key.chars().any(char::is_whitespace) {
                return Err(DefinitionError::invalid(
                    path,
                    format!("column key '{}' must not contain whitespace", column.key),
                ));
            }
            if schema.contains(&column.key) {
                return Err(DefinitionError::invalid(
                    path,
                    format!("column '{}' shadows a fixed column", column.key),
                ));
            }
            if !seen.insert(column.key.as_str()) {
                return Err(DefinitionError::invalid(
                    path,
                    format!("duplicate column key '{}'", column.key),
                ));
            }
        }

        for (i, row) in self.rows.iter().enumerate() {
            if let Some(key) = row.fields.keys().find(|k| !schema.contains(k)) {
                return Err(DefinitionError::invalid(
                    format!("tables.{}.rows[{}].{}", table, i, key),
                    "column is not declared by the table",
                ));
            }
            if let Some(key) = row.dynamic_fields.keys().find(|k| !self.columns.contains(k)) {
                return Err(DefinitionError::invalid(
                    format!("tables.{}.rows[{}].dynamicFields.{}", table, i, key),
                    "no registered column holds this value",
                ));
            }
        }

        for row in &mut self.rows {
            for (key, default) in &schema.columns {
                row.fields
                    .entry(key.clone())
                    .or_insert_with(|| default.clone());
            }
        }
        self.schema = schema;
        Ok(())
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Add a dynamic column. A label that collides with a fixed column or
    /// an existing dynamic column is rejected and nothing changes.
    pub fn add_column(&mut self, label: &str) -> Result<&ColumnDefinition, FormError> {
        let key = normalize_column_key(label);
        if self.schema.contains(&key) {
            return Err(FormError::DuplicateColumn { key });
        }
        self.columns.register(label)
    }

    /// Remove a dynamic column and purge its values from every row.
    pub fn remove_column(&mut self, key: &str) -> Result<ColumnDefinition, FormError> {
        let removed = self.columns.unregister(key)?;
        for row in &mut self.rows {
            row.dynamic_fields.remove(key);
        }
        Ok(removed)
    }

    /// Append a row at defaults. Returns its index.
    pub fn add_row(&mut self) -> usize {
        self.rows.push(self.schema.seed_row());
        self.rows.len() - 1
    }

    pub fn remove_row(&mut self, index: usize) -> Result<TableRow, FormError> {
        if index >= self.rows.len() {
            return Err(FormError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Edit one cell. `key` must name a fixed column or a registered
    /// dynamic column. No validation happens until submit.
    pub fn set_cell(
        &mut self,
        index: usize,
        key: &str,
        value: FieldValue,
    ) -> Result<(), FormError> {
        let len = self.rows.len();
        let is_fixed = self.schema.contains(key);
        if !is_fixed && !self.columns.contains(key) {
            return Err(FormError::UnknownColumn {
                key: key.to_string(),
            });
        }
        let row = self
            .rows
            .get_mut(index)
            .ok_or(FormError::RowOutOfRange { index, len })?;
        if is_fixed {
            row.fields.insert(key.to_string(), value);
        } else {
            row.dynamic_fields.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Read a cell. Dynamic values are only reachable through registered
    /// columns; an unedited dynamic cell reads as `None`.
    pub fn cell(&self, index: usize, key: &str) -> Option<&FieldValue> {
        let row = self.rows.get(index)?;
        if self.schema.contains(key) {
            row.fields.get(key)
        } else if self.columns.contains(key) {
            row.dynamic_fields.get(key)
        } else {
            None
        }
    }

    /// Display-only sum of a column. Cells that do not hold a number are
    /// skipped; `None` when no cell does.
    pub fn column_total(&self, key: &str) -> Option<Decimal> {
        let mut total: Option<Decimal> = None;
        for index in 0..self.rows.len() {
            if let Some(n) = self.cell(index, key).and_then(FieldValue::as_decimal) {
                total = Some(total.unwrap_or_default() + n);
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_items() -> DynamicTable {
        DynamicTable::new(RowSchema::new([
            ("category", FieldValue::empty_text()),
            ("amount", FieldValue::empty_text()),
        ]))
    }

    #[test]
    fn normalizes_labels_by_stripping_whitespace() {
        assert_eq!(normalize_column_key("Cost Center"), "CostCenter");
        assert_eq!(normalize_column_key("  GL\tCode \n"), "GLCode");
        assert_eq!(normalize_column_key("   "), "");
    }

    #[test]
    fn starts_with_one_seed_row() {
        let table = line_items();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].fields["category"], FieldValue::empty_text());
        assert!(table.rows()[0].dynamic_fields.is_empty());
    }

    #[test]
    fn cost_center_scenario() {
        let mut table = line_items();

        let column = table.add_column("Cost Center").unwrap().clone();
        assert_eq!(
            column,
            ColumnDefinition {
                key: "CostCenter".into(),
                label: "Cost Center".into()
            }
        );
        assert_eq!(table.columns().len(), 1);

        let second = table.add_row();
        assert_eq!(second, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "CostCenter"), None);
        assert_eq!(table.cell(1, "CostCenter"), None);

        table.set_cell(1, "CostCenter", "CC-100".into()).unwrap();
        assert_eq!(table.cell(0, "CostCenter"), None);
        assert_eq!(table.cell(1, "CostCenter"), Some(&"CC-100".into()));
    }

    #[test]
    fn duplicate_column_leaves_table_untouched() {
        let mut table = line_items();
        table.add_column("Cost Center").unwrap();
        table.set_cell(0, "CostCenter", "CC-1".into()).unwrap();
        let before = table.clone();

        let err = table.add_column("CostCenter").unwrap_err();
        assert_eq!(
            err,
            FormError::DuplicateColumn {
                key: "CostCenter".into()
            }
        );
        assert_eq!(table, before);

        let err = table.add_column(" Cost  Center ").unwrap_err();
        assert!(matches!(err, FormError::DuplicateColumn { .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn column_may_not_shadow_fixed_field() {
        let mut table = line_items();
        let err = table.add_column("amount").unwrap_err();
        assert!(matches!(err, FormError::DuplicateColumn { key } if key == "amount"));
        assert!(table.columns().is_empty());
    }

    #[test]
    fn empty_label_is_rejected() {
        let mut table = line_items();
        assert_eq!(table.add_column("  ").unwrap_err(), FormError::EmptyColumnLabel);
        assert!(table.columns().is_empty());
    }

    #[test]
    fn remove_column_purges_row_values() {
        let mut table = line_items();
        table.add_column("Cost Center").unwrap();
        table.add_column("Project").unwrap();
        table.set_cell(0, "CostCenter", "CC-1".into()).unwrap();
        table.set_cell(0, "Project", "P-9".into()).unwrap();

        let removed = table.remove_column("CostCenter").unwrap();
        assert_eq!(removed.label, "Cost Center");
        assert!(!table.rows()[0].dynamic_fields.contains_key("CostCenter"));
        assert_eq!(table.rows()[0].dynamic_fields["Project"], "P-9".into());

        assert!(matches!(
            table.remove_column("CostCenter"),
            Err(FormError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn remove_row_keeps_other_rows_in_order() {
        let mut table = line_items();
        table.add_row();
        table.add_row();
        for (i, cat) in ["travel", "meals", "lodging"].iter().enumerate() {
            table.set_cell(i, "category", (*cat).into()).unwrap();
        }

        let removed = table.remove_row(1).unwrap();
        assert_eq!(removed.fields["category"], "meals".into());
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "category"), Some(&"travel".into()));
        assert_eq!(table.cell(1, "category"), Some(&"lodging".into()));

        assert_eq!(
            table.remove_row(2).unwrap_err(),
            FormError::RowOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn set_cell_rejects_unregistered_column() {
        let mut table = line_items();
        let before = table.clone();
        assert!(matches!(
            table.set_cell(0, "Nope", "x".into()),
            Err(FormError::UnknownColumn { .. })
        ));
        assert!(matches!(
            table.set_cell(5, "category", "x".into()),
            Err(FormError::RowOutOfRange { index: 5, len: 1 })
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn column_total_skips_non_numeric_cells() {
        let mut table = line_items();
        table.add_row();
        table.add_row();
        table.set_cell(0, "amount", "100.25".into()).unwrap();
        table.set_cell(1, "amount", FieldValue::from(50i64)).unwrap();
        table.set_cell(2, "amount", "tbd".into()).unwrap();

        assert_eq!(table.column_total("amount"), Some(Decimal::new(15025, 2)));
        assert_eq!(table.column_total("category"), None);
    }

    #[test]
    fn row_json_carries_dynamic_fields() {
        let mut table = line_items();
        table.add_column("Cost Center").unwrap();
        table.set_cell(0, "CostCenter", "CC-100".into()).unwrap();

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "columns": [{"key": "CostCenter", "label": "Cost Center"}],
                "rows": [{
                    "amount": "",
                    "category": "",
                    "dynamicFields": {"CostCenter": "CC-100"}
                }]
            })
        );
    }
}
