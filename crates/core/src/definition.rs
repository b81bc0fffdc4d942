//! Declarative form definitions.
//!
//! A definition is the per-form data that used to be hand-written UI code:
//! the field list, the tables and their fixed columns, the default approval
//! roles and the validation rules. Definitions are JSON files; see
//! `docs/form-definition-schema.json` for the structural schema and
//! [`crate::check`] for the semantic checks.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::approval::ApprovalRoles;
use crate::error::DefinitionError;
use crate::instance::FormInstance;
use crate::table::{DynamicTable, RowSchema};
use crate::value::FieldValue;

/// Kind of input a field renders as in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Select,
}

/// A scalar field of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    /// Choices for `select` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
    /// Heading the field is grouped under when rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl FieldSpec {
    /// Value a fresh record starts with: the declared default, else empty text.
    pub fn initial_value(&self) -> FieldValue {
        self.default.clone().unwrap_or_else(FieldValue::empty_text)
    }
}

/// A fixed column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

/// A repeating table (line items, checklist entries, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub key: String,
    pub label: String,
    pub columns: Vec<ColumnSpec>,
    /// Column whose numeric cells are summed for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_of: Option<String>,
}

impl TableSpec {
    pub fn row_schema(&self) -> RowSchema {
        RowSchema::new(self.columns.iter().map(|c| {
            (
                c.key.clone(),
                c.default.clone().unwrap_or_else(FieldValue::empty_text),
            )
        }))
    }

    pub fn column(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApprovalSpec {
    /// Role names seeded into every new instance, in order.
    #[serde(default)]
    pub default_roles: Vec<String>,
}

/// A declarative validation rule, evaluated at submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// The scalar field must be filled in.
    Required { field: String },
    /// The fixed column must be filled in on every row of the table.
    RequiredEach { table: String, column: String },
    /// Every role with this name must carry a signature, and at least one
    /// such role must exist.
    Signed { role: String },
}

/// The complete declaration of one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Form ID printed in the layout header (e.g. `FIN-INV-004`).
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub tables: Vec<TableSpec>,
    #[serde(default)]
    pub approvals: ApprovalSpec,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl FormDefinition {
    pub fn from_json_str(src: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let src = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&src)
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn table(&self, key: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.key == key)
    }

    /// Label for a field key, falling back to the key itself.
    pub fn field_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.field(key).map_or(key, |f| f.label.as_str())
    }

    /// A fresh instance seeded with defaults: every field at its initial
    /// value, every table with one seed row, the default approval roles.
    pub fn instantiate(&self) -> FormInstance {
        FormInstance {
            record: self
                .fields
                .iter()
                .map(|f| (f.key.clone(), f.initial_value()))
                .collect(),
            tables: self
                .tables
                .iter()
                .map(|t| (t.key.clone(), DynamicTable::new(t.row_schema())))
                .collect(),
            approvals: ApprovalRoles::with_names(self.approvals.default_roles.iter().cloned()),
            attachments: Vec::new(),
            custom_fields: Vec::new(),
        }
    }

    /// Read a previously serialized instance of this form.
    ///
    /// Fields and tables the definition does not declare are rejected;
    /// declared ones that are missing are seeded with defaults. Tables must
    /// keep the shape the editing operations maintain (see
    /// [`DynamicTable`]'s column registry rules).
    pub fn parse_instance(&self, json: serde_json::Value) -> Result<FormInstance, DefinitionError> {
        let mut instance: FormInstance = serde_json::from_value(json)?;

        if let Some(unknown) = instance.record.keys().find(|k| self.field(k).is_none()) {
            return Err(DefinitionError::invalid(
                unknown.clone(),
                format!("field is not declared by form '{}'", self.id),
            ));
        }
        if let Some(unknown) = instance.tables.keys().find(|k| self.table(k).is_none()) {
            return Err(DefinitionError::invalid(
                format!("tables.{}", unknown),
                format!("table is not declared by form '{}'", self.id),
            ));
        }

        for field in &self.fields {
            if !instance.record.contains(&field.key) {
                instance.record.insert(field.key.clone(), field.initial_value());
            }
        }

        let mut tables = BTreeMap::new();
        for spec in &self.tables {
            let table = match instance.tables.remove(&spec.key) {
                Some(mut table) => {
                    table.bind(&spec.key, spec.row_schema())?;
                    table
                }
                None => DynamicTable::new(spec.row_schema()),
            };
            tables.insert(spec.key.clone(), table);
        }
        instance.tables = tables;

        Ok(instance)
    }

    pub fn parse_instance_str(&self, src: &str) -> Result<FormInstance, DefinitionError> {
        self.parse_instance(serde_json::from_str(src)?)
    }
}
