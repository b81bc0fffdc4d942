//! One in-memory form instance and the edits it supports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::approval::ApprovalRoles;
use crate::error::FormError;
use crate::record::FormRecord;
use crate::session::FormCommand;
use crate::table::DynamicTable;
use crate::value::FieldValue;

/// A file attached to the form, referenced by name and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A free-form label/value pair added by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub label: String,
    #[serde(default)]
    pub value: FieldValue,
}

/// The complete state of one form: the value handed to the submission
/// store once the validation gate passes.
///
/// Serialized shape: scalar fields at the top level, then `tables`,
/// `approvals`, `attachments` and `customFields`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInstance {
    #[serde(flatten)]
    pub record: FormRecord,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tables: BTreeMap<String, DynamicTable>,
    #[serde(default)]
    pub approvals: ApprovalRoles,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl FormInstance {
    /// Set a declared scalar field.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), FormError> {
        if !self.record.contains(key) {
            return Err(FormError::UnknownField {
                key: key.to_string(),
            });
        }
        self.record.insert(key, value);
        Ok(())
    }

    pub fn table(&self, key: &str) -> Result<&DynamicTable, FormError> {
        self.tables.get(key).ok_or_else(|| FormError::UnknownTable {
            key: key.to_string(),
        })
    }

    pub fn table_mut(&mut self, key: &str) -> Result<&mut DynamicTable, FormError> {
        self.tables
            .get_mut(key)
            .ok_or_else(|| FormError::UnknownTable {
                key: key.to_string(),
            })
    }

    pub fn add_attachment(&mut self, attachment: Attachment) -> usize {
        self.attachments.push(attachment);
        self.attachments.len() - 1
    }

    pub fn remove_attachment(&mut self, index: usize) -> Result<Attachment, FormError> {
        if index >= self.attachments.len() {
            return Err(FormError::AttachmentOutOfRange {
                index,
                len: self.attachments.len(),
            });
        }
        Ok(self.attachments.remove(index))
    }

    pub fn add_custom_field(&mut self, label: impl Into<String>, value: FieldValue) -> usize {
        self.custom_fields.push(CustomField {
            label: label.into(),
            value,
        });
        self.custom_fields.len() - 1
    }

    pub fn set_custom_field(&mut self, index: usize, value: FieldValue) -> Result<(), FormError> {
        let len = self.custom_fields.len();
        let field = self
            .custom_fields
            .get_mut(index)
            .ok_or(FormError::CustomFieldOutOfRange { index, len })?;
        field.value = value;
        Ok(())
    }

    pub fn remove_custom_field(&mut self, index: usize) -> Result<CustomField, FormError> {
        if index >= self.custom_fields.len() {
            return Err(FormError::CustomFieldOutOfRange {
                index,
                len: self.custom_fields.len(),
            });
        }
        Ok(self.custom_fields.remove(index))
    }

    /// Apply one user edit. Each command is checked before anything is
    /// written, so a failed command leaves the instance unchanged.
    pub fn apply(&mut self, command: FormCommand) -> Result<(), FormError> {
        match command {
            FormCommand::SetField { field, value } => self.set_field(&field, value),
            FormCommand::AddColumn { table, label } => {
                self.table_mut(&table)?.add_column(&label).map(|_| ())
            }
            FormCommand::RemoveColumn { table, key } => {
                self.table_mut(&table)?.remove_column(&key).map(|_| ())
            }
            FormCommand::AddRow { table } => {
                self.table_mut(&table)?.add_row();
                Ok(())
            }
            FormCommand::RemoveRow { table, index } => {
                self.table_mut(&table)?.remove_row(index).map(|_| ())
            }
            FormCommand::SetCell {
                table,
                index,
                column,
                value,
            } => self.table_mut(&table)?.set_cell(index, &column, value),
            FormCommand::AddRole => {
                self.approvals.add_role();
                Ok(())
            }
            FormCommand::RemoveRole { index } => self.approvals.remove_role(index).map(|_| ()),
            FormCommand::RenameRole { index, name } => self.approvals.rename_role(index, name),
            FormCommand::SetSignature { index, signature } => {
                self.approvals.set_signature(index, signature)
            }
            FormCommand::ClearSignature { index } => self.approvals.clear_signature(index),
            FormCommand::AddAttachment { attachment } => {
                self.add_attachment(attachment);
                Ok(())
            }
            FormCommand::RemoveAttachment { index } => self.remove_attachment(index).map(|_| ()),
            FormCommand::AddCustomField { label, value } => {
                self.add_custom_field(label, value);
                Ok(())
            }
            FormCommand::SetCustomField { index, value } => self.set_custom_field(index, value),
            FormCommand::RemoveCustomField { index } => {
                self.remove_custom_field(index).map(|_| ())
            }
        }
    }
}
