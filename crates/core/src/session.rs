//! Editing sessions: an instance, its definition and the current mode.
//!
//! Every user interaction arrives as a [`FormCommand`]. Commands are plain
//! data so they can be replayed from a file or posted over HTTP.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::approval::SignaturePayload;
use crate::definition::FormDefinition;
use crate::error::FormError;
use crate::instance::{Attachment, FormInstance};
use crate::render::{render, Presentation, RenderMode};
use crate::validate::{prepare_submission, validate, ValidationReport};
use crate::value::FieldValue;

/// One user edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FormCommand {
    SetField {
        field: String,
        value: FieldValue,
    },
    AddColumn {
        table: String,
        label: String,
    },
    RemoveColumn {
        table: String,
        key: String,
    },
    AddRow {
        table: String,
    },
    RemoveRow {
        table: String,
        index: usize,
    },
    SetCell {
        table: String,
        index: usize,
        column: String,
        value: FieldValue,
    },
    AddRole,
    RemoveRole {
        index: usize,
    },
    RenameRole {
        index: usize,
        name: String,
    },
    SetSignature {
        index: usize,
        signature: SignaturePayload,
    },
    ClearSignature {
        index: usize,
    },
    AddAttachment {
        attachment: Attachment,
    },
    RemoveAttachment {
        index: usize,
    },
    AddCustomField {
        label: String,
        #[serde(default)]
        value: FieldValue,
    },
    SetCustomField {
        index: usize,
        value: FieldValue,
    },
    RemoveCustomField {
        index: usize,
    },
}

impl FormCommand {
    /// Short operation name, as it appears in the `op` tag.
    pub fn op(&self) -> &'static str {
        match self {
            FormCommand::SetField { .. } => "set_field",
            FormCommand::AddColumn { .. } => "add_column",
            FormCommand::RemoveColumn { .. } => "remove_column",
            FormCommand::AddRow { .. } => "add_row",
            FormCommand::RemoveRow { .. } => "remove_row",
            FormCommand::SetCell { .. } => "set_cell",
            FormCommand::AddRole => "add_role",
            FormCommand::RemoveRole { .. } => "remove_role",
            FormCommand::RenameRole { .. } => "rename_role",
            FormCommand::SetSignature { .. } => "set_signature",
            FormCommand::ClearSignature { .. } => "clear_signature",
            FormCommand::AddAttachment { .. } => "add_attachment",
            FormCommand::RemoveAttachment { .. } => "remove_attachment",
            FormCommand::AddCustomField { .. } => "add_custom_field",
            FormCommand::SetCustomField { .. } => "set_custom_field",
            FormCommand::RemoveCustomField { .. } => "remove_custom_field",
        }
    }
}

/// An open form: the definition, the instance being edited and the mode
/// it is shown in. The mode toggles freely; while it is
/// [`RenderMode::Print`] every command is rejected.
#[derive(Debug, Clone)]
pub struct FormSession {
    definition: Arc<FormDefinition>,
    instance: FormInstance,
    mode: RenderMode,
}

impl FormSession {
    /// Open a fresh instance seeded from the definition's defaults.
    pub fn new(definition: Arc<FormDefinition>) -> Self {
        let instance = definition.instantiate();
        FormSession {
            definition,
            instance,
            mode: RenderMode::Edit,
        }
    }

    /// Resume editing an existing instance.
    pub fn with_instance(definition: Arc<FormDefinition>, instance: FormInstance) -> Self {
        FormSession {
            definition,
            instance,
            mode: RenderMode::Edit,
        }
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn instance(&self) -> &FormInstance {
        &self.instance
    }

    pub fn into_instance(self) -> FormInstance {
        self.instance
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn apply(&mut self, command: FormCommand) -> Result<(), FormError> {
        if self.mode == RenderMode::Print {
            return Err(FormError::ReadOnly);
        }
        let op = command.op();
        match self.instance.apply(command) {
            Ok(()) => {
                tracing::debug!(form = %self.definition.id, op, "applied form command");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(form = %self.definition.id, op, error = %e, "form command rejected");
                Err(e)
            }
        }
    }

    pub fn validate(&self) -> ValidationReport {
        validate(&self.definition, &self.instance)
    }

    /// Render in the session's current mode with inline errors.
    pub fn render(&self) -> Presentation {
        self.render_as(self.mode)
    }

    pub fn render_as(&self, mode: RenderMode) -> Presentation {
        render(&self.definition, &self.instance, mode).with_errors(&self.validate())
    }

    /// Run the validation gate; the record JSON on success.
    pub fn submission(&self) -> Result<serde_json::Value, FormError> {
        prepare_submission(&self.definition, &self.instance)
    }
}
