use crate::validate::ValidationReport;

/// Errors raised while editing or submitting a form instance.
///
/// Every variant is user-correctable. A command that fails leaves the
/// instance exactly as it was before the command was applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// The field key is not declared by the form definition.
    #[error("unknown field: {key}")]
    UnknownField { key: String },

    /// The table key is not declared by the form definition.
    #[error("unknown table: {key}")]
    UnknownTable { key: String },

    /// Neither a fixed column nor a registered dynamic column.
    #[error("unknown column: {key}")]
    UnknownColumn { key: String },

    /// A column with the normalized key already exists in the table.
    #[error("column '{key}' already exists")]
    DuplicateColumn { key: String },

    /// The column label is empty once whitespace is stripped.
    #[error("column label must not be empty")]
    EmptyColumnLabel,

    #[error("row index {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("approval role index {index} out of range ({len} roles)")]
    RoleOutOfRange { index: usize, len: usize },

    #[error("attachment index {index} out of range ({len} attachments)")]
    AttachmentOutOfRange { index: usize, len: usize },

    #[error("custom field index {index} out of range ({len} custom fields)")]
    CustomFieldOutOfRange { index: usize, len: usize },

    /// The signature image is not valid base64.
    #[error("invalid signature payload: {message}")]
    InvalidSignature { message: String },

    /// Mutations are rejected while the session renders in print mode.
    #[error("form is in print mode and cannot be edited")]
    ReadOnly,

    /// The validation gate rejected the submission.
    #[error("form has {} validation error(s)", .0.len())]
    Invalid(ValidationReport),

    #[error("could not encode form record: {0}")]
    Encoding(String),
}

/// Errors raised while loading or checking a form definition.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse form JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A structural problem at `path` (e.g. `fields[2].options`).
    #[error("{path}: {message}")]
    Invalid { path: String, message: String },
}

impl DefinitionError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        DefinitionError::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}
