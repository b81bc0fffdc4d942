use formkit_core::{FormError, ValidationReport};

/// All errors that can be returned by a SubmissionStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A submission with this id has already been stored.
    #[error("submission already exists: {id}")]
    Duplicate { id: String },

    /// No submission with the given id.
    #[error("submission not found: {id}")]
    NotFound { id: String },

    /// A backend-specific storage error (connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Why a submission did not reach the store.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The validation gate rejected the instance.
    #[error("submission blocked: {} field(s) need attention", .0.len())]
    Invalid(ValidationReport),

    #[error(transparent)]
    Form(FormError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<FormError> for SubmitError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::Invalid(report) => SubmitError::Invalid(report),
            other => SubmitError::Form(other),
        }
    }
}
