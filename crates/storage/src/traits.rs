use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::SubmissionRecord;

/// The storage trait for formkit submission backends.
///
/// A `SubmissionStore` receives records that have already passed the
/// validation gate. It never re-validates them.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait SubmissionStore: Send + Sync + 'static {
    /// Store a submission.
    ///
    /// Returns `Err(StorageError::Duplicate)` if a submission with the same
    /// id already exists; the stored record is left untouched.
    async fn insert_submission(&self, record: SubmissionRecord) -> Result<(), StorageError>;

    /// Read a submission by id.
    ///
    /// Returns `Err(StorageError::NotFound)` if there is none.
    async fn get_submission(&self, id: &str) -> Result<SubmissionRecord, StorageError>;

    /// List submissions in insertion order.
    ///
    /// - `form_id`: only submissions of this form
    /// - `limit`: maximum number of results (0 = no limit)
    async fn list_submissions(
        &self,
        form_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SubmissionRecord>, StorageError>;
}
