//! Process-local submission store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::SubmissionRecord;
use crate::traits::SubmissionStore;

/// Keeps submissions in memory for the life of the process.
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    records: RwLock<Vec<SubmissionRecord>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn insert_submission(&self, record: SubmissionRecord) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StorageError::Duplicate { id: record.id });
        }
        records.push(record);
        Ok(())
    }

    async fn get_submission(&self, id: &str) -> Result<SubmissionRecord, StorageError> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })
    }

    async fn list_submissions(
        &self,
        form_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SubmissionRecord>, StorageError> {
        let records = self.records.read().await;
        let matching = records
            .iter()
            .filter(|r| form_id.map_or(true, |f| r.form_id == f))
            .cloned();
        Ok(if limit == 0 {
            matching.collect()
        } else {
            matching.take(limit).collect()
        })
    }
}
