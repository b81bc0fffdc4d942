use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::StorageError;

/// A validated form record as handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub form_id: String,
    /// RFC 3339 timestamp string.
    pub submitted_at: String,
    /// Hex SHA-256 of the canonical record JSON.
    pub digest: String,
    /// The complete field-keyed record.
    pub record: serde_json::Value,
}

impl SubmissionRecord {
    /// Build a record with a fresh v4 id and the current UTC time.
    pub fn new(form_id: &str, record: serde_json::Value) -> Result<Self, StorageError> {
        let submitted_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| StorageError::Backend(format!("could not format timestamp: {}", e)))?;
        let digest = compute_digest(&record)?;
        Ok(SubmissionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            form_id: form_id.to_string(),
            submitted_at,
            digest,
            record,
        })
    }

    pub fn receipt(&self) -> SubmissionReceipt {
        SubmissionReceipt {
            id: self.id.clone(),
            form_id: self.form_id.clone(),
            submitted_at: self.submitted_at.clone(),
            digest: self.digest.clone(),
        }
    }
}

/// Acknowledgment returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: String,
    pub form_id: String,
    pub submitted_at: String,
    pub digest: String,
}

/// Hex SHA-256 over the compact JSON encoding with object keys sorted,
/// so equal records always hash equally.
pub fn compute_digest(record: &serde_json::Value) -> Result<String, StorageError> {
    let canonical = serde_json::to_string(&sorted_keys(record))
        .map_err(|e| StorageError::Backend(format!("could not encode record: {}", e)))?;
    Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
}

fn sorted_keys(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for key in keys {
                out.insert(key.clone(), sorted_keys(&map[key.as_str()]));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sorted_keys).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_ignores_key_order() {
        let a: serde_json::Value = serde_json::from_str(r#"{"a": 1, "b": "x"}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"b": "x", "a": 1}"#).unwrap();
        assert_eq!(compute_digest(&a).unwrap(), compute_digest(&b).unwrap());
        assert_eq!(compute_digest(&a).unwrap().len(), 64);
    }

    #[test]
    fn new_record_has_id_and_timestamp() {
        let rec = SubmissionRecord::new("FIN-INV-004", serde_json::json!({"a": 1})).unwrap();
        assert_eq!(rec.id.len(), 36);
        assert!(OffsetDateTime::parse(&rec.submitted_at, &Rfc3339).is_ok());
        assert_eq!(rec.receipt().digest, rec.digest);
    }
}
