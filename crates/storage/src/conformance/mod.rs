//! Conformance test suite for `SubmissionStore` implementations.
//!
//! Any backend can run this suite to check that it honours the store
//! contract:
//!
//! - **Insert**: stored records read back unchanged, duplicate ids rejected
//! - **Query**: not-found errors, form filtering, limits, insertion order
//! - **Concurrent**: parallel inserts neither lose nor double-store records
//!
//! # Usage
//!
//! ```ignore
//! use formkit_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn sqlite_conformance() {
//!     let report = run_conformance_suite(|| async { open_test_sqlite().await }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod insert;
mod query;

use std::fmt;
use std::future::Future;

use crate::record::SubmissionRecord;
use crate::SubmissionStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "insert", "query").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a submission store.
///
/// `factory` is called once per test and must return a fresh, empty store.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(insert::run_insert_tests(&factory).await);
    results.extend(query::run_query_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn make_submission(id: &str, form_id: &str) -> SubmissionRecord {
    let record = serde_json::json!({
        "vendorName": "Contoso",
        "tables": {
            "lineItems": {
                "columns": [{"key": "CostCenter", "label": "Cost Center"}],
                "rows": [{"category": "Hardware", "amount": "1200.00",
                          "dynamicFields": {"CostCenter": "CC-100"}}]
            }
        },
        "approvals": [{"roleName": "Approved By", "data": {"signedBy": "R. Ortiz"}}]
    });
    SubmissionRecord {
        id: id.to_string(),
        form_id: form_id.to_string(),
        submitted_at: "2026-03-02T09:30:00Z".to_string(),
        digest: crate::compute_digest(&record).unwrap_or_default(),
        record,
    }
}
