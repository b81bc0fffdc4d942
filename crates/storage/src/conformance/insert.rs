use std::future::Future;

use super::{make_submission, TestResult};
use crate::{StorageError, SubmissionStore};

pub(super) async fn run_insert_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "insert",
            "inserted_record_reads_back_unchanged",
            inserted_record_reads_back_unchanged(factory).await,
        ),
        TestResult::from_result(
            "insert",
            "duplicate_id_is_rejected",
            duplicate_id_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "insert",
            "duplicate_leaves_original_intact",
            duplicate_leaves_original_intact(factory).await,
        ),
    ]
}

async fn inserted_record_reads_back_unchanged<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let rec = make_submission("sub-1", "FIN-INV-004");
    s.insert_submission(rec.clone())
        .await
        .map_err(|e| e.to_string())?;

    let got = s.get_submission("sub-1").await.map_err(|e| e.to_string())?;
    if got != rec {
        return Err(format!("read back {:?}, expected {:?}", got, rec));
    }
    Ok(())
}

async fn duplicate_id_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_submission(make_submission("sub-1", "FIN-INV-004"))
        .await
        .map_err(|e| e.to_string())?;

    match s
        .insert_submission(make_submission("sub-1", "TRS-LF-001"))
        .await
    {
        Err(StorageError::Duplicate { id }) if id == "sub-1" => Ok(()),
        Err(StorageError::Duplicate { id }) => {
            Err(format!("Duplicate carried id '{}', expected 'sub-1'", id))
        }
        Err(e) => Err(format!("expected Duplicate, got {}", e)),
        Ok(()) => Err("second insert with the same id succeeded".to_string()),
    }
}

async fn duplicate_leaves_original_intact<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_submission(make_submission("sub-1", "FIN-INV-004"))
        .await
        .map_err(|e| e.to_string())?;
    let _ = s
        .insert_submission(make_submission("sub-1", "TRS-LF-001"))
        .await;

    let got = s.get_submission("sub-1").await.map_err(|e| e.to_string())?;
    if got.form_id != "FIN-INV-004" {
        return Err(format!("original overwritten: form_id is {}", got.form_id));
    }
    let all = s
        .list_submissions(None, 0)
        .await
        .map_err(|e| e.to_string())?;
    if all.len() != 1 {
        return Err(format!("expected 1 stored submission, got {}", all.len()));
    }
    Ok(())
}
