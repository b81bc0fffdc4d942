use std::future::Future;

use super::{make_submission, TestResult};
use crate::{StorageError, SubmissionStore};

pub(super) async fn run_query_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "query",
            "missing_id_is_not_found",
            missing_id_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "query",
            "empty_store_lists_nothing",
            empty_store_lists_nothing(factory).await,
        ),
        TestResult::from_result(
            "query",
            "list_keeps_insertion_order",
            list_keeps_insertion_order(factory).await,
        ),
        TestResult::from_result(
            "query",
            "list_filters_by_form",
            list_filters_by_form(factory).await,
        ),
        TestResult::from_result(
            "query",
            "list_honours_limit",
            list_honours_limit(factory).await,
        ),
    ]
}

async fn seed<S: SubmissionStore>(s: &S) -> Result<(), String> {
    for (id, form) in [
        ("sub-1", "FIN-INV-004"),
        ("sub-2", "TRS-LF-001"),
        ("sub-3", "FIN-INV-004"),
        ("sub-4", "CMP-CHK-012"),
        ("sub-5", "FIN-INV-004"),
    ] {
        s.insert_submission(make_submission(id, form))
            .await
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn ids(records: &[crate::SubmissionRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

async fn missing_id_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.get_submission("nope").await {
        Err(StorageError::NotFound { id }) if id == "nope" => Ok(()),
        Err(e) => Err(format!("expected NotFound, got {}", e)),
        Ok(r) => Err(format!("expected NotFound, got record {}", r.id)),
    }
}

async fn empty_store_lists_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let all = s
        .list_submissions(None, 0)
        .await
        .map_err(|e| e.to_string())?;
    if !all.is_empty() {
        return Err(format!("expected empty list, got {:?}", ids(&all)));
    }
    Ok(())
}

async fn list_keeps_insertion_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s).await?;
    let all = s
        .list_submissions(None, 0)
        .await
        .map_err(|e| e.to_string())?;
    let got = ids(&all);
    if got != ["sub-1", "sub-2", "sub-3", "sub-4", "sub-5"] {
        return Err(format!("unexpected order {:?}", got));
    }
    Ok(())
}

async fn list_filters_by_form<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s).await?;
    let invoices = s
        .list_submissions(Some("FIN-INV-004"), 0)
        .await
        .map_err(|e| e.to_string())?;
    let got = ids(&invoices);
    if got != ["sub-1", "sub-3", "sub-5"] {
        return Err(format!("expected invoice submissions only, got {:?}", got));
    }
    let none = s
        .list_submissions(Some("HR-LV-999"), 0)
        .await
        .map_err(|e| e.to_string())?;
    if !none.is_empty() {
        return Err(format!("unknown form matched {:?}", ids(&none)));
    }
    Ok(())
}

async fn list_honours_limit<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s).await?;
    let first_two = s
        .list_submissions(None, 2)
        .await
        .map_err(|e| e.to_string())?;
    if ids(&first_two) != ["sub-1", "sub-2"] {
        return Err(format!("limit 2 returned {:?}", ids(&first_two)));
    }
    let filtered = s
        .list_submissions(Some("FIN-INV-004"), 2)
        .await
        .map_err(|e| e.to_string())?;
    if ids(&filtered) != ["sub-1", "sub-3"] {
        return Err(format!("filtered limit 2 returned {:?}", ids(&filtered)));
    }
    Ok(())
}
