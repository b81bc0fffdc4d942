use std::future::Future;
use std::sync::Arc;

use super::{make_submission, TestResult};
use crate::{StorageError, SubmissionStore};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "concurrent_distinct_inserts_all_stored",
            concurrent_distinct_inserts_all_stored(factory).await,
        ),
        TestResult::from_result(
            "concurrent",
            "concurrent_same_id_exactly_one_wins",
            concurrent_same_id_exactly_one_wins(factory).await,
        ),
    ]
}

/// N tasks insert N different submissions; all N must be listed afterwards.
async fn concurrent_distinct_inserts_all_stored<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let mut handles = Vec::with_capacity(N);
    for i in 0..N {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .insert_submission(make_submission(&format!("sub-{}", i), "FIN-INV-004"))
                .await
        }));
    }
    for h in handles {
        h.await
            .map_err(|e| format!("task panicked: {}", e))?
            .map_err(|e| e.to_string())?;
    }

    let all = store
        .list_submissions(None, 0)
        .await
        .map_err(|e| e.to_string())?;
    if all.len() != N {
        return Err(format!("expected {} submissions, got {}", N, all.len()));
    }
    Ok(())
}

/// N tasks race to insert the same id; exactly one succeeds, the rest see
/// Duplicate.
async fn concurrent_same_id_exactly_one_wins<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);
    let mut handles = Vec::with_capacity(N);
    for _ in 0..N {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .insert_submission(make_submission("sub-race", "FIN-INV-004"))
                .await
        }));
    }

    let mut wins = 0;
    let mut duplicates = 0;
    for h in handles {
        match h.await.map_err(|e| format!("task panicked: {}", e))? {
            Ok(()) => wins += 1,
            Err(StorageError::Duplicate { .. }) => duplicates += 1,
            Err(e) => return Err(format!("unexpected error: {}", e)),
        }
    }
    if wins != 1 || duplicates != N - 1 {
        return Err(format!(
            "expected 1 win and {} duplicates, got {} and {}",
            N - 1,
            wins,
            duplicates
        ));
    }
    Ok(())
}
