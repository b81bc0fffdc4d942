//! The submission handoff: gate, record, store.

use formkit_core::{prepare_submission, FormDefinition, FormInstance};

use crate::error::SubmitError;
use crate::record::{SubmissionReceipt, SubmissionRecord};
use crate::traits::SubmissionStore;

/// Run the validation gate and, when it passes, store the complete record.
///
/// Submission is all-or-nothing: a blocked instance never reaches the store.
pub async fn submit_form<S>(
    store: &S,
    definition: &FormDefinition,
    instance: &FormInstance,
) -> Result<SubmissionReceipt, SubmitError>
where
    S: SubmissionStore + ?Sized,
{
    let record = match prepare_submission(definition, instance) {
        Ok(record) => record,
        Err(e) => {
            tracing::info!(form = %definition.id, error = %e, "submission blocked");
            return Err(e.into());
        }
    };

    let submission = SubmissionRecord::new(&definition.id, record)?;
    let receipt = submission.receipt();
    store.insert_submission(submission).await?;

    tracing::info!(
        form = %receipt.form_id,
        id = %receipt.id,
        digest = %receipt.digest,
        "form submitted"
    );
    Ok(receipt)
}
