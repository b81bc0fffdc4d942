//! formkit-storage: where validated form records are handed off.
//!
//! Provides the [`SubmissionStore`] trait, the record types a backend
//! stores, an in-memory backend, the gated [`submit_form`] entry point and
//! a backend-agnostic [`conformance`] suite.

pub mod conformance;
mod error;
mod memory;
mod record;
mod submit;
mod traits;

pub use error::{StorageError, SubmitError};
pub use memory::InMemorySubmissionStore;
pub use record::{compute_digest, SubmissionReceipt, SubmissionRecord};
pub use submit::submit_form;
pub use traits::SubmissionStore;
