//! Application state shared across request handlers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use formkit_core::{FormDefinition, FormSession};
use formkit_storage::SubmissionStore;
use tokio::sync::RwLock;
use uuid::Uuid;

pub(crate) struct AppState {
    /// Loaded definitions keyed by form id. Fixed at startup.
    pub(crate) forms: BTreeMap<String, Arc<FormDefinition>>,
    /// Open editing sessions.
    pub(crate) sessions: RwLock<HashMap<Uuid, FormSession>>,
    pub(crate) store: Box<dyn SubmissionStore>,
    /// Optional API key for authentication. None = no auth required.
    pub(crate) api_key: Option<String>,
}

impl AppState {
    pub(crate) fn form(&self, id: &str) -> Option<Arc<FormDefinition>> {
        self.forms.get(id).cloned()
    }
}
