//! formkit-core: the form engine.
//!
//! One data-driven engine replaces a catalog of hand-written business
//! forms. A [`FormDefinition`] declares fields, tables and rules; the
//! engine provides the record model, dynamic tables with user-added
//! columns, approval roles, the validation gate and edit/print rendering.
//!
//! # Public API
//!
//! - [`FormDefinition`] -- load a definition, [`FormDefinition::instantiate`]
//!   a fresh [`FormInstance`]
//! - [`DynamicTable`] / [`ColumnRegistry`] -- rows plus ad hoc columns
//! - [`ApprovalRoles`] -- the sign-off sequence
//! - [`validate()`] / [`prepare_submission()`] -- the validation gate
//! - [`render()`] with an explicit [`RenderMode`]
//! - [`FormSession`] + [`FormCommand`] -- event-driven editing
//! - [`check()`] -- semantic definition checks

pub mod approval;
pub mod check;
pub mod definition;
pub mod error;
pub mod instance;
pub mod record;
pub mod render;
pub mod session;
pub mod table;
pub mod validate;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use approval::{ApprovalRole, ApprovalRoles, SignaturePayload, DEFAULT_ROLE_NAME};
pub use definition::{
    ApprovalSpec, ColumnSpec, FieldKind, FieldSpec, FormDefinition, Rule, TableSpec,
};
pub use error::{DefinitionError, FormError};
pub use instance::{Attachment, CustomField, FormInstance};
pub use record::FormRecord;
pub use render::{Presentation, RenderMode, Widget, BLANK_PLACEHOLDER};
pub use session::{FormCommand, FormSession};
pub use table::{normalize_column_key, ColumnDefinition, ColumnRegistry, DynamicTable, TableRow};
pub use validate::ValidationReport;
pub use value::FieldValue;

// ── Convenience re-exports: entry points ─────────────────────────────

pub use check::check;
pub use render::render;
pub use validate::{prepare_submission, validate};
