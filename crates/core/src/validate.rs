//! The validation gate: required-field rules evaluated before submission.
//!
//! Errors are keyed by field path so the renderer can place each message
//! next to its input:
//!
//! - scalar field: `borrowerName`
//! - table cell: `lineItems[0].category`
//! - approval signature: `approvals[2].data`, or `approvals.<role>` when
//!   no role with that name exists at all
//!
//! There are no cross-field or semantic checks; displayed totals are never
//! re-validated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::definition::{FormDefinition, Rule};
use crate::error::FormError;
use crate::instance::FormInstance;

/// Field path to message, for every rule the instance currently violates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn insert(&mut self, path: String, message: String) {
        self.errors.entry(path).or_insert(message);
    }
}

/// Evaluate every rule of `definition` against `instance`.
pub fn validate(definition: &FormDefinition, instance: &FormInstance) -> ValidationReport {
    let mut report = ValidationReport::default();

    for rule in &definition.rules {
        match rule {
            Rule::Required { field } => {
                if instance.record.is_empty_at(field) {
                    report.insert(
                        field.clone(),
                        format!("{} is required", definition.field_label(field)),
                    );
                }
            }
            Rule::RequiredEach { table, column } => {
                let Some(rows) = instance.tables.get(table) else {
                    continue;
                };
                let label = definition
                    .table(table)
                    .and_then(|t| t.column(column))
                    .map_or(column.as_str(), |c| c.label.as_str());
                for index in 0..rows.len() {
                    let empty = rows.cell(index, column).map_or(true, |v| v.is_empty());
                    if empty {
                        report.insert(
                            format!("{}[{}].{}", table, index, column),
                            format!("{} is required in row {}", label, index + 1),
                        );
                    }
                }
            }
            Rule::Signed { role } => {
                let message = format!("{} signature is required", role);
                let positions: Vec<usize> = instance.approvals.positions_of(role).collect();
                if positions.is_empty() {
                    report.insert(format!("approvals.{}", role), message);
                    continue;
                }
                for index in positions {
                    let signed = instance
                        .approvals
                        .get(index)
                        .is_some_and(|r| r.is_signed());
                    if !signed {
                        report.insert(format!("approvals[{}].data", index), message.clone());
                    }
                }
            }
        }
    }

    report
}

/// The gate itself: block while any rule fails, otherwise return the
/// complete record JSON for handoff.
pub fn prepare_submission(
    definition: &FormDefinition,
    instance: &FormInstance,
) -> Result<serde_json::Value, FormError> {
    let report = validate(definition, instance);
    if !report.is_valid() {
        return Err(FormError::Invalid(report));
    }
    serde_json::to_value(instance).map_err(|e| FormError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::SignaturePayload;
    use crate::value::FieldValue;

    fn loan() -> FormDefinition {
        FormDefinition::from_json_str(
            r#"{
                "id": "TRS-LF-001",
                "title": "Loan Facility Request",
                "fields": [
                    {"key": "borrowerName", "label": "Borrower Name"},
                    {"key": "facilityType", "label": "Facility Type"},
                    {"key": "purpose", "label": "Purpose"}
                ],
                "rules": [
                    {"rule": "required", "field": "borrowerName"},
                    {"rule": "required", "field": "facilityType"}
                ]
            }"#,
        )
        .unwrap()
    }

    fn invoice() -> FormDefinition {
        FormDefinition::from_json_str(
            r#"{
                "id": "FIN-INV-004",
                "title": "Invoice",
                "tables": [{
                    "key": "lineItems", "label": "Line Items",
                    "columns": [
                        {"key": "category", "label": "Category"},
                        {"key": "amount", "label": "Amount"}
                    ]
                }],
                "approvals": {"default_roles": ["Prepared By", "Approved By"]},
                "rules": [
                    {"rule": "required_each", "table": "lineItems", "column": "category"},
                    {"rule": "signed", "role": "Approved By"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn blocks_only_the_empty_required_field() {
        let def = loan();
        let mut inst = def.instantiate();
        inst.set_field("facilityType", "Term Loan".into()).unwrap();

        let report = validate(&def, &inst);
        assert_eq!(report.len(), 1);
        assert_eq!(report.get("borrowerName"), Some("Borrower Name is required"));
        assert!(!report.contains("facilityType"));
        assert!(!report.contains("purpose"));

        match prepare_submission(&def, &inst) {
            Err(FormError::Invalid(r)) => assert_eq!(r, report),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn whitespace_does_not_satisfy_required() {
        let def = loan();
        let mut inst = def.instantiate();
        inst.set_field("borrowerName", "   ".into()).unwrap();
        inst.set_field("facilityType", "Overdraft".into()).unwrap();
        assert!(validate(&def, &inst).contains("borrowerName"));

        inst.set_field("borrowerName", "Acme".into()).unwrap();
        let record = prepare_submission(&def, &inst).unwrap();
        assert_eq!(record["borrowerName"], "Acme");
        assert_eq!(record["purpose"], "");
    }

    #[test]
    fn required_each_reports_every_empty_row() {
        let def = invoice();
        let mut inst = def.instantiate();
        let table = inst.table_mut("lineItems").unwrap();
        table.add_row();
        table.add_row();
        table.set_cell(1, "category", "travel".into()).unwrap();

        let report = validate(&def, &inst);
        assert_eq!(
            report.get("lineItems[0].category"),
            Some("Category is required in row 1")
        );
        assert!(!report.contains("lineItems[1].category"));
        assert_eq!(
            report.get("lineItems[2].category"),
            Some("Category is required in row 3")
        );
    }

    #[test]
    fn signed_rule_covers_missing_and_unsigned_roles() {
        let def = invoice();
        let mut inst = def.instantiate();
        inst.table_mut("lineItems")
            .unwrap()
            .set_cell(0, "category", "travel".into())
            .unwrap();

        let report = validate(&def, &inst);
        assert_eq!(
            report.paths().collect::<Vec<_>>(),
            vec!["approvals[1].data"]
        );

        inst.approvals
            .set_signature(
                1,
                SignaturePayload {
                    signed_by: Some("Lee".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(validate(&def, &inst).is_valid());

        inst.approvals.remove_role(1).unwrap();
        let report = validate(&def, &inst);
        assert_eq!(
            report.get("approvals.Approved By"),
            Some("Approved By signature is required")
        );
    }

    #[test]
    fn numbers_satisfy_required_cells() {
        let def = invoice();
        let mut inst = def.instantiate();
        inst.table_mut("lineItems")
            .unwrap()
            .set_cell(0, "category", FieldValue::from(0i64))
            .unwrap();
        assert!(!validate(&def, &inst).contains("lineItems[0].category"));
    }
}
