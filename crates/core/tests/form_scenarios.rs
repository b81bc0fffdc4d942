//! End-to-end editing scenarios against the sample definitions in forms/.

use std::sync::Arc;

use formkit_core::{
    ColumnDefinition, FieldValue, FormCommand, FormDefinition, FormError, FormSession,
    RenderMode, SignaturePayload, Widget, BLANK_PLACEHOLDER, DEFAULT_ROLE_NAME,
};

fn load(name: &str) -> Arc<FormDefinition> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../forms")
        .join(name);
    Arc::new(FormDefinition::load(&path).unwrap())
}

fn set(field: &str, value: &str) -> FormCommand {
    FormCommand::SetField {
        field: field.into(),
        value: value.into(),
    }
}

#[test]
fn loan_facility_blocks_on_borrower_name_only() {
    let mut s = FormSession::new(load("loan_facility.json"));
    s.apply(set("facilityType", "Term Loan")).unwrap();

    let report = s.validate();
    assert_eq!(report.paths().collect::<Vec<_>>(), vec!["borrowerName"]);

    let Err(FormError::Invalid(blocked)) = s.submission() else {
        panic!("submission should be blocked");
    };
    assert_eq!(blocked, report);

    s.apply(set("borrowerName", "Northwind Traders")).unwrap();
    let record = s.submission().unwrap();
    assert_eq!(record["borrowerName"], "Northwind Traders");
    assert_eq!(record["decision"], "On Hold");
}

#[test]
fn invoice_cost_center_scenario() {
    let mut s = FormSession::new(load("invoice_request.json"));

    s.apply(FormCommand::AddColumn {
        table: "lineItems".into(),
        label: "Cost Center".into(),
    })
    .unwrap();
    s.apply(FormCommand::AddRow {
        table: "lineItems".into(),
    })
    .unwrap();
    s.apply(FormCommand::SetCell {
        table: "lineItems".into(),
        index: 1,
        column: "CostCenter".into(),
        value: "CC-100".into(),
    })
    .unwrap();

    let table = &s.instance().tables["lineItems"];
    assert_eq!(
        table.columns().iter().cloned().collect::<Vec<_>>(),
        vec![ColumnDefinition {
            key: "CostCenter".into(),
            label: "Cost Center".into()
        }]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(0, "CostCenter"), None);
    assert_eq!(table.cell(1, "CostCenter"), Some(&"CC-100".into()));
    assert_eq!(table.cell(1, "category"), Some(&FieldValue::empty_text()));

    let presentation = s.render();
    assert_eq!(presentation.tables[0].columns.len(), 3);
    assert_eq!(presentation.tables[0].rows.len(), 2);
}

#[test]
fn duplicate_column_is_a_warning_without_state_change() {
    let mut s = FormSession::new(load("invoice_request.json"));
    s.apply(FormCommand::AddColumn {
        table: "lineItems".into(),
        label: "Cost Center".into(),
    })
    .unwrap();
    let before = s.instance().clone();

    let err = s
        .apply(FormCommand::AddColumn {
            table: "lineItems".into(),
            label: "Cost  Center".into(),
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "column 'CostCenter' already exists");
    assert_eq!(s.instance(), &before);
}

#[test]
fn invoice_submits_once_rows_and_signature_are_complete() {
    let mut s = FormSession::new(load("invoice_request.json"));
    s.apply(set("vendorName", "Contoso")).unwrap();

    let report = s.validate();
    assert!(report.contains("lineItems[0].category"));
    assert!(report.contains("lineItems[0].amount"));
    assert!(report.contains("approvals[1].data"));

    for (column, value) in [("category", "Hardware"), ("amount", "1200.00")] {
        s.apply(FormCommand::SetCell {
            table: "lineItems".into(),
            index: 0,
            column: column.into(),
            value: value.into(),
        })
        .unwrap();
    }
    s.apply(FormCommand::SetSignature {
        index: 1,
        signature: SignaturePayload {
            signed_by: Some("R. Ortiz".into()),
            signed_at: Some("2026-03-02".into()),
            ..Default::default()
        },
    })
    .unwrap();

    let record = s.submission().unwrap();
    assert_eq!(record["tables"]["lineItems"]["rows"][0]["amount"], "1200.00");
    assert_eq!(record["approvals"][1]["data"]["signedBy"], "R. Ortiz");
}

#[test]
fn checklist_row_removal_preserves_order() {
    let mut s = FormSession::new(load("compliance_checklist.json"));
    for _ in 0..3 {
        s.apply(FormCommand::AddRow {
            table: "checklist".into(),
        })
        .unwrap();
    }
    for (i, item) in ["KYC refresh", "Sanctions screening", "Record retention", "Training"]
        .iter()
        .enumerate()
    {
        s.apply(FormCommand::SetCell {
            table: "checklist".into(),
            index: i,
            column: "item".into(),
            value: (*item).into(),
        })
        .unwrap();
    }

    s.apply(FormCommand::RemoveRow {
        table: "checklist".into(),
        index: 1,
    })
    .unwrap();

    let items: Vec<String> = s.instance().tables["checklist"]
        .rows()
        .iter()
        .map(|r| r.fields["item"].display_text())
        .collect();
    assert_eq!(items, ["KYC refresh", "Record retention", "Training"]);
}

#[test]
fn appended_role_has_placeholder_name_and_no_signature() {
    let mut s = FormSession::new(load("compliance_checklist.json"));
    let before = s.instance().approvals.len();
    s.apply(FormCommand::AddRole).unwrap();

    let roles = &s.instance().approvals;
    assert_eq!(roles.len(), before + 1);
    let added = roles.get(before).unwrap();
    assert_eq!(added.role_name, DEFAULT_ROLE_NAME);
    assert!(added.data.is_empty());
}

#[test]
fn print_toggle_round_trip_keeps_record() {
    let mut s = FormSession::new(load("loan_facility.json"));
    s.apply(set("borrowerName", "Northwind Traders")).unwrap();
    let before = s.instance().clone();

    s.set_mode(RenderMode::Print);
    let printed = s.render();
    let text = printed.to_text();
    assert!(text.contains("Borrower Name: Northwind Traders"));
    assert!(text.contains(&format!("Purpose: {}", BLANK_PLACEHOLDER)));
    assert!(printed
        .sections
        .iter()
        .flat_map(|sec| sec.fields.iter())
        .all(|f| matches!(f.widget, Widget::Static { .. })));
    s.set_mode(RenderMode::Edit);

    assert_eq!(s.instance(), &before);
}

#[test]
fn instance_json_round_trips_through_definition() {
    let def = load("invoice_request.json");
    let mut s = FormSession::new(def.clone());
    s.apply(FormCommand::AddColumn {
        table: "lineItems".into(),
        label: "GL Code".into(),
    })
    .unwrap();
    s.apply(FormCommand::SetCell {
        table: "lineItems".into(),
        index: 0,
        column: "GLCode".into(),
        value: "6100".into(),
    })
    .unwrap();

    let json = serde_json::to_value(s.instance()).unwrap();
    let restored = def.parse_instance(json).unwrap();
    assert_eq!(&restored, s.instance());

    let mut resumed = FormSession::with_instance(def, restored);
    resumed
        .apply(FormCommand::AddRow {
            table: "lineItems".into(),
        })
        .unwrap();
    assert_eq!(
        resumed.instance().tables["lineItems"].cell(1, "category"),
        Some(&FieldValue::empty_text())
    );
}
