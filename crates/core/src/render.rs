//! Edit and print rendering of a form instance.
//!
//! The render mode is an explicit argument: nothing here consults shared
//! state. [`render`] borrows the instance immutably, so producing a print
//! layout can never change the record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::approval::SignaturePayload;
use crate::definition::{FieldKind, FormDefinition};
use crate::instance::FormInstance;
use crate::validate::ValidationReport;
use crate::value::FieldValue;

/// Text printed in place of an empty value in print mode.
pub const BLANK_PLACEHOLDER: &str = "________";

/// Shown for a role signed with an image but no signer name.
pub const SIGNATURE_ON_FILE: &str = "[signature on file]";

/// Lines per A4 page in the text layout, footer included.
pub const LINES_PER_PAGE: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Edit,
    Print,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Edit => f.write_str("edit"),
            RenderMode::Print => f.write_str("print"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(RenderMode::Edit),
            "print" => Ok(RenderMode::Print),
            other => Err(format!("unknown render mode '{}' (expected edit or print)", other)),
        }
    }
}

/// How a single value is presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Input {
        kind: FieldKind,
        value: FieldValue,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
    },
    Static {
        text: String,
    },
}

impl Widget {
    fn for_value(mode: RenderMode, kind: FieldKind, value: &FieldValue, options: &[String]) -> Self {
        match mode {
            RenderMode::Edit => Widget::Input {
                kind,
                value: value.clone(),
                options: options.to_vec(),
            },
            RenderMode::Print => Widget::Static {
                text: static_text(value),
            },
        }
    }

    /// One-line text form used by the text layout.
    pub fn display(&self) -> String {
        match self {
            Widget::Input { value, .. } => format!("[{}]", value.display_text()),
            Widget::Static { text } => text.clone(),
        }
    }
}

fn signer_text(data: &SignaturePayload) -> FieldValue {
    fn filled(s: &Option<String>) -> Option<&str> {
        s.as_deref().filter(|s| !s.trim().is_empty())
    }
    if let Some(name) = filled(&data.signed_by) {
        FieldValue::Text(name.to_string())
    } else if filled(&data.image).is_some() {
        FieldValue::Text(SIGNATURE_ON_FILE.to_string())
    } else {
        FieldValue::default()
    }
}

fn static_text(value: &FieldValue) -> String {
    if value.is_empty() {
        BLANK_PLACEHOLDER.to_string()
    } else {
        value.display_text()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldView {
    /// Field path, matching [`ValidationReport`] keys.
    pub path: String,
    pub label: String,
    #[serde(flatten)]
    pub widget: Widget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnView {
    pub key: String,
    pub label: String,
    pub dynamic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub key: String,
    pub label: String,
    pub columns: Vec<ColumnView>,
    /// One entry per row, cells in column order.
    pub rows: Vec<Vec<FieldView>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    /// Whether add/remove row and column controls are offered.
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalView {
    pub path: String,
    pub role_name: String,
    pub signed: bool,
    pub signature: Widget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A rendered form, ready for a UI layer or the text layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub form_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub mode: RenderMode,
    pub sections: Vec<SectionView>,
    pub tables: Vec<TableView>,
    pub approvals: Vec<ApprovalView>,
    pub attachments: Vec<String>,
    pub custom_fields: Vec<FieldView>,
    /// Messages that have no matching field on the page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form_errors: Vec<String>,
}

/// Render `instance` in the given mode.
pub fn render(definition: &FormDefinition, instance: &FormInstance, mode: RenderMode) -> Presentation {
    let mut sections: Vec<SectionView> = Vec::new();
    for field in &definition.fields {
        let value = instance.record.get(&field.key).cloned().unwrap_or_default();
        let view = FieldView {
            path: field.key.clone(),
            label: field.label.clone(),
            widget: Widget::for_value(mode, field.kind, &value, &field.options),
            error: None,
        };
        match sections.iter_mut().find(|s| s.title == field.section) {
            Some(section) => section.fields.push(view),
            None => sections.push(SectionView {
                title: field.section.clone(),
                fields: vec![view],
            }),
        }
    }

    let mut tables = Vec::new();
    for spec in &definition.tables {
        let Some(table) = instance.tables.get(&spec.key) else {
            continue;
        };
        let mut columns: Vec<ColumnView> = spec
            .columns
            .iter()
            .map(|c| ColumnView {
                key: c.key.clone(),
                label: c.label.clone(),
                dynamic: false,
            })
            .collect();
        columns.extend(table.columns().iter().map(|c| ColumnView {
            key: c.key.clone(),
            label: c.label.clone(),
            dynamic: true,
        }));

        let rows = (0..table.len())
            .map(|index| {
                columns
                    .iter()
                    .map(|col| {
                        let value = table.cell(index, &col.key).cloned().unwrap_or_default();
                        let fixed = spec.column(&col.key);
                        let kind = fixed.map_or(FieldKind::Text, |c| c.kind);
                        let options = fixed.map(|c| c.options.as_slice()).unwrap_or(&[]);
                        FieldView {
                            path: format!("{}[{}].{}", spec.key, index, col.key),
                            label: col.label.clone(),
                            widget: Widget::for_value(mode, kind, &value, options),
                            error: None,
                        }
                    })
                    .collect()
            })
            .collect();

        tables.push(TableView {
            key: spec.key.clone(),
            label: spec.label.clone(),
            columns,
            rows,
            total: spec
                .total_of
                .as_deref()
                .and_then(|key| table.column_total(key))
                .map(|d| d.to_string()),
            editable: mode == RenderMode::Edit,
        });
    }

    let approvals = instance
        .approvals
        .iter()
        .enumerate()
        .map(|(index, role)| {
            let signer = signer_text(&role.data);
            ApprovalView {
                path: format!("approvals[{}].data", index),
                role_name: role.role_name.clone(),
                signed: role.is_signed(),
                signature: Widget::for_value(mode, FieldKind::Text, &signer, &[]),
                error: None,
            }
        })
        .collect();

    let custom_fields = instance
        .custom_fields
        .iter()
        .enumerate()
        .map(|(index, field)| FieldView {
            path: format!("customFields[{}].value", index),
            label: field.label.clone(),
            widget: Widget::for_value(mode, FieldKind::Text, &field.value, &[]),
            error: None,
        })
        .collect();

    Presentation {
        form_id: definition.id.clone(),
        title: definition.title.clone(),
        department: definition.department.clone(),
        mode,
        sections,
        tables,
        approvals,
        attachments: instance
            .attachments
            .iter()
            .map(|a| match &a.note {
                Some(note) => format!("{} ({}) {}", a.name, a.reference, note),
                None => format!("{} ({})", a.name, a.reference),
            })
            .collect(),
        custom_fields,
        form_errors: Vec::new(),
    }
}

impl Presentation {
    /// Attach validation messages inline, by exact field path.
    pub fn with_errors(mut self, report: &ValidationReport) -> Self {
        for (path, message) in report.iter() {
            if let Some(slot) = self.error_slot(path) {
                *slot = Some(message.to_string());
            } else {
                self.form_errors.push(message.to_string());
            }
        }
        self
    }

    fn error_slot(&mut self, path: &str) -> Option<&mut Option<String>> {
        if let Some(view) = self
            .approvals
            .iter_mut()
            .find(|a| a.path == path)
        {
            return Some(&mut view.error);
        }
        self.sections
            .iter_mut()
            .flat_map(|s| s.fields.iter_mut())
            .chain(
                self.tables
                    .iter_mut()
                    .flat_map(|t| t.rows.iter_mut().flat_map(|r| r.iter_mut())),
            )
            .chain(self.custom_fields.iter_mut())
            .find(|f| f.path == path)
            .map(|f| &mut f.error)
    }

    /// Read-only text layout paginated for A4 printing.
    pub fn to_text(&self) -> String {
        let body = self.body_lines();
        let per_page = LINES_PER_PAGE - 2;
        let pages: Vec<&[String]> = if body.is_empty() {
            vec![&[]]
        } else {
            body.chunks(per_page).collect()
        };
        let total = pages.len();

        let mut out = String::new();
        for (i, page) in pages.iter().enumerate() {
            for line in page.iter() {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&format!("Page {} of {}\n", i + 1, total));
            if i + 1 < total {
                out.push('\u{c}');
            }
        }
        out
    }

    fn body_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(self.title.to_uppercase());
        let mut header = Vec::new();
        if let Some(dept) = &self.department {
            header.push(format!("Department: {}", dept));
        }
        header.push(format!("Form ID: {}", self.form_id));
        lines.push(header.join("    "));
        lines.push("=".repeat(72));

        for section in &self.sections {
            lines.push(String::new());
            if let Some(title) = &section.title {
                lines.push(title.clone());
                lines.push("-".repeat(title.len()));
            }
            for field in &section.fields {
                push_field(&mut lines, field);
            }
        }

        for table in &self.tables {
            lines.push(String::new());
            lines.push(table.label.clone());
            lines.push(format!(
                "| # | {} |",
                table
                    .columns
                    .iter()
                    .map(|c| c.label.as_str())
                    .collect::<Vec<_>>()
                    .join(" | ")
            ));
            for (i, row) in table.rows.iter().enumerate() {
                lines.push(format!(
                    "| {} | {} |",
                    i + 1,
                    row.iter()
                        .map(|c| c.widget.display())
                        .collect::<Vec<_>>()
                        .join(" | ")
                ));
                for cell in row.iter().filter(|c| c.error.is_some()) {
                    lines.push(format!("  ! {}", cell.error.as_deref().unwrap_or_default()));
                }
            }
            if let Some(total) = &table.total {
                lines.push(format!("Total: {}", total));
            }
        }

        if !self.custom_fields.is_empty() {
            lines.push(String::new());
            lines.push("Additional Fields".to_string());
            for field in &self.custom_fields {
                push_field(&mut lines, field);
            }
        }

        if !self.attachments.is_empty() {
            lines.push(String::new());
            lines.push("Attachments".to_string());
            for a in &self.attachments {
                lines.push(format!("  - {}", a));
            }
        }

        if !self.approvals.is_empty() {
            lines.push(String::new());
            lines.push("Approvals".to_string());
            for role in &self.approvals {
                let status = if role.signed { "signed" } else { "unsigned" };
                lines.push(format!(
                    "  {}: {} ({})",
                    role.role_name,
                    role.signature.display(),
                    status
                ));
                if let Some(err) = &role.error {
                    lines.push(format!("  ! {}", err));
                }
            }
        }

        for err in &self.form_errors {
            lines.push(format!("! {}", err));
        }
        lines
    }
}

fn push_field(lines: &mut Vec<String>, field: &FieldView) {
    lines.push(format!("{}: {}", field.label, field.widget.display()));
    if let Some(err) = &field.error {
        lines.push(format!("  ! {}", err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    fn def() -> FormDefinition {
        FormDefinition::from_json_str(
            r#"{
                "id": "FIN-INV-004",
                "title": "Invoice Request",
                "department": "Finance",
                "fields": [
                    {"key": "vendorName", "label": "Vendor Name", "section": "Vendor"},
                    {"key": "currency", "label": "Currency", "kind": "select",
                     "options": ["USD", "EUR"], "default": "USD", "section": "Vendor"},
                    {"key": "notes", "label": "Notes"}
                ],
                "tables": [{
                    "key": "lineItems", "label": "Line Items",
                    "columns": [
                        {"key": "category", "label": "Category"},
                        {"key": "amount", "label": "Amount", "kind": "number"}
                    ],
                    "total_of": "amount"
                }],
                "approvals": {"default_roles": ["Prepared By"]},
                "rules": [{"rule": "required", "field": "vendorName"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn print_mode_uses_static_text_and_placeholders() {
        let def = def();
        let inst = def.instantiate();
        let p = render(&def, &inst, RenderMode::Print);

        let vendor = &p.sections[0].fields[0];
        assert_eq!(
            vendor.widget,
            Widget::Static {
                text: BLANK_PLACEHOLDER.to_string()
            }
        );
        assert_eq!(
            p.sections[0].fields[1].widget,
            Widget::Static { text: "USD".into() }
        );
        assert!(!p.tables[0].editable);
    }

    #[test]
    fn edit_mode_exposes_inputs_and_dynamic_columns() {
        let def = def();
        let mut inst = def.instantiate();
        inst.table_mut("lineItems").unwrap().add_column("Cost Center").unwrap();
        let p = render(&def, &inst, RenderMode::Edit);

        assert!(matches!(
            &p.sections[0].fields[1].widget,
            Widget::Input { kind: FieldKind::Select, options, .. } if options.len() == 2
        ));
        let table = &p.tables[0];
        assert!(table.editable);
        assert_eq!(table.columns.len(), 3);
        assert!(table.columns[2].dynamic);
        assert_eq!(table.rows[0][2].path, "lineItems[0].CostCenter");
        assert_eq!(p.sections.len(), 2);
        assert_eq!(p.sections[1].title, None);
    }

    #[test]
    fn toggling_modes_leaves_instance_unchanged() {
        let def = def();
        let mut inst = def.instantiate();
        inst.set_field("vendorName", "Acme".into()).unwrap();
        let before = inst.clone();

        let printed = render(&def, &inst, RenderMode::Print);
        let edited = render(&def, &inst, RenderMode::Edit);
        assert_eq!(inst, before);
        assert_eq!(printed.sections[0].fields[0].widget.display(), "Acme");
        assert_eq!(edited.sections[0].fields[0].widget.display(), "[Acme]");
    }

    #[test]
    fn errors_attach_by_exact_path() {
        let def = def();
        let inst = def.instantiate();
        let report = validate(&def, &inst);
        let p = render(&def, &inst, RenderMode::Edit).with_errors(&report);

        assert_eq!(
            p.sections[0].fields[0].error.as_deref(),
            Some("Vendor Name is required")
        );
        assert!(p.sections[0].fields[1].error.is_none());
        assert!(p.form_errors.is_empty());
    }

    #[test]
    fn text_layout_has_header_total_and_footer() {
        let def = def();
        let mut inst = def.instantiate();
        let table = inst.table_mut("lineItems").unwrap();
        table.set_cell(0, "amount", "10.50".into()).unwrap();
        table.add_row();
        table.set_cell(1, "amount", "4.50".into()).unwrap();

        let text = render(&def, &inst, RenderMode::Print).to_text();
        assert!(text.starts_with("INVOICE REQUEST\n"));
        assert!(text.contains("Department: Finance    Form ID: FIN-INV-004"));
        assert!(text.contains("Total: 15.00"));
        assert!(text.contains("Prepared By: ________ (unsigned)"));
        assert!(text.trim_end().ends_with("Page 1 of 1"));
    }

    #[test]
    fn image_only_signature_prints_on_file_marker() {
        let def = def();
        let mut inst = def.instantiate();
        inst.approvals
            .set_signature(
                0,
                SignaturePayload {
                    image: Some("data:image/png;base64,iVBORw0KGgo=".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let p = render(&def, &inst, RenderMode::Print);
        assert!(p.approvals[0].signed);
        assert_eq!(p.approvals[0].signature.display(), SIGNATURE_ON_FILE);
        assert!(p
            .to_text()
            .contains("Prepared By: [signature on file] (signed)"));

        inst.approvals
            .set_signature(
                0,
                SignaturePayload {
                    image: Some("iVBORw0KGgo=".into()),
                    signed_by: Some("R. Ortiz".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let p = render(&def, &inst, RenderMode::Print);
        assert_eq!(p.approvals[0].signature.display(), "R. Ortiz");
    }

    #[test]
    fn long_layouts_paginate() {
        let def = def();
        let mut inst = def.instantiate();
        let table = inst.table_mut("lineItems").unwrap();
        for _ in 0..80 {
            table.add_row();
        }
        let text = render(&def, &inst, RenderMode::Print).to_text();
        assert!(text.contains("Page 1 of 2"));
        assert!(text.contains("Page 2 of 2"));
        assert_eq!(text.matches('\u{c}').count(), 1);
    }

    #[test]
    fn mode_parses_from_str() {
        assert_eq!("print".parse::<RenderMode>(), Ok(RenderMode::Print));
        assert_eq!(RenderMode::Edit.to_string(), "edit");
        assert!("draft".parse::<RenderMode>().is_err());
    }
}
