//! Semantic checks for form definitions.
//!
//! The JSON Schema in `docs/` only covers shape. These checks cover what a
//! schema cannot: unique non-blank keys, rules that point at real fields,
//! select defaults that are among their options.

use std::collections::HashSet;

use crate::definition::{FieldKind, FormDefinition, Rule};
use crate::error::DefinitionError;
use crate::value::FieldValue;

/// Top-level keys of the instance JSON that fields may not shadow.
pub const RESERVED_KEYS: &[&str] = &["tables", "approvals", "attachments", "customFields"];

/// Check a definition, collecting every problem rather than stopping at the
/// first one.
pub fn check(def: &FormDefinition) -> Result<(), Vec<DefinitionError>> {
    let mut errors = Vec::new();

    if def.id.trim().is_empty() {
        errors.push(DefinitionError::invalid("id", "form id must not be empty"));
    }
    if def.title.trim().is_empty() {
        errors.push(DefinitionError::invalid("title", "form title must not be empty"));
    }

    let mut field_keys = HashSet::new();
    for (i, field) in def.fields.iter().enumerate() {
        let path = format!("fields[{}]", i);
        if field.key.trim().is_empty() {
            errors.push(DefinitionError::invalid(
                format!("{}.key", path),
                "field key must not be empty",
            ));
        } else if !field_keys.insert(field.key.as_str()) {
            errors.push(DefinitionError::invalid(
                format!("{}.key", path),
                format!("duplicate field key '{}'", field.key),
            ));
        }
        if RESERVED_KEYS.contains(&field.key.as_str()) {
            errors.push(DefinitionError::invalid(
                format!("{}.key", path),
                format!("'{}' is reserved", field.key),
            ));
        }
        check_choice(&path, field.kind, &field.options, field.default.as_ref(), &mut errors);
    }

    let mut table_keys = HashSet::new();
    for (i, table) in def.tables.iter().enumerate() {
        let path = format!("tables[{}]", i);
        if table.key.trim().is_empty() {
            errors.push(DefinitionError::invalid(
                format!("{}.key", path),
                "table key must not be empty",
            ));
        } else if !table_keys.insert(table.key.as_str()) {
            errors.push(DefinitionError::invalid(
                format!("{}.key", path),
                format!("duplicate table key '{}'", table.key),
            ));
        }
        if table.columns.is_empty() {
            errors.push(DefinitionError::invalid(
                format!("{}.columns", path),
                "table must declare at least one column",
            ));
        }
        let mut column_keys = HashSet::new();
        for (j, column) in table.columns.iter().enumerate() {
            let col_path = format!("{}.columns[{}]", path, j);
            if column.key.trim().is_empty() {
                errors.push(DefinitionError::invalid(
                    format!("{}.key", col_path),
                    "column key must not be empty",
                ));
            } else if column.key.chars().any(char::is_whitespace) {
                errors.push(DefinitionError::invalid(
                    format!("{}.key", col_path),
                    format!("column key '{}' must not contain whitespace", column.key),
                ));
            } else if !column_keys.insert(column.key.as_str()) {
                errors.push(DefinitionError::invalid(
                    format!("{}.key", col_path),
                    format!("duplicate column key '{}'", column.key),
                ));
            }
            if column.key == "dynamicFields" {
                errors.push(DefinitionError::invalid(
                    format!("{}.key", col_path),
                    "'dynamicFields' is reserved",
                ));
            }
            check_choice(
                &col_path,
                column.kind,
                &column.options,
                column.default.as_ref(),
                &mut errors,
            );
        }
        if let Some(total) = &table.total_of {
            if table.column(total).is_none() {
                errors.push(DefinitionError::invalid(
                    format!("{}.total_of", path),
                    format!("unknown column '{}'", total),
                ));
            }
        }
    }

    for (i, rule) in def.rules.iter().enumerate() {
        let path = format!("rules[{}]", i);
        match rule {
            Rule::Required { field } => {
                if def.field(field).is_none() {
                    errors.push(DefinitionError::invalid(
                        path,
                        format!("required rule names unknown field '{}'", field),
                    ));
                }
            }
            Rule::RequiredEach { table, column } => match def.table(table) {
                None => errors.push(DefinitionError::invalid(
                    path,
                    format!("required_each rule names unknown table '{}'", table),
                )),
                Some(t) if t.column(column).is_none() => {
                    errors.push(DefinitionError::invalid(
                        path,
                        format!("table '{}' has no column '{}'", table, column),
                    ))
                }
                Some(_) => {}
            },
            Rule::Signed { role } => {
                if role.trim().is_empty() {
                    errors.push(DefinitionError::invalid(
                        path,
                        "signed rule needs a role name",
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_choice(
    path: &str,
    kind: FieldKind,
    options: &[String],
    default: Option<&FieldValue>,
    errors: &mut Vec<DefinitionError>,
) {
    if kind != FieldKind::Select {
        return;
    }
    if options.is_empty() {
        errors.push(DefinitionError::invalid(
            format!("{}.options", path),
            "select must declare at least one option",
        ));
        return;
    }
    if let Some(default) = default.and_then(FieldValue::as_str) {
        if !options.iter().any(|o| o == default) {
            errors.push(DefinitionError::invalid(
                format!("{}.default", path),
                format!("'{}' is not one of [{}]", default, options.join(", ")),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(src: &str) -> Vec<String> {
        let def = FormDefinition::from_json_str(src).unwrap();
        match check(&def) {
            Ok(()) => Vec::new(),
            Err(errs) => errs.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn clean_definition_passes() {
        let msgs = messages(
            r#"{
                "id": "X-1", "title": "X",
                "fields": [{"key": "a", "label": "A", "kind": "select",
                            "options": ["Approved", "Rejected", "On Hold"], "default": "On Hold"}],
                "tables": [{"key": "t", "label": "T",
                            "columns": [{"key": "amount", "label": "Amount"}],
                            "total_of": "amount"}],
                "rules": [{"rule": "required", "field": "a"},
                          {"rule": "required_each", "table": "t", "column": "amount"},
                          {"rule": "signed", "role": "Approved By"}]
            }"#,
        );
        assert!(msgs.is_empty(), "{:?}", msgs);
    }

    #[test]
    fn collects_every_problem() {
        let msgs = messages(
            r#"{
                "id": "", "title": "X",
                "fields": [
                    {"key": "a", "label": "A"},
                    {"key": "a", "label": "A again"},
                    {"key": "tables", "label": "Tables"},
                    {"key": "s", "label": "S", "kind": "select", "options": ["Q1"], "default": "Q5"}
                ],
                "tables": [{"key": "t", "label": "T",
                            "columns": [{"key": "c", "label": "C"}, {"key": "c", "label": "C"}],
                            "total_of": "amount"},
                           {"key": " ", "label": "Blank",
                            "columns": [{"key": "", "label": "Blank"},
                                        {"key": "cost center", "label": "Cost Center"}]}],
                "rules": [{"rule": "required", "field": "missing"},
                          {"rule": "required_each", "table": "t", "column": "nope"},
                          {"rule": "required_each", "table": "zz", "column": "c"}]
            }"#,
        );
        let expected = [
            "id: form id must not be empty",
            "fields[1].key: duplicate field key 'a'",
            "fields[2].key: 'tables' is reserved",
            "fields[3].default: 'Q5' is not one of [Q1]",
            "tables[0].columns[1].key: duplicate column key 'c'",
            "tables[0].total_of: unknown column 'amount'",
            "tables[1].key: table key must not be empty",
            "tables[1].columns[0].key: column key must not be empty",
            "tables[1].columns[1].key: column key 'cost center' must not contain whitespace",
            "rules[0]: required rule names unknown field 'missing'",
            "rules[1]: table 't' has no column 'nope'",
            "rules[2]: required_each rule names unknown table 'zz'",
        ];
        assert_eq!(msgs, expected);
    }

    #[test]
    fn select_without_options_is_rejected() {
        let msgs = messages(
            r#"{"id": "X", "title": "X",
                "fields": [{"key": "s", "label": "S", "kind": "select"}]}"#,
        );
        assert_eq!(msgs, ["fields[0].options: select must declare at least one option"]);
    }
}
