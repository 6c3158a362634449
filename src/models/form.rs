//! Schema-driven form handling: decode submitted pairs into a JSON body,
//! and describe fields for the form template.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::auth::validate;
use crate::models::entity::PersonRole;
use crate::models::schema::{EntitySchema, FieldKind};

/// Look up a submitted value by name; missing fields read as empty.
pub fn value_of<'a>(pairs: &'a [(String, String)], name: &str) -> &'a str {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// Validate every schema field and build the backend payload.
///
/// Empty optional fields are sent as `null`. All errors are collected
/// so the form can show them together.
pub fn decode(schema: &EntitySchema, pairs: &[(String, String)]) -> Result<Map<String, Value>, Vec<String>> {
    let mut body = Map::new();
    let mut errors = Vec::new();

    for field in schema.fields {
        let raw = value_of(pairs, field.name).trim();
        if raw.is_empty() {
            if field.required {
                errors.push(format!("{} es obligatorio", field.label));
            } else {
                body.insert(field.name.to_string(), Value::Null);
            }
            continue;
        }
        let parsed = match field.kind {
            FieldKind::Text | FieldKind::TextArea => {
                match validate::validate_optional(raw, field.label, field.max_len) {
                    Some(e) => Err(e),
                    None => Ok(Value::String(raw.to_string())),
                }
            }
            FieldKind::Integer | FieldKind::Select { .. } => {
                validate::parse_integer(raw, field.label).map(Value::from)
            }
            FieldKind::Number => validate::parse_number(raw, field.label).map(Value::from),
            FieldKind::Date => validate::parse_date(raw, field.label)
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        };
        match parsed {
            Ok(v) => {
                body.insert(field.name.to_string(), v);
            }
            Err(e) => errors.push(e),
        }
    }

    if let (Some(Value::String(start)), Some(Value::String(end))) =
        (body.get("fecha_inicio"), body.get("fecha_fin"))
    {
        // ISO dates compare correctly as strings
        if end < start {
            errors.push("La fecha de fin no puede ser anterior a la fecha de inicio".to_string());
        }
    }

    if errors.is_empty() { Ok(body) } else { Err(errors) }
}

/// Form value for a field taken from a stored record.
pub fn value_from_record(record: &Value, name: &str, kind: FieldKind) -> String {
    let text = match record.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    };
    match kind {
        // Timestamps like `2024-03-01T00:00:00.000Z` feed a date input
        FieldKind::Date => text.chars().take(10).collect(),
        _ => text,
    }
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub struct FieldView {
    pub name: String,
    pub label: String,
    pub input: String,
    pub value: String,
    pub required: bool,
    pub options: Vec<SelectOption>,
}

/// Options for a select field, filtered by role when the field asks for one.
pub fn select_options(
    items: &[Value],
    label_field: &str,
    role: Option<PersonRole>,
    selected: &str,
) -> Vec<SelectOption> {
    items
        .iter()
        .filter(|item| match role {
            Some(r) => crate::backend::id_of(item, "id_rol") == Some(r.id()),
            None => true,
        })
        .filter_map(|item| {
            let id = crate::backend::id_of(item, "id")?.to_string();
            let label = match item.get(label_field) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => format!("#{id}"),
            };
            Some(SelectOption { selected: id == selected, value: id, label })
        })
        .collect()
}

/// Template description of every field, with current values and choices.
pub fn field_views<F>(
    schema: &EntitySchema,
    current: F,
    lists: &HashMap<&'static str, Vec<Value>>,
) -> Vec<FieldView>
where
    F: Fn(&str, FieldKind) -> String,
{
    schema
        .fields
        .iter()
        .map(|f| {
            let value = current(f.name, f.kind);
            let (input, options) = match f.kind {
                FieldKind::Text => ("text", Vec::new()),
                FieldKind::TextArea => ("textarea", Vec::new()),
                FieldKind::Integer => ("integer", Vec::new()),
                FieldKind::Number => ("number", Vec::new()),
                FieldKind::Date => ("date", Vec::new()),
                FieldKind::Select { endpoint, label_field, role } => {
                    let items = lists.get(endpoint).map(Vec::as_slice).unwrap_or(&[]);
                    ("select", select_options(items, label_field, role, &value))
                }
            };
            FieldView {
                name: f.name.to_string(),
                label: f.label.to_string(),
                input: input.to_string(),
                value,
                required: f.required,
                options,
            }
        })
        .collect()
}
