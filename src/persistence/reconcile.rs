//! Structural merge of a stored snapshot against the canonical default.
//!
//! The merged tree always has exactly the default's shape:
//! - keys missing from the stored blob are backfilled from the default,
//! - keys the default no longer has are dropped,
//! - paths listed as [`FieldPolicy::Canonical`] always take the default's
//!   value, whatever was stored.
//!
//! Unlisted object paths are reconciled recursively; every other unlisted
//! path is [`FieldPolicy::Preferred`].

use serde_json::{Map, Value};

/// How a field of the stored snapshot is treated on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Always sourced from the default dataset (fixed reference content).
    Canonical,
    /// The stored value when present and of the same JSON kind as the
    /// default's, otherwise the default's.
    Preferred,
}

/// Field policies by dotted JSON path.
pub const FIELD_POLICIES: &[(&str, FieldPolicy)] = &[
    ("situacionActual.infraestructura", FieldPolicy::Preferred),
    ("cotizacion.items", FieldPolicy::Preferred),
    ("cotizacion.notas", FieldPolicy::Canonical),
    ("cotizacion.ivaRate", FieldPolicy::Preferred),
    ("cotizacion.categoriaColores", FieldPolicy::Canonical),
    ("controlAcceso.items", FieldPolicy::Preferred),
    ("controlAcceso.kitDesglose", FieldPolicy::Canonical),
    ("controlAcceso.notas", FieldPolicy::Canonical),
    ("controlAcceso.ivaRate", FieldPolicy::Preferred),
    ("controlAcceso.categoriaColores", FieldPolicy::Canonical),
    ("ubicaciones", FieldPolicy::Preferred),
    ("beneficios", FieldPolicy::Preferred),
    ("roi", FieldPolicy::Preferred),
];

/// Policy of a dotted path, if it is listed.
pub fn policy_for(path: &str) -> Option<FieldPolicy> {
    FIELD_POLICIES
        .iter()
        .find(|(p, _)| *p == path)
        .map(|&(_, policy)| policy)
}

/// Merge `stored` into the shape of `default`.
pub fn reconcile(default: &Value, stored: &Value) -> Value {
    reconcile_at("", default, Some(stored))
}

fn reconcile_at(path: &str, default: &Value, stored: Option<&Value>) -> Value {
    match policy_for(path) {
        Some(FieldPolicy::Canonical) => default.clone(),
        Some(FieldPolicy::Preferred) => prefer(path, default, stored),
        None => match default {
            Value::Object(fields) => {
                let stored_fields = stored.and_then(Value::as_object);
                if stored.is_some() && stored_fields.is_none() {
                    tracing::debug!(path, "stored value is not an object, using default");
                }
                let merged: Map<String, Value> = fields
                    .iter()
                    .map(|(key, child)| {
                        let child_path = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{path}.{key}")
                        };
                        let stored_child = stored_fields.and_then(|f| f.get(key));
                        (key.clone(), reconcile_at(&child_path, child, stored_child))
                    })
                    .collect();
                Value::Object(merged)
            }
            _ => prefer(path, default, stored),
        },
    }
}

fn prefer(path: &str, default: &Value, stored: Option<&Value>) -> Value {
    match stored {
        Some(value) if same_kind(default, value) => value.clone(),
        Some(value) => {
            tracing::debug!(
                path,
                expected = kind(default),
                found = kind(value),
                "stored value has the wrong kind, using default"
            );
            default.clone()
        }
        None => {
            tracing::debug!(path, "field missing from stored snapshot, backfilled");
            default.clone()
        }
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    kind(a) == kind(b)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
