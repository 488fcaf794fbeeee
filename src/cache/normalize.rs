// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Normalization of JSON values into cache records and back.
//!
//! An object that carries both `__typename` and `id` is an entity. It is
//! stored once under its composite key `Type:id` and every place it
//! appeared is replaced by `{"__ref": "Type:id"}`.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};

use crate::models::id_key;

pub const TYPENAME: &str = "__typename";
pub const REF: &str = "__ref";

/// Nesting limit on read, for long chains of distinct entities.
const MAX_DEPTH: usize = 32;

pub type Record = Map<String, Value>;
pub type Records = BTreeMap<String, Record>;

/// Composite key `Type:id` of an entity, if `record` is one.
pub fn identify(record: &Record) -> Option<String> {
    let typename = record.get(TYPENAME)?.as_str()?;
    let id = id_key(record.get("id")?)?;
    Some(format!("{typename}:{id}"))
}

pub fn reference(key: &str) -> Value {
    let mut map = Map::new();
    map.insert(REF.to_string(), Value::String(key.to_string()));
    Value::Object(map)
}

pub fn ref_key(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get(REF)?.as_str()
}

/// Split entities out of `value` into `records`, returning what remains.
pub fn normalize(value: Value, records: &mut Records) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize(item, records))
                .collect(),
        ),
        Value::Object(map) => {
            let record = normalize_fields(map, records);
            match identify(&record) {
                Some(key) => {
                    merge(records, &key, record);
                    reference(&key)
                }
                None => Value::Object(record),
            }
        }
        other => other,
    }
}

/// Normalize the fields of one object without turning the object itself
/// into a reference.
pub fn normalize_fields(map: Record, records: &mut Records) -> Record {
    map.into_iter()
        .map(|(field, value)| (field, normalize(value, records)))
        .collect()
}

/// Later writes win field by field; fields not written are kept.
pub fn merge(records: &mut Records, key: &str, fields: Record) {
    records.entry(key.to_string()).or_default().extend(fields);
}

/// Resolve references in `value` against `records`. Dangling references
/// read as `null`.
///
/// Each entity is expanded once per read. Any later reference to it, including
/// a reference back to itself, is returned as the bare `{"__ref": key}`. The
/// result is therefore never larger than the records it was built from.
pub fn denormalize(value: &Value, records: &Records) -> Value {
    let mut expanded = HashSet::new();
    denormalize_at(value, records, 0, &mut expanded)
}

fn denormalize_at<'r>(
    value: &Value,
    records: &'r Records,
    depth: usize,
    expanded: &mut HashSet<&'r str>,
) -> Value {
    if depth > MAX_DEPTH {
        return Value::Null;
    }
    if let Some(key) = ref_key(value) {
        return match records.get_key_value(key) {
            Some((key, record)) => {
                if expanded.insert(key.as_str()) {
                    denormalize_record(record, records, depth + 1, expanded)
                } else {
                    value.clone()
                }
            }
            None => Value::Null,
        };
    }
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| denormalize_at(item, records, depth + 1, expanded))
                .collect(),
        ),
        Value::Object(map) => denormalize_record(map, records, depth + 1, expanded),
        other => other.clone(),
    }
}

fn denormalize_record<'r>(
    record: &Record,
    records: &'r Records,
    depth: usize,
    expanded: &mut HashSet<&'r str>,
) -> Value {
    Value::Object(
        record
            .iter()
            .map(|(field, value)| {
                (
                    field.clone(),
                    denormalize_at(value, records, depth, expanded),
                )
            })
            .collect(),
    )
}

/// Keep only `fields` (and `__typename`) of every object in `value`.
/// An empty field list keeps everything.
pub fn project(value: Value, fields: &[&str]) -> Value {
    if fields.is_empty() {
        return value;
    }
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(field, _)| field == TYPENAME || fields.contains(&field.as_str()))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| project(item, fields))
                .collect(),
        ),
        other => other,
    }
}
