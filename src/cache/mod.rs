// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Normalized Cache
//!
//! In-memory store the resolvers write into and callers read from.
//!
//! ## Layout
//!
//! ```text
//! ROOT_QUERY        # client-only fields: jwtToken, currentUser -> {"__ref": "User:1"}
//! User:1            # entity records keyed by Type:id
//! DappUser:42
//! ```
//!
//! Writes keep every field they are given; a query's selection only shapes
//! what [`Cache::read_query`] returns. The cache never evicts on its own;
//! callers evict explicitly.

mod normalize;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

pub use normalize::{identify, Record, REF, TYPENAME};
use normalize::{
    denormalize, merge, normalize, normalize_fields, project, ref_key, reference, Records,
};

/// Key of the record holding client-only root fields.
pub const ROOT_QUERY: &str = "ROOT_QUERY";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("{0} data must be a JSON object")]
    NotAnObject(&'static str),

    #[error("query {query} data is missing field '{field}'")]
    MissingRootField {
        query: &'static str,
        field: &'static str,
    },
}

/// A client-side query reading one root field.
#[derive(Debug, Clone, Copy)]
pub struct ClientQuery {
    pub name: &'static str,
    pub root_field: &'static str,
    pub fields: &'static [&'static str],
}

/// A fragment written onto entities of one type.
#[derive(Debug, Clone, Copy)]
pub struct Fragment {
    pub name: &'static str,
    pub type_condition: &'static str,
}

/// Shared normalized cache. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    records: Arc<RwLock<Records>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Records> {
        self.records.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Records> {
        self.records.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Merge `data` into the root record.
    pub fn write_data(&self, data: Record) {
        let mut records = self.write_guard();
        let fields = normalize_fields(data, &mut records);
        merge(&mut records, ROOT_QUERY, fields);
    }

    /// Write the result of `query`. `data` must be an object holding the
    /// query's root field.
    pub fn write_query(&self, query: &ClientQuery, data: Value) -> Result<(), CacheError> {
        let Value::Object(mut data) = data else {
            return Err(CacheError::NotAnObject(query.name));
        };
        let value = data
            .remove(query.root_field)
            .ok_or(CacheError::MissingRootField {
                query: query.name,
                field: query.root_field,
            })?;

        let mut records = self.write_guard();
        let value = normalize(value, &mut records);
        let mut fields = Record::new();
        fields.insert(query.root_field.to_string(), value);
        merge(&mut records, ROOT_QUERY, fields);
        Ok(())
    }

    /// Write `data` into the record at `id` and return the stored entity.
    ///
    /// `__typename` defaults to the fragment's type condition.
    pub fn write_fragment(
        &self,
        id: &str,
        fragment: &Fragment,
        data: Value,
    ) -> Result<Value, CacheError> {
        let Value::Object(mut data) = data else {
            return Err(CacheError::NotAnObject(fragment.name));
        };
        data.entry(TYPENAME)
            .or_insert_with(|| Value::String(fragment.type_condition.to_string()));

        let mut records = self.write_guard();
        let fields = normalize_fields(data, &mut records);
        merge(&mut records, id, fields);

        Ok(denormalize(&reference(id), &records))
    }

    /// Root field `field`, with references resolved.
    pub fn read_field(&self, field: &str) -> Option<Value> {
        let records = self.read_guard();
        let value = records.get(ROOT_QUERY)?.get(field)?;
        Some(denormalize(value, &records))
    }

    pub fn read_query(&self, query: &ClientQuery) -> Option<Value> {
        self.read_field(query.root_field)
            .map(|value| project(value, query.fields))
    }

    /// Key of the entity a root field points at, if it holds a reference.
    pub fn root_reference(&self, field: &str) -> Option<String> {
        let records = self.read_guard();
        let value = records.get(ROOT_QUERY)?.get(field)?;
        ref_key(value).map(str::to_string)
    }

    /// Remove the record at `key`. Returns whether it existed.
    pub fn evict(&self, key: &str) -> bool {
        self.write_guard().remove(key).is_some()
    }

    /// Drop every record.
    pub fn reset(&self) {
        self.write_guard().clear();
    }
}

/// Inspection helpers for tests.
#[cfg(test)]
impl Cache {
    /// Raw (normalized) record at `key`.
    pub(crate) fn record(&self, key: &str) -> Option<Record> {
        self.read_guard().get(key).cloned()
    }

    /// Copy of every record.
    pub(crate) fn snapshot(&self) -> Records {
        self.read_guard().clone()
    }
}
