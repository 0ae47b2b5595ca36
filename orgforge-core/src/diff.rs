//! The reconciliation diff engine.
//!
//! [`diff_resources`] compares an existing record collection against a
//! requested one, keyed by a unique field, and classifies every record into
//! add / update / delete. Deletion is opt-in per requested record via
//! `allow_delete`; a record missing from the requested input is left alone.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::DiffError;
use crate::types::RecordMap;

// ---------------------------------------------------------------------------
// Diff output
// ---------------------------------------------------------------------------

/// Output of one [`diff_resources`] call.
///
/// `to_add` and `to_update` carry the requested record's fields
/// (`allow_delete` included); `to_delete` carries the existing record's
/// fields verbatim. Each sequence preserves the input order of its source
/// collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDiff {
    pub to_add: Vec<RecordMap>,
    pub to_update: Vec<RecordMap>,
    pub to_delete: Vec<RecordMap>,
}

impl ResourceDiff {
    /// True when no change of any operation was detected.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

// ---------------------------------------------------------------------------
// diff_resources
// ---------------------------------------------------------------------------

/// Compare `existing` records against `requested` records by `key`.
///
/// Classification:
/// - **add** — the key exists only in `requested`;
/// - **update** — the key exists in both and any field other than
///   `allow_delete` differs (mapping equality is key-set based, sequence
///   fields compare in order);
/// - **delete** — the key exists in both and the requested record sets
///   `allow_delete: true`.
///
/// The update and delete checks are independent: a record that differs and
/// is marked for deletion lands in both sequences. All failures abort the
/// call with no partial result; identical inputs always produce identical
/// output.
pub fn diff_resources<T: Serialize>(
    existing: &[RecordMap],
    requested: &[T],
    key: &str,
) -> Result<ResourceDiff, DiffError> {
    let existing_keyed = keyed_existing(existing, key)?;
    let requested_keyed = keyed_requested(requested, key)?;

    let existing_by_key: HashMap<&str, &RecordMap> = existing_keyed
        .iter()
        .map(|(record_key, record)| (record_key.as_str(), *record))
        .collect();
    let requested_by_key: HashMap<&str, &RecordMap> = requested_keyed
        .iter()
        .map(|(record_key, record)| (record_key.as_str(), record))
        .collect();

    let mut diff = ResourceDiff {
        to_add: Vec::new(),
        to_update: Vec::new(),
        to_delete: Vec::new(),
    };

    for (record_key, record) in &requested_keyed {
        match existing_by_key.get(record_key.as_str()) {
            None => diff.to_add.push(record.clone()),
            Some(current) => {
                if comparable(current) != comparable(record) {
                    diff.to_update.push(record.clone());
                }
            }
        }
    }

    for (record_key, record) in &existing_keyed {
        if let Some(wanted) = requested_by_key.get(record_key.as_str()) {
            if allow_delete(wanted) {
                diff.to_delete.push((*record).clone());
            }
        }
    }

    Ok(diff)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Comparison view of a record: every field except `allow_delete`.
fn comparable(record: &RecordMap) -> RecordMap {
    let mut view = record.clone();
    view.remove("allow_delete");
    view
}

/// Whether a requested record opts in to deletion. Absent means false.
fn allow_delete(record: &RecordMap) -> bool {
    matches!(record.get("allow_delete"), Some(Value::Bool(true)))
}

/// Render a unique-key value as a string table key.
///
/// Non-string values key by their JSON rendering.
pub fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compact JSON rendering of a record for error messages.
fn render_record(record: &RecordMap) -> String {
    Value::Object(record.clone()).to_string()
}

fn keyed_existing<'a>(
    existing: &'a [RecordMap],
    key: &str,
) -> Result<Vec<(String, &'a RecordMap)>, DiffError> {
    existing
        .iter()
        .map(|record| match record.get(key) {
            Some(value) => Ok((key_string(value), record)),
            None => Err(DiffError::MissingKey {
                key: key.to_owned(),
                record: render_record(record),
            }),
        })
        .collect()
}

fn keyed_requested<T: Serialize>(
    requested: &[T],
    key: &str,
) -> Result<Vec<(String, RecordMap)>, DiffError> {
    requested
        .iter()
        .map(|record| {
            let value = serde_json::to_value(record).map_err(|e| DiffError::Comparison {
                key: key.to_owned(),
                source: e,
            })?;
            let Value::Object(map) = value else {
                return Err(DiffError::MissingAttribute {
                    key: key.to_owned(),
                    record: value.to_string(),
                });
            };
            let record_key = match map.get(key) {
                Some(value) => key_string(value),
                None => {
                    return Err(DiffError::MissingAttribute {
                        key: key.to_owned(),
                        record: render_record(&map),
                    })
                }
            };
            Ok((record_key, map))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
