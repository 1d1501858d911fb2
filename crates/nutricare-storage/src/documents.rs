//! Document-level operations on assessment records.
//!
//! Documents are JSON objects keyed by a generated id under a per-user
//! prefix (see `nutricare_core::doc_keys`). Every write is a whole-document
//! create — there are no partial updates anywhere in the system. No retries
//! and no timeouts beyond what the SDK provides; failures surface to the
//! caller, who may retry the action.

use jiff::Timestamp;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use aws_sdk_s3::Client;
use nutricare_core::doc_keys;
use nutricare_core::models::{StoredAssessment, lookup_path};

use crate::error::StorageError;
use crate::objects;

/// Create a new document under the prefix. Generates the id and stamps the
/// store-assigned `savedAtServer` timestamp, which is the highest-priority
/// sort-date source on read.
pub async fn create_document(
    client: &Client,
    bucket: &str,
    prefix: &str,
    mut doc: Value,
) -> Result<String, StorageError> {
    let id = Uuid::new_v4().to_string();
    let now = Timestamp::now();
    if let Some(root) = doc.as_object_mut() {
        root.insert(
            "savedAtServer".to_string(),
            json!({
                "seconds": now.as_second(),
                "nanos": now.subsec_nanosecond(),
            }),
        );
    }

    let key = doc_keys::assessment_file(prefix, &id);
    let body = serde_json::to_vec_pretty(&doc)?;
    objects::put_object(client, bucket, &key, body, Some("application/json")).await?;

    info!(key = %key, "document created");
    Ok(id)
}

/// Fetch a single document by id.
pub async fn get_document(
    client: &Client,
    bucket: &str,
    prefix: &str,
    id: &str,
) -> Result<StoredAssessment, StorageError> {
    let key = doc_keys::assessment_file(prefix, id);
    let body = objects::get_object(client, bucket, &key).await?;
    let doc: Value = serde_json::from_slice(&body)?;
    Ok(StoredAssessment::new(id, doc))
}

/// List every document under the prefix. No server-side ordering is
/// assumed — the date representation varies across writer generations, so
/// sorting happens after load. Unparseable documents are skipped, not
/// fatal.
pub async fn list_documents(
    client: &Client,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<StoredAssessment>, StorageError> {
    let keys = objects::list_objects(client, bucket, prefix).await?;

    let mut records = Vec::with_capacity(keys.len());
    for key in &keys {
        let body = objects::get_object(client, bucket, key).await?;
        match serde_json::from_slice::<Value>(&body) {
            Ok(doc) => {
                let id = document_id(key, prefix);
                records.push(StoredAssessment::new(id, doc));
            }
            Err(e) => {
                warn!(key = %key, error = %e, "skipping unparseable document");
            }
        }
    }

    Ok(records)
}

/// List documents whose nested field (dotted path, e.g.
/// `generalInfo.documentNumber`) equals the expected value. The filter is
/// evaluated client-side over the listing; values are compared structurally
/// and, failing that, as trimmed strings so number/string vintages match.
pub async fn query_documents(
    client: &Client,
    bucket: &str,
    prefix: &str,
    field_path: &str,
    expected: &Value,
) -> Result<Vec<StoredAssessment>, StorageError> {
    let records = list_documents(client, bucket, prefix).await?;
    Ok(records
        .into_iter()
        .filter(|record| {
            lookup_path(&record.doc, field_path)
                .map(|actual| values_match(actual, expected))
                .unwrap_or(false)
        })
        .collect())
}

/// Delete a document by id.
pub async fn delete_document(
    client: &Client,
    bucket: &str,
    prefix: &str,
    id: &str,
) -> Result<(), StorageError> {
    let key = doc_keys::assessment_file(prefix, id);
    objects::delete_object(client, bucket, &key).await?;
    info!(key = %key, "document deleted");
    Ok(())
}

fn document_id(key: &str, prefix: &str) -> String {
    key.strip_prefix(prefix)
        .unwrap_or(key)
        .strip_suffix(".json")
        .unwrap_or(key)
        .to_string()
}

fn values_match(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::String(_) | Value::Number(_), Value::String(_) | Value::Number(_)) => {
            display_string(actual) == display_string(expected)
        }
        _ => false,
    }
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
