//! S3 object notifications.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use std::borrow::Cow;
use sublog_meta::KeyLayout;
use sublog_reconcile::Reconciler;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Event {
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_name: String,
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    /// URL-encoded, with `+` for spaces.
    pub key: String,
}

/// What an event record asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Upsert(String),
    Delete(String),
}

impl S3Event {
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).or_raise(|| ErrorKind::InvalidEvent)
    }
}

impl EventRecord {
    /// The decoded object key.
    pub fn key(&self) -> String {
        decode_key(&self.s3.object.key)
    }

    /// Map the record to a flow.
    ///
    /// Returns `None` for event types other than created/removed and for keys
    /// outside the metadata layout.
    pub fn action(&self, layout: &KeyLayout) -> Option<Action> {
        let key = self.key();
        let file_name = layout.file_name(&key)?.to_string();
        if self.event_name.starts_with("ObjectCreated:") {
            Some(Action::Upsert(file_name))
        } else if self.event_name.starts_with("ObjectRemoved:") {
            Some(Action::Delete(file_name))
        } else {
            None
        }
    }
}

fn decode_key(raw: &str) -> String {
    url::form_urlencoded::parse(raw.as_bytes()).next().map(|(key, _)| key).map(Cow::into_owned).unwrap_or_default()
}

/// Run the matching flow for every record of the event.
///
/// A failing record does not stop the others.
pub async fn dispatch(reconciler: &Reconciler, event: &S3Event) -> Result<()> {
    let layout = &reconciler.config().layout;
    let mut failed = 0;
    for record in &event.records {
        let key = record.key();
        let Some(action) = record.action(layout) else {
            tracing::warn!(
                bucket = %record.s3.bucket.name,
                key = %key,
                event = %record.event_name,
                "Skipping event record"
            );
            continue;
        };
        let outcome = match &action {
            Action::Upsert(file_name) => reconciler.upsert(file_name).await.map(drop),
            Action::Delete(file_name) => reconciler.delete(file_name).await.map(drop),
        };
        if let Err(err) = outcome {
            tracing::error!(key = %key, error = ?err, "Event record failed");
            failed += 1;
        }
    }
    if failed > 0 {
        exn::bail!(ErrorKind::PartialEvent(failed, event.records.len()));
    }
    Ok(())
}
