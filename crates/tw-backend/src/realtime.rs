//! Table change-feed subscriptions.
//!
//! The hosted store notifies row changes over its own push channel; this
//! client reproduces that boundary by polling the table on an `updated_at`
//! cursor and emitting [`ChangeEvent`]s. Poll errors are logged and the loop
//! keeps going — a flaky network must not kill a dashboard subscription.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::BackendClient;
use crate::tables::Filter;

/// What kind of row change an event describes.
///
/// Deletes are not observable from a cursor poll; dashboards treat them as
/// rows simply no longer matching their listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
}

/// One changed row on a subscribed table.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub row: Value,
}

/// Handle to an active change-feed subscription.
///
/// Dropping the handle cancels the poll task.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<ChangeEvent>,
    task: tokio::task::JoinHandle<()>,
}

impl Subscription {
    /// Wait for the next change event. Returns `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Cancel the subscription.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl BackendClient {
    /// Subscribe to row changes on `table`, scoped by `filter`.
    ///
    /// Events start from the moment of subscription; existing rows are not
    /// replayed (callers list first, then subscribe).
    #[must_use]
    pub fn subscribe(
        &self,
        table: &str,
        filter: Filter,
        poll_interval: std::time::Duration,
    ) -> Subscription {
        let (tx, rx) = mpsc::channel(64);
        let client = self.clone();
        let table = table.to_string();
        let task = tokio::spawn(async move {
            poll_loop(client, table, filter, poll_interval, tx).await;
        });
        Subscription { events: rx, task }
    }
}

async fn poll_loop(
    client: BackendClient,
    table: String,
    filter: Filter,
    poll_interval: std::time::Duration,
    tx: mpsc::Sender<ChangeEvent>,
) {
    let mut cursor = Utc::now();
    loop {
        tokio::time::sleep(poll_interval).await;

        let query = filter
            .clone()
            .gt("updated_at", cursor.to_rfc3339())
            .order("updated_at", true);
        let rows: Vec<Value> = match client.select(&table, &query).await {
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!(table = %table, %error, "change-feed poll failed");
                continue;
            }
        };

        for row in rows {
            let Some((kind, updated_at)) = classify(&row, cursor) else {
                continue;
            };
            if updated_at > cursor {
                cursor = updated_at;
            }
            let event = ChangeEvent {
                table: table.clone(),
                kind,
                row,
            };
            if tx.send(event).await.is_err() {
                return; // subscriber gone
            }
        }
    }
}

/// Classify a polled row against the cursor.
///
/// A row whose `created_at` is past the cursor is a fresh insert; anything
/// else that moved its `updated_at` is an update. Rows without a parseable
/// `updated_at` cannot advance the cursor and are skipped.
fn classify(row: &Value, cursor: DateTime<Utc>) -> Option<(ChangeKind, DateTime<Utc>)> {
    let updated_at = parse_timestamp(row.get("updated_at")?)?;
    let kind = match row.get("created_at").and_then(parse_timestamp) {
        Some(created_at) if created_at > cursor => ChangeKind::Insert,
        _ => ChangeKind::Update,
    };
    Some((kind, updated_at))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
