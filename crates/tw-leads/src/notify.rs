//! Outbound email notification on lead submission.

use serde::Serialize;
use serde_json::json;

use tw_backend::BackendClient;
use tw_core::enums::LeadKind;

/// Fire the `notify-lead` serverless function for a stored lead.
///
/// Best-effort: a notification failure is logged and never fails the
/// submission that triggered it.
pub(crate) async fn notify_lead<T: Serialize + Sync>(
    backend: &BackendClient,
    kind: LeadKind,
    record: &T,
) {
    let payload = json!({ "kind": kind, "record": record });
    if let Err(error) = backend.invoke("notify-lead", &payload).await {
        tracing::warn!(kind = %kind, %error, "lead notification email failed");
    }
}
