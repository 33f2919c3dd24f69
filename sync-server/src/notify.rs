//! Failure notifications
//!
//! Bulk calls that end partially or fully failed, and calls aborted by an
//! infrastructure error, are reported to an operator mailbox through SES.
//! Without a configured recipient the report only goes to the log.

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use shared::sync::{BulkResponse, SyncProcess};

use crate::db::BoxError;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), BoxError>;
}

/// Sends notifications as plain-text email through AWS SES v2
pub struct SesNotifier {
    ses: SesClient,
    from: String,
    to: String,
}

impl SesNotifier {
    pub fn new(ses: SesClient, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            ses,
            from: from.into(),
            to: to.into(),
        }
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), BoxError> {
        let subject = Content::builder().data(subject).build()?;
        let body = Body::builder()
            .text(Content::builder().data(body).build()?)
            .build();
        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(&self.to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        tracing::info!(to = %self.to, "Sync failure notification sent");
        Ok(())
    }
}

/// Writes notifications to the log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), BoxError> {
        tracing::warn!(subject, "{body}");
        Ok(())
    }
}

/// Subject and body for a partially or fully failed call, one line per failure
pub fn failure_report(process: SyncProcess, response: &BulkResponse) -> (String, String) {
    let subject = format!("[catalog-sync] {process}: {}", response.response.message);
    let mut body = format!(
        "Bulk sync of {process} finished with status {:?}: {}\n\n",
        response.response.status, response.response.message
    );
    for failure in &response.errors {
        body.push_str(&format!(
            "#{} {}: {}\n",
            failure.index,
            failure.record_id.as_deref().unwrap_or("-"),
            failure.message
        ));
    }
    (subject, body)
}

/// Subject and body for a call aborted by an infrastructure error
pub fn error_report(process: SyncProcess, error: &str) -> (String, String) {
    (
        format!("[catalog-sync] {process}: sync aborted"),
        format!("Bulk sync of {process} was aborted by an internal error:\n\n{error}\n"),
    )
}

/// Send a notification, logging delivery failures
pub async fn send(notifier: &dyn Notifier, (subject, body): (String, String)) {
    if let Err(e) = notifier.notify(&subject, &body).await {
        tracing::error!(subject = %subject, "Failed to send sync notification: {e}");
    }
}
