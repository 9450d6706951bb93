//! Completion records and the collaborator that receives them.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::transcript::TranscriptMessage;
use crate::config::WebhookConfig;
use crate::error::SubmissionError;
use crate::session::UserProfile;

/// Everything the report generator needs about a finished interview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub user_data: UserProfile,
    pub messages: Vec<TranscriptMessage>,
    pub completed_at: DateTime<Utc>,
    pub conversation_length: usize,
}

impl CompletionRecord {
    pub fn new(profile: UserProfile, messages: Vec<TranscriptMessage>) -> Self {
        Self {
            user_data: profile,
            conversation_length: messages.len(),
            messages,
            completed_at: Utc::now(),
        }
    }
}

/// Receives completion records. Only success or failure is observed.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn submit(&self, record: &CompletionRecord) -> Result<(), SubmissionError>;
}

/// Logs the record and reports success. Used when no webhook is configured.
///
/// Only the transcript length is logged at info. The full payload carries the
/// candidate's contact details and is kept to debug.
#[derive(Debug, Default)]
pub struct LoggingReportSink;

#[async_trait]
impl ReportSink for LoggingReportSink {
    async fn submit(&self, record: &CompletionRecord) -> Result<(), SubmissionError> {
        info!(
            conversation_length = record.conversation_length,
            "Interview completion record"
        );
        match serde_json::to_string(record) {
            Ok(payload) => debug!(payload = %payload, "Completion record payload"),
            Err(e) => warn!(error = %e, "Failed to serialize completion record"),
        }
        Ok(())
    }
}

/// POSTs the record as JSON to a report-generation webhook.
pub struct WebhookReportSink {
    client: reqwest::Client,
    url: String,
    token: Option<SecretString>,
    timeout: Duration,
}

impl WebhookReportSink {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url,
            token: config.token,
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl ReportSink for WebhookReportSink {
    async fn submit(&self, record: &CompletionRecord) -> Result<(), SubmissionError> {
        let mut request = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(record);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SubmissionError::Timeout(self.timeout)
            } else {
                SubmissionError::Http(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Report webhook rejected record");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(
            url = %self.url,
            conversation_length = record.conversation_length,
            "Completion record delivered"
        );
        Ok(())
    }
}
