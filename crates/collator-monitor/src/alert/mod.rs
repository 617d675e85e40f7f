use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::aggregator::RunReport;

pub const ALERT_TIMEOUT: Duration = Duration::from_secs(10);
pub const ALERT_COLOR: u32 = 0xFF0000;
pub const TEST_COLOR: u32 = 65280;

// Discord embed limits
const MAX_FIELDS: usize = 25;
const MAX_FIELD_VALUE: usize = 1024;
const MAX_EMBED_CHARS: usize = 6000;
// Room kept for the "more entries omitted" field.
const OVERFLOW_FIELD_CHARS: usize = 64;

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("failed to deliver alert: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook rejected alert with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn char_count(&self) -> usize {
        self.name.chars().count() + self.value.chars().count()
    }

    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: truncate(&value.into(), MAX_FIELD_VALUE),
            inline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub fields: Vec<EmbedField>,
}

/// Body of a Discord-compatible webhook POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

impl WebhookMessage {
    /// Missing operators grouped by name, then one field per failed chain.
    pub fn from_report(report: &RunReport) -> Self {
        let mut fields = Vec::new();
        for (operator, records) in &report.missing {
            if records.is_empty() {
                continue;
            }
            let chains = records
                .iter()
                .map(|record| format!("• {} (`{}`)", record.chain_name, record.rpc_url))
                .collect::<Vec<_>>()
                .join("\n");
            fields.push(EmbedField::new(format!("❌ {operator} missing"), chains));
        }
        for error in &report.errors {
            fields.push(EmbedField::new(
                format!("⚠️ {}", error.chain_name),
                format!("`{}`\n{}", error.rpc_url, error.error_message),
            ));
        }

        let title = "Collator check found problems".to_string();
        let description = format!(
            "{} missing collator placement(s), {} chain error(s), {} chain(s) checked",
            report.missing_count(),
            report.errors.len(),
            report.chains_checked
        );
        let budget = MAX_EMBED_CHARS - title.chars().count() - description.chars().count();
        let fields = cap_fields(fields, budget);

        Self {
            content: Some("🚨 Collator Monitor Alert".to_string()),
            embeds: vec![Embed {
                title,
                description: Some(description),
                color: ALERT_COLOR,
                timestamp: Some(timestamp()),
                fields,
            }],
        }
    }

    /// Fixed payload for verifying that the webhook is wired up.
    pub fn test_message() -> Self {
        Self {
            content: Some("🔔 This is a TEST alert from Collator Monitor".to_string()),
            embeds: vec![Embed {
                title: "TEST Notification".to_string(),
                description: Some("If you see this, your webhook is working!".to_string()),
                color: TEST_COLOR,
                timestamp: Some(timestamp()),
                fields: vec![EmbedField {
                    name: "Test Field".to_string(),
                    value: "Everything looks good!".to_string(),
                    inline: true,
                }],
            }],
        }
    }

    pub fn config_failure(error: &str) -> Self {
        Self {
            content: Some("🚨 Collator Monitor failed to start".to_string()),
            embeds: vec![Embed {
                title: "Configuration error".to_string(),
                description: None,
                color: ALERT_COLOR,
                timestamp: Some(timestamp()),
                fields: vec![EmbedField::new("Error", error)],
            }],
        }
    }
}

fn timestamp() -> String {
    #[cfg(test)]
    let timestamp = "2024-01-01T00:00:00Z".to_string();
    #[cfg(not(test))]
    let timestamp = chrono::Utc::now().to_rfc3339();

    timestamp
}

/// Keeps fields in order while they fit both the field count and the
/// character `budget`; the rest collapse into one summary field.
fn cap_fields(fields: Vec<EmbedField>, budget: usize) -> Vec<EmbedField> {
    let total: usize = fields.iter().map(EmbedField::char_count).sum();
    if fields.len() <= MAX_FIELDS && total <= budget {
        return fields;
    }

    let budget = budget.saturating_sub(OVERFLOW_FIELD_CHARS);
    let count = fields.len();
    let mut kept = Vec::new();
    let mut used = 0;
    for field in fields {
        let size = field.char_count();
        if kept.len() == MAX_FIELDS - 1 || used + size > budget {
            break;
        }
        used += size;
        kept.push(field);
    }

    let omitted = count - kept.len();
    kept.push(EmbedField::new(
        "…",
        format!("{omitted} more entries omitted, see the monitor log"),
    ));
    kept
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    Skipped,
    Sent,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    webhook_url: String,
    client: Client,
}

impl AlertDispatcher {
    pub fn new(webhook_url: String) -> Result<Self, AlertError> {
        let client = Client::builder().timeout(ALERT_TIMEOUT).build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }

    /// Webhook host for log lines; the full URL carries a secret token.
    fn redacted_url(&self) -> String {
        Url::parse(&self.webhook_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "<invalid webhook url>".to_string())
    }

    pub async fn send(&self, message: &WebhookMessage) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::Rejected { status, body });
        }
        debug!("Webhook to {} triggered successfully", self.redacted_url());
        Ok(())
    }

    /// Sends the run summary if anything needs attention, or the test
    /// payload when `test_mode` is set. Delivery failures are only logged.
    pub async fn dispatch(&self, report: &RunReport, test_mode: bool) -> AlertOutcome {
        let message = if test_mode {
            WebhookMessage::test_message()
        } else if report.has_alerts() {
            WebhookMessage::from_report(report)
        } else {
            info!("No missing collators or chain errors, no alert sent");
            return AlertOutcome::Skipped;
        };

        match self.send(&message).await {
            Ok(()) => {
                info!("Alert sent to {}", self.redacted_url());
                AlertOutcome::Sent
            }
            Err(e) => {
                error!("Failed to send alert to {}: {e}", self.redacted_url());
                AlertOutcome::Failed
            }
        }
    }
}
