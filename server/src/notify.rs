//! Best-effort notification of new contact submissions.
//!
//! Notifiers run after a submission has been persisted. Whatever happens inside
//! one (error, timeout, panic) is logged and dropped here; the caller only gets
//! a [`DispatchReport`].

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use folio_common::ContactSubmission;
use futures::FutureExt;
use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::NotifyError;

/// Default per-notifier timeout.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// An out-of-band channel told about each accepted submission.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn notify(&self, submission: &ContactSubmission) -> Result<(), NotifyError>;
}

/// Emits one structured log event per submission.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, submission: &ContactSubmission) -> Result<(), NotifyError> {
        info!(
            timestamp = %Utc::now().to_rfc3339(),
            name = %submission.name,
            email = %submission.email,
            company = %submission.company_or("Not provided"),
            message = %submission.message,
            "new contact form submission"
        );
        Ok(())
    }
}

/// Body accepted by form-to-email relays.
#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    name: &'a str,
    email: &'a str,
    company: &'a str,
    message: &'a str,
    #[serde(rename = "_replyto")]
    reply_to: &'a str,
    #[serde(rename = "_subject")]
    subject: String,
}

impl<'a> RelayPayload<'a> {
    fn new(submission: &'a ContactSubmission) -> Self {
        RelayPayload {
            name: &submission.name,
            email: &submission.email,
            company: submission.company_or(""),
            message: &submission.message,
            reply_to: &submission.email,
            subject: format!("New message from {} - Portfolio Website", submission.name),
        }
    }
}

/// Forwards submissions to a third-party email relay over HTTP.
#[derive(Debug, Clone)]
pub struct RelayNotifier {
    client: reqwest::Client,
    url: String,
}

impl RelayNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        RelayNotifier {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn notify(&self, submission: &ContactSubmission) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(&RelayPayload::new(submission))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Outcome counts for one dispatch. Informational only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Runs every configured notifier in turn, each under its own timeout.
#[derive(Clone)]
pub struct Dispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new(DEFAULT_NOTIFY_TIMEOUT)
    }
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Dispatcher {
            notifiers: Vec::new(),
            timeout,
        }
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Arc::new(notifier));
        self
    }

    pub fn notifier_names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Never fails; failures are logged and counted.
    pub async fn dispatch(&self, submission: &ContactSubmission) -> DispatchReport {
        let mut report = DispatchReport::default();
        for notifier in &self.notifiers {
            match self.run_one(notifier.as_ref(), submission).await {
                Ok(()) => {
                    report.delivered += 1;
                    debug!(notifier = notifier.name(), "notification sent");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(notifier = notifier.name(), error = %e, "failed to send notification");
                }
            }
        }
        report
    }

    async fn run_one(
        &self,
        notifier: &dyn Notifier,
        submission: &ContactSubmission,
    ) -> Result<(), NotifyError> {
        let guarded = AssertUnwindSafe(notifier.notify(submission)).catch_unwind();
        match tokio::time::timeout(self.timeout, guarded).await {
            Err(_) => Err(NotifyError::Timeout(self.timeout)),
            Ok(Err(panic)) => Err(NotifyError::Panicked(panic_message(panic.as_ref()))),
            Ok(Ok(result)) => result,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
