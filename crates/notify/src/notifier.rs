use crate::Message;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, Request, Url};
use serde::Serialize;

/// Delivers notifications.
///
/// Delivery is attempted once. Retrying is the caller's decision, informed
/// by [`ErrorKind::is_retryable()`].
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, message: &Message) -> Result<()>;
}

/// Chat webhook payload (Discord and Slack-compatible endpoints).
#[derive(Serialize)]
struct Payload<'a> {
    content: &'a str,
}

/// Posts messages as `{"content": "..."}` JSON to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).or_raise(|| ErrorKind::InvalidUrl(redact(url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            exn::bail!(ErrorKind::InvalidUrl(redact(url.as_str())));
        }
        Ok(Self { client: Client::new(), url })
    }

    fn request(&self, message: &Message) -> Result<Request> {
        let content = message.to_string();
        self.client
            .post(self.url.clone())
            .json(&Payload { content: &content })
            .build()
            .or_raise(|| ErrorKind::Request("could not build webhook request".to_string()))
    }
}

/// Webhook URLs embed their credentials; only the host is ever logged.
fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!("{}://{}/…", parsed.scheme(), parsed.host_str().unwrap_or_default()),
        Err(_) => "<unparseable>".to_string(),
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn post(&self, message: &Message) -> Result<()> {
        let request = self.request(message)?;
        let response = self
            .client
            .execute(request)
            .await
            .or_raise(|| ErrorKind::Request(format!("no response from {}", redact(self.url.as_str()))))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Rejected(status.as_u16()));
        }
        tracing::debug!(source = %message.source, status = status.as_u16(), "Posted notification");
        Ok(())
    }
}

/// Logs messages instead of delivering them.
///
/// Used when notifications are disabled or during a dry run.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn post(&self, message: &Message) -> Result<()> {
        tracing::info!(source = %message.source, content = %message.content, "Notification not sent");
        Ok(())
    }
}

/// Records messages in memory for testing.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MockNotifier {
    messages: tokio::sync::Mutex<Vec<Message>>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "mock"))]
impl MockNotifier {
    /// Make every subsequent post fail, without recording the message.
    pub fn failing(self) -> Self {
        self.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        self
    }

    /// Messages posted so far, oldest first.
    pub async fn messages(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl Notifier for MockNotifier {
    async fn post(&self, message: &Message) -> Result<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            exn::bail!(ErrorKind::Rejected(500));
        }
        self.messages.lock().await.push(message.clone());
        Ok(())
    }
}
