//! Human-readable notifications of reconciliation outcomes.
//!
//! Every message names its source (the flow that produced it) and is
//! rendered as `Message from <source> : <content>` before delivery.

pub mod error;
mod message;
mod notifier;

pub use crate::message::Message;
#[cfg(any(test, feature = "mock"))]
pub use crate::notifier::MockNotifier;
pub use crate::notifier::{Notifier, NullNotifier, WebhookNotifier};
use std::sync::Arc;

pub type NotifierHandle = Arc<dyn Notifier + Send + Sync>;
