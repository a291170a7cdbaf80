use derive_more::Display;

/// A notification, rendered as `Message from <source> : <content>`.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("Message from {source} : {content}")]
pub struct Message {
    pub source: String,
    pub content: String,
}

impl Message {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self { source: source.into(), content: content.into() }
    }
}
