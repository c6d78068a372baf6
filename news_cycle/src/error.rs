//! Error types for the news pipeline.

use thiserror::Error;

use crate::events::EventId;

/// Errors that can surface from the pipeline's fallible edges: the content
/// source, cache persistence and configuration parsing.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("content source failed: {0}")]
    ContentSource(String),

    #[error("content fetch timed out after {0:?}")]
    FetchTimeout(std::time::Duration),

    #[error("cache io error: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("cache encoding error: {0}")]
    CacheFormat(#[from] serde_json::Error),

    #[error("unsupported cache snapshot version {0}")]
    CacheVersion(u32),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;

/// A player command that referenced something that does not exist or can no
/// longer be acted on. No state is mutated when a command is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandRejected {
    #[error("no active event with id {0}")]
    UnknownEvent(EventId),

    #[error("event {event_id} has no response option '{option_id}'")]
    UnknownOption { event_id: EventId, option_id: String },

    #[error("event {0} is already closed")]
    EventClosed(EventId),
}

impl CommandRejected {
    /// Reason string handed to the presentation layer.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
