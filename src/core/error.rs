//! Error types for the level manager

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A logger configuration record could not be parsed
    #[error("Malformed logger configuration: {reason}")]
    MalformedConfig { reason: String },

    /// Unrecognized severity token
    #[error("Invalid log level: '{0}'")]
    InvalidLevel(String),

    /// Request could not be turned into a publishable message
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Broadcast transport refused the message
    #[error("Failed to publish on topic '{topic}': {message}")]
    Transport { topic: String, message: String },

    /// A handler is already registered for the topic on this instance
    #[error("Topic '{topic}' already has a subscriber")]
    AlreadySubscribed { topic: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create a malformed configuration error
    pub fn malformed(reason: impl Into<String>) -> Self {
        LoggerError::MalformedConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        LoggerError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a transport error for a topic
    pub fn transport(topic: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Transport {
            topic: topic.into(),
            message: message.into(),
        }
    }

    pub fn already_subscribed(topic: impl Into<String>) -> Self {
        LoggerError::AlreadySubscribed {
            topic: topic.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
