//! Error types for Medchat.

use thiserror::Error;

/// Medchat error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Persona identifier outside the fixed set
    #[error("unknown persona: {id}")]
    UnknownPersona { id: String },

    /// Configuration error (missing credential, bad config file)
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote model call failed (error status, malformed response)
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Transport-level failure (connect, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether the error is recoverable at the turn level.
    ///
    /// Upstream and network failures leave the conversation intact; the user
    /// can simply submit another turn. Everything else is fatal to the
    /// operation that raised it.
    pub fn is_turn_recoverable(&self) -> bool {
        matches!(self, Error::Upstream(_) | Error::Network(_))
    }
}

/// Result type alias for Medchat.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_is_turn_recoverable() {
        assert!(Error::Upstream("rate limited".to_string()).is_turn_recoverable());
        assert!(Error::Network("connection refused".to_string()).is_turn_recoverable());
    }

    #[test]
    fn test_config_is_not_turn_recoverable() {
        assert!(!Error::Config("missing key".to_string()).is_turn_recoverable());
        assert!(!Error::UnknownPersona {
            id: "oncologist".to_string()
        }
        .is_turn_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::UnknownPersona {
            id: "wizard".to_string(),
        };
        assert_eq!(err.to_string(), "unknown persona: wizard");
    }
}
