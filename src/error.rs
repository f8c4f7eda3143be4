//! Error types for the chat client.
//!
//! Every failure the remote endpoint or the transport can produce is mapped
//! onto one of these variants. Errors are surfaced in the transcript and
//! never retried; only [`ChatError::MissingCredential`] and
//! [`ChatError::Config`] abort startup.

use std::error;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum ChatError {
    /// The API key environment variable is absent or blank.
    MissingCredential {
        /// Name of the environment variable that was expected.
        var: &'static str,
    },

    /// Transport failure: connect, TLS, or a dropped response body.
    Network {
        message: String,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The endpoint rejected the credential (401/403).
    Authentication { message: String },

    /// The endpoint throttled the request (429).
    RateLimit { message: String },

    /// Any other non-success response from the endpoint.
    Api { status: u16, message: String },

    /// A stream chunk that is neither a delta nor a terminator.
    UnexpectedResponse { message: String },

    /// Unreadable or unparsable configuration or prompt file.
    Config { message: String },
}

impl ChatError {
    pub fn missing_credential(var: &'static str) -> Self {
        ChatError::MissingCredential { var }
    }

    pub fn network(message: impl Into<String>) -> Self {
        ChatError::Network {
            message: message.into(),
            source: None,
        }
    }

    pub fn network_with_source(
        message: impl Into<String>,
        source: impl error::Error + Send + Sync + 'static,
    ) -> Self {
        ChatError::Network {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ChatError::Authentication {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        ChatError::RateLimit {
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ChatError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn unexpected_response(message: impl Into<String>) -> Self {
        ChatError::UnexpectedResponse {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ChatError::Config {
            message: message.into(),
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ChatError::Authentication { .. })
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ChatError::RateLimit { .. })
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::MissingCredential { var } => {
                write!(f, "Missing credential: set the {var} environment variable")
            }
            ChatError::Network { message, .. } => write!(f, "Network error: {message}"),
            ChatError::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            ChatError::RateLimit { message } => write!(f, "Rate limit exceeded: {message}"),
            ChatError::Api { status, message } => {
                write!(f, "API error (status {status}): {message}")
            }
            ChatError::UnexpectedResponse { message } => {
                write!(f, "Unexpected response: {message}")
            }
            ChatError::Config { message } => write!(f, "Config error: {message}"),
        }
    }
}

impl error::Error for ChatError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ChatError::Network { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::network_with_source(err.to_string(), err)
    }
}
