//! Error types for WS-Addressing message processing.

use thiserror::Error;

/// Errors surfaced by addressing interception and out-of-band delivery.
///
/// Malformed and duplicate requests are *not* errors: the interceptor
/// recovers from them locally by synthesizing a fault response or dropping
/// the request. Only envelope-level parse failures, misconfiguration and
/// transport failures reach the caller.
#[derive(Error, Debug)]
pub enum AddressingError {
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("invalid SOAP envelope: {0}")]
    InvalidEnvelope(String),

    #[error("no configured message sender supports destination URI '{0}'")]
    NoSuitableSender(String),

    #[error("transport error sending to '{uri}': {message}")]
    Transport { uri: String, message: String },
}

impl AddressingError {
    /// Shorthand for a transport failure against a destination URI.
    pub fn transport(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            uri: uri.into(),
            message: message.into(),
        }
    }
}
