//! Out-of-band message delivery.
//!
//! A sender represents one transport family. Senders are consulted in
//! configuration order; the first one that supports a destination URI opens
//! a connection for it.

use crate::error::AddressingError;
use crate::message::SoapMessage;
use tracing::{debug, warn};
use ureq::Agent;

/// One out-of-band transport.
pub trait MessageSender: Send + Sync {
    /// Capability query: can this sender deliver to the given URI?
    /// Pure, no side effects.
    fn supports(&self, uri: &str) -> bool;

    /// Open a transport-level connection to the destination.
    fn create_connection(&self, uri: &str)
        -> Result<Box<dyn MessageConnection>, AddressingError>;
}

/// An open connection to one destination.
///
/// The interceptor closes every connection it opens, on success and on
/// failure alike.
pub trait MessageConnection {
    /// Deliver one message over this connection.
    fn send(&mut self, message: &SoapMessage) -> Result<(), AddressingError>;

    /// Release the connection.
    fn close(&mut self) -> Result<(), AddressingError>;
}

/// Default sender delivering messages with a blocking HTTP POST.
pub struct HttpMessageSender {
    agent: Agent,
}

impl HttpMessageSender {
    pub fn new() -> Self {
        // Non-2xx statuses must not abort the send: a 500 from the
        // destination is still a completed delivery of a one-way reply.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for HttpMessageSender {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSender for HttpMessageSender {
    fn supports(&self, uri: &str) -> bool {
        uri.starts_with("http://") || uri.starts_with("https://")
    }

    fn create_connection(
        &self,
        uri: &str,
    ) -> Result<Box<dyn MessageConnection>, AddressingError> {
        Ok(Box::new(HttpConnection {
            agent: self.agent.clone(),
            uri: uri.to_string(),
        }))
    }
}

struct HttpConnection {
    agent: Agent,
    uri: String,
}

impl MessageConnection for HttpConnection {
    fn send(&mut self, message: &SoapMessage) -> Result<(), AddressingError> {
        let body = message.to_xml();
        let response = self
            .agent
            .post(&self.uri)
            .header("Content-Type", message.version.content_type())
            .send(body)
            .map_err(|e| AddressingError::transport(&self.uri, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(uri = %self.uri, status = %status, "delivered out-of-band message");
        } else {
            warn!(uri = %self.uri, status = %status, "out-of-band destination answered with an error status");
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), AddressingError> {
        // HTTP connections are released per request; nothing to tear down.
        Ok(())
    }
}
