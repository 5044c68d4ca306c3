//! Message exchange context.

use crate::message::SoapMessage;

/// Pairs an inbound request with its on-demand-created response.
///
/// Created per incoming request by the surrounding transport and destroyed
/// after the exchange completes. `has_response` is true iff a response
/// message has been materialized; once a response exists it persists until
/// explicitly cleared.
#[derive(Debug)]
pub struct MessageContext {
    request: SoapMessage,
    response: Option<SoapMessage>,
}

impl MessageContext {
    pub fn new(request: SoapMessage) -> Self {
        Self {
            request,
            response: None,
        }
    }

    pub fn request(&self) -> &SoapMessage {
        &self.request
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// The response message, created empty on first access with the same
    /// envelope version as the request.
    pub fn response_mut(&mut self) -> &mut SoapMessage {
        let version = self.request.version;
        self.response.get_or_insert_with(|| SoapMessage::new(version))
    }

    pub fn response(&self) -> Option<&SoapMessage> {
        self.response.as_ref()
    }

    /// Drop the response so that nothing is delivered over the inbound channel.
    pub fn clear_response(&mut self) {
        self.response = None;
    }
}
