//! WS-Addressing endpoint interceptor.
//!
//! Sits around an endpoint invocation inside the transport's request
//! pipeline. On the way in it validates addressing headers and rejects
//! malformed or duplicate requests; on the way out it routes the reply to
//! the destination the request asked for: the inbound channel, nowhere, or
//! an out-of-band transport.

use crate::context::MessageContext;
use crate::error::AddressingError;
use crate::message::HeaderElement;
use crate::messageid::MessageIdStrategy;
use crate::sender::MessageSender;
use crate::version::AddressingVersion;
use tracing::{debug, warn};

/// Endpoint interceptor enforcing one WS-Addressing revision.
///
/// All collaborators are bound at construction; the interceptor itself
/// holds no mutable state and can be shared across concurrent exchanges.
pub struct AddressingInterceptor {
    version: Box<dyn AddressingVersion>,
    message_id_strategy: Box<dyn MessageIdStrategy>,
    message_senders: Vec<Box<dyn MessageSender>>,
    reply_action: String,
    fault_action: String,
}

impl AddressingInterceptor {
    pub fn new(
        version: Box<dyn AddressingVersion>,
        message_id_strategy: Box<dyn MessageIdStrategy>,
        message_senders: Vec<Box<dyn MessageSender>>,
        reply_action: impl Into<String>,
        fault_action: impl Into<String>,
    ) -> Self {
        Self {
            version,
            message_id_strategy,
            message_senders,
            reply_action: reply_action.into(),
            fault_action: fault_action.into(),
        }
    }

    /// Whether this interceptor claims responsibility for a header block.
    ///
    /// True for every header name the configured revision defines,
    /// regardless of value. Pure and idempotent.
    pub fn understands(&self, header: &HeaderElement) -> bool {
        self.version.understands(header)
    }

    /// Validate the inbound request before the endpoint is invoked.
    ///
    /// Returns `Ok(true)` when processing should continue. Returns
    /// `Ok(false)` when the request was rejected: either a fault response
    /// has been placed in the context (missing required header) or the
    /// request was silently dropped (duplicate MessageID).
    pub fn handle_request(&self, context: &mut MessageContext) -> Result<bool, AddressingError> {
        let properties = self.version.properties(context.request());

        if let Some(missing) = self.version.missing_required_header(&properties) {
            debug!(
                version = self.version.label(),
                header = missing,
                "rejecting request without required addressing header"
            );
            self.reject_with_fault(context, missing);
            return Ok(false);
        }

        let Some(message_id) = properties.message_id.as_deref() else {
            debug!(
                version = self.version.label(),
                "rejecting request without MessageID header"
            );
            self.reject_with_fault(context, "MessageID");
            return Ok(false);
        };

        if self.message_id_strategy.is_duplicate(message_id) {
            debug!(message_id, "dropping duplicate request");
            return Ok(false);
        }

        Ok(true)
    }

    /// Route the response produced by a successful endpoint invocation.
    ///
    /// Returns `Ok(true)` when the response stays in the context for
    /// delivery over the inbound channel, `Ok(false)` when it was
    /// suppressed or already delivered out-of-band.
    pub fn handle_response(&self, context: &mut MessageContext) -> Result<bool, AddressingError> {
        self.handle_reply(context, false)
    }

    /// Route a fault-bearing response. Mirrors [`handle_response`] but
    /// sources the destination from FaultTo (falling back to ReplyTo) and
    /// stamps the configured fault action.
    ///
    /// [`handle_response`]: Self::handle_response
    pub fn handle_fault(&self, context: &mut MessageContext) -> Result<bool, AddressingError> {
        self.handle_reply(context, true)
    }

    fn handle_reply(
        &self,
        context: &mut MessageContext,
        fault: bool,
    ) -> Result<bool, AddressingError> {
        let properties = self.version.properties(context.request());
        let destination = if fault {
            properties.fault_destination().cloned()
        } else {
            properties.reply_to.clone()
        };

        if let Some(dest) = &destination {
            if self.version.is_none(&dest.address) {
                debug!(fault, "reply suppressed, destination is the none sentinel");
                context.clear_response();
                return Ok(false);
            }
        }

        let action = if fault {
            self.fault_action.as_str()
        } else {
            self.reply_action.as_str()
        };
        let to = destination
            .as_ref()
            .map(|dest| dest.address.clone())
            .unwrap_or_else(|| self.version.anonymous_uri().to_string());

        {
            let response = context.response_mut();
            let message_id = self.message_id_strategy.new_message_id(response);
            debug!(message_id = %message_id, to = %to, action, "stamping reply headers");
            self.version.add_reply_headers(
                response,
                &to,
                action,
                Some(&message_id),
                properties.message_id.as_deref(),
            );
        }

        match destination {
            Some(dest) if !self.version.is_anonymous(&dest.address) => {
                self.send_out_of_band(context, &dest.address)?;
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Place the revision's "missing addressing header" fault in the
    /// context as the reply, addressed back over the inbound channel.
    fn reject_with_fault(&self, context: &mut MessageContext, problem_header: &str) {
        let fault = self.version.header_required_fault(problem_header);
        let anonymous = self.version.anonymous_uri().to_string();
        let response = context.response_mut();
        response.set_fault(fault);
        self.version
            .add_reply_headers(response, &anonymous, &self.reply_action, None, None);
    }

    /// Deliver the response over the first sender that supports the
    /// destination, then clear it so the inbound channel sends nothing.
    fn send_out_of_band(
        &self,
        context: &mut MessageContext,
        uri: &str,
    ) -> Result<(), AddressingError> {
        let Some(sender) = self.message_senders.iter().find(|s| s.supports(uri)) else {
            warn!(uri, "no configured message sender supports the reply destination");
            return Err(AddressingError::NoSuitableSender(uri.to_string()));
        };

        let mut connection = sender.create_connection(uri)?;
        let sent = connection.send(context.response_mut());
        let closed = connection.close();
        context.clear_response();
        sent?;
        closed?;
        Ok(())
    }
}
