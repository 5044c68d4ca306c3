//! WS-Addressing protocol revisions.
//!
//! Each revision defines its own namespace, header-name set, sentinel URIs
//! and fault vocabulary. The extraction and stamping logic is shared; only
//! the constants differ between revisions.

use crate::message::{HeaderElement, QName, SoapFault, SoapMessage};

/// WS-Addressing 1.0 namespace (W3C Recommendation, May 2005).
pub const WSA_10_NS: &str = "http://www.w3.org/2005/08/addressing";
/// WS-Addressing August 2004 member submission namespace.
pub const WSA_200408_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";

/// Header local names shared by both supported revisions.
const HEADER_NAMES: &[&str] = &[
    "To",
    "From",
    "ReplyTo",
    "FaultTo",
    "Action",
    "MessageID",
    "RelatesTo",
];

/// Reference to an endpoint that can receive messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReference {
    /// Destination URI.
    pub address: String,
}

impl EndpointReference {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Addressing properties extracted from one message.
///
/// The same raw header set parses differently under different revisions;
/// extraction is always performed through a concrete [`AddressingVersion`].
#[derive(Debug, Clone, Default)]
pub struct MessageAddressingProperties {
    pub to: Option<String>,
    pub action: Option<String>,
    pub message_id: Option<String>,
    pub reply_to: Option<EndpointReference>,
    pub fault_to: Option<EndpointReference>,
    pub relates_to: Option<String>,
}

impl MessageAddressingProperties {
    /// Destination for a fault: FaultTo, falling back to ReplyTo.
    pub fn fault_destination(&self) -> Option<&EndpointReference> {
        self.fault_to.as_ref().or(self.reply_to.as_ref())
    }
}

/// One WS-Addressing revision: namespaces, sentinel URIs and fault shapes.
///
/// The closed set of implementations is [`Addressing10`] and
/// [`Addressing200408`]; pick one per interceptor.
pub trait AddressingVersion: Send + Sync {
    /// Namespace URI of this revision's headers.
    fn namespace(&self) -> &'static str;

    /// The "anonymous" sentinel: deliver the reply over the inbound channel.
    fn anonymous_uri(&self) -> &'static str;

    /// The "none" sentinel: suppress the reply. Absent in revisions that
    /// predate it.
    fn none_uri(&self) -> Option<&'static str>;

    /// Revision label used in logs.
    fn label(&self) -> &'static str;

    /// First required header (besides MessageID) missing from the given
    /// properties, if any.
    fn missing_required_header(&self, properties: &MessageAddressingProperties)
        -> Option<&'static str>;

    /// The protocol fault reporting a missing addressing header.
    fn header_required_fault(&self, problem_header: &str) -> SoapFault;

    /// Whether this interceptor claims responsibility for the given header.
    fn understands(&self, header: &HeaderElement) -> bool {
        header.name.namespace == self.namespace()
            && HEADER_NAMES.contains(&header.name.local_name.as_str())
    }

    fn is_anonymous(&self, uri: &str) -> bool {
        uri == self.anonymous_uri()
    }

    fn is_none(&self, uri: &str) -> bool {
        self.none_uri() == Some(uri)
    }

    /// Extract the addressing properties of a message under this revision.
    fn properties(&self, message: &SoapMessage) -> MessageAddressingProperties {
        let ns = self.namespace();
        let text_of = |local: &str| {
            message
                .find_header(ns, local)
                .and_then(|h| h.text.clone())
                .filter(|t| !t.is_empty())
        };
        let endpoint_of = |local: &str| {
            message
                .find_header(ns, local)
                .and_then(|h| h.child_text(ns, "Address"))
                .map(EndpointReference::new)
        };

        MessageAddressingProperties {
            to: text_of("To"),
            action: text_of("Action"),
            message_id: text_of("MessageID"),
            reply_to: endpoint_of("ReplyTo"),
            fault_to: endpoint_of("FaultTo"),
            relates_to: text_of("RelatesTo"),
        }
    }

    /// Stamp reply headers onto an outbound message: To (mustUnderstand),
    /// Action, and when available MessageID and RelatesTo.
    fn add_reply_headers(
        &self,
        message: &mut SoapMessage,
        to: &str,
        action: &str,
        message_id: Option<&str>,
        relates_to: Option<&str>,
    ) {
        let ns = self.namespace();
        message
            .headers
            .push(HeaderElement::text(QName::new(ns, "To"), to).must_understand());
        message
            .headers
            .push(HeaderElement::text(QName::new(ns, "Action"), action));
        if let Some(id) = message_id {
            message
                .headers
                .push(HeaderElement::text(QName::new(ns, "MessageID"), id));
        }
        if let Some(relates) = relates_to {
            message
                .headers
                .push(HeaderElement::text(QName::new(ns, "RelatesTo"), relates));
        }
    }
}

/// WS-Addressing 1.0 (2005/08 namespace).
#[derive(Debug, Clone, Copy, Default)]
pub struct Addressing10;

impl AddressingVersion for Addressing10 {
    fn namespace(&self) -> &'static str {
        WSA_10_NS
    }

    fn anonymous_uri(&self) -> &'static str {
        "http://www.w3.org/2005/08/addressing/anonymous"
    }

    fn none_uri(&self) -> Option<&'static str> {
        Some("http://www.w3.org/2005/08/addressing/none")
    }

    fn label(&self) -> &'static str {
        "1.0"
    }

    fn missing_required_header(
        &self,
        properties: &MessageAddressingProperties,
    ) -> Option<&'static str> {
        // To defaults to anonymous in 1.0, so only Action is required here.
        if properties.action.is_none() {
            Some("Action")
        } else {
            None
        }
    }

    fn header_required_fault(&self, problem_header: &str) -> SoapFault {
        SoapFault {
            subcode: Some(QName::new(WSA_10_NS, "MessageAddressingHeaderRequired")),
            reason: "A required header representing a Message Addressing Property is not present"
                .to_string(),
            problem_header: Some(QName::new(WSA_10_NS, problem_header)),
        }
    }
}

/// WS-Addressing August 2004 member submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct Addressing200408;

impl AddressingVersion for Addressing200408 {
    fn namespace(&self) -> &'static str {
        WSA_200408_NS
    }

    fn anonymous_uri(&self) -> &'static str {
        "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous"
    }

    fn none_uri(&self) -> Option<&'static str> {
        // The 2004/08 revision has no "none" sentinel.
        None
    }

    fn label(&self) -> &'static str {
        "2004/08"
    }

    fn missing_required_header(
        &self,
        properties: &MessageAddressingProperties,
    ) -> Option<&'static str> {
        if properties.to.is_none() {
            Some("To")
        } else if properties.action.is_none() {
            Some("Action")
        } else {
            None
        }
    }

    fn header_required_fault(&self, _problem_header: &str) -> SoapFault {
        SoapFault {
            subcode: Some(QName::new(WSA_200408_NS, "MessageInformationHeaderRequired")),
            reason:
                "A required message information header, To, MessageID, or Action, is not present."
                    .to_string(),
            problem_header: None,
        }
    }
}
