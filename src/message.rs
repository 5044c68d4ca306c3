//! Typed SOAP envelope model.
//!
//! The model is deliberately shallow: this crate routes and stamps messages,
//! it does not interpret payloads. Headers are fully represented (including
//! the one level of nesting an endpoint reference needs); the body records
//! only its first payload element and any attached fault.

use serde::{Deserialize, Serialize};

/// SOAP namespace URIs.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// SOAP envelope versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoapVersion {
    /// SOAP 1.1 (namespace: http://schemas.xmlsoap.org/soap/envelope/)
    #[serde(rename = "1.1")]
    Soap11,
    /// SOAP 1.2 (namespace: http://www.w3.org/2003/05/soap-envelope)
    #[serde(rename = "1.2")]
    Soap12,
}

impl SoapVersion {
    /// Envelope namespace URI for this version.
    pub fn envelope_namespace(&self) -> &'static str {
        match self {
            Self::Soap11 => SOAP_11_NS,
            Self::Soap12 => SOAP_12_NS,
        }
    }

    /// Content-Type header value used when sending a message over HTTP.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Soap11 => "text/xml; charset=utf-8",
            Self::Soap12 => "application/soap+xml; charset=utf-8",
        }
    }
}

/// A namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, empty for unqualified names.
    pub namespace: String,
    /// Local part of the name.
    pub local_name: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }
}

/// A single SOAP header block.
#[derive(Debug, Clone)]
pub struct HeaderElement {
    /// Qualified element name.
    pub name: QName,
    /// Direct text content, if any.
    pub text: Option<String>,
    /// Child elements as (name, text) pairs. One level is enough to carry
    /// an endpoint reference's `Address`.
    pub children: Vec<(QName, String)>,
    /// Whether the header carries a mustUnderstand="1" attribute.
    pub must_understand: bool,
}

impl HeaderElement {
    /// A text-only header block.
    pub fn text(name: QName, text: impl Into<String>) -> Self {
        Self {
            name,
            text: Some(text.into()),
            children: Vec::new(),
            must_understand: false,
        }
    }

    /// Mark the header mustUnderstand="1".
    pub fn must_understand(mut self) -> Self {
        self.must_understand = true;
        self
    }

    /// Text of the named child element, if present.
    pub fn child_text(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|(name, _)| name.namespace == namespace && name.local_name == local_name)
            .map(|(_, text)| text.as_str())
    }
}

/// A SOAP fault to be attached to a message body.
#[derive(Debug, Clone)]
pub struct SoapFault {
    /// Fault subcode (SOAP 1.2) or qualified fault code (SOAP 1.1).
    /// A plain sender/client fault is emitted when absent.
    pub subcode: Option<QName>,
    /// Human-readable fault reason.
    pub reason: String,
    /// Offending header name, rendered in the fault detail.
    pub problem_header: Option<QName>,
}

impl SoapFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            subcode: None,
            reason: reason.into(),
            problem_header: None,
        }
    }
}

/// SOAP body contents.
#[derive(Debug, Clone, Default)]
pub struct SoapBody {
    /// First child element of the Body, when the message carries a payload.
    pub payload: Option<QName>,
    /// Fault attached to the Body, when the message carries a fault.
    pub fault: Option<SoapFault>,
}

impl SoapBody {
    pub fn is_empty(&self) -> bool {
        self.payload.is_none() && self.fault.is_none()
    }
}

/// A SOAP message: an envelope with a header section and a body section.
#[derive(Debug, Clone)]
pub struct SoapMessage {
    /// Envelope version.
    pub version: SoapVersion,
    /// Header blocks, in document order.
    pub headers: Vec<HeaderElement>,
    /// Body contents.
    pub body: SoapBody,
}

impl SoapMessage {
    /// Create an empty message for the given envelope version.
    pub fn new(version: SoapVersion) -> Self {
        Self {
            version,
            headers: Vec::new(),
            body: SoapBody::default(),
        }
    }

    /// Find a header block by qualified name.
    pub fn find_header(&self, namespace: &str, local_name: &str) -> Option<&HeaderElement> {
        self.headers
            .iter()
            .find(|h| h.name.namespace == namespace && h.name.local_name == local_name)
    }

    /// Attach a fault to the body, replacing any payload.
    pub fn set_fault(&mut self, fault: SoapFault) {
        self.body.payload = None;
        self.body.fault = Some(fault);
    }

    pub fn has_fault(&self) -> bool {
        self.body.fault.is_some()
    }

    /// Serialize the message to an XML document.
    pub fn to_xml(&self) -> String {
        let soap_ns = self.version.envelope_namespace();

        let header_section = if self.headers.is_empty() {
            String::new()
        } else {
            let blocks = self
                .headers
                .iter()
                .map(render_header)
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n  <soap:Header>\n{}\n  </soap:Header>", blocks)
        };

        let body_section = match (&self.body.fault, &self.body.payload) {
            (Some(fault), _) => render_fault(fault, self.version),
            (None, Some(payload)) => render_payload(payload),
            (None, None) => String::new(),
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="{}">{}
  <soap:Body>{}</soap:Body>
</soap:Envelope>"#,
            soap_ns, header_section, body_section
        )
    }
}

fn render_header(header: &HeaderElement) -> String {
    let local = &header.name.local_name;
    let ns_decl = if header.name.namespace.is_empty() {
        String::new()
    } else {
        format!(" xmlns:h=\"{}\"", xml_escape(&header.name.namespace))
    };
    let prefix = if header.name.namespace.is_empty() { "" } else { "h:" };
    let mu = if header.must_understand {
        " soap:mustUnderstand=\"1\""
    } else {
        ""
    };

    if header.children.is_empty() {
        let text = header.text.as_deref().unwrap_or("");
        format!(
            "    <{prefix}{local}{ns_decl}{mu}>{}</{prefix}{local}>",
            xml_escape(text)
        )
    } else {
        let children = header
            .children
            .iter()
            .map(|(name, text)| {
                if name.namespace == header.name.namespace {
                    format!(
                        "      <{prefix}{}>{}</{prefix}{}>",
                        name.local_name,
                        xml_escape(text),
                        name.local_name
                    )
                } else {
                    format!(
                        "      <c:{} xmlns:c=\"{}\">{}</c:{}>",
                        name.local_name,
                        xml_escape(&name.namespace),
                        xml_escape(text),
                        name.local_name
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("    <{prefix}{local}{ns_decl}{mu}>\n{children}\n    </{prefix}{local}>")
    }
}

fn render_payload(payload: &QName) -> String {
    if payload.namespace.is_empty() {
        format!("\n    <{}/>\n  ", payload.local_name)
    } else {
        format!(
            "\n    <p:{} xmlns:p=\"{}\"/>\n  ",
            payload.local_name,
            xml_escape(&payload.namespace)
        )
    }
}

fn render_fault(fault: &SoapFault, version: SoapVersion) -> String {
    // The subcode and problem header share one namespace in practice (both
    // come from the same addressing version), so a single prefix suffices.
    let wsa_ns = fault
        .subcode
        .as_ref()
        .map(|q| q.namespace.as_str())
        .or_else(|| fault.problem_header.as_ref().map(|q| q.namespace.as_str()));
    let ns_decl = match wsa_ns {
        Some(ns) => format!(" xmlns:wsa=\"{}\"", xml_escape(ns)),
        None => String::new(),
    };

    let detail = |tag: &str| -> String {
        match &fault.problem_header {
            Some(q) => format!(
                "\n      <{tag}>\n        <wsa:ProblemHeaderQName>wsa:{}</wsa:ProblemHeaderQName>\n      </{tag}>",
                q.local_name
            ),
            None => String::new(),
        }
    };

    match version {
        SoapVersion::Soap11 => {
            let faultcode = match &fault.subcode {
                Some(q) => format!("wsa:{}", q.local_name),
                None => "soap:Client".to_string(),
            };
            format!(
                r#"
    <soap:Fault{ns_decl}>
      <faultcode>{}</faultcode>
      <faultstring xml:lang="en">{}</faultstring>{}
    </soap:Fault>
  "#,
                faultcode,
                xml_escape(&fault.reason),
                detail("detail")
            )
        }
        SoapVersion::Soap12 => {
            let subcode = match &fault.subcode {
                Some(q) => format!(
                    "\n        <soap:Subcode>\n          <soap:Value>wsa:{}</soap:Value>\n        </soap:Subcode>",
                    q.local_name
                ),
                None => String::new(),
            };
            format!(
                r#"
    <soap:Fault{ns_decl}>
      <soap:Code>
        <soap:Value>soap:Sender</soap:Value>{}
      </soap:Code>
      <soap:Reason>
        <soap:Text xml:lang="en">{}</soap:Text>
      </soap:Reason>{}
    </soap:Fault>
  "#,
                subcode,
                xml_escape(&fault.reason),
                detail("soap:Detail")
            )
        }
    }
}

pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_to_xml() {
        let message = SoapMessage::new(SoapVersion::Soap11);
        let xml = message.to_xml();
        assert!(xml.contains(SOAP_11_NS));
        assert!(xml.contains("<soap:Body></soap:Body>"));
        assert!(!xml.contains("<soap:Header>"));
    }

    #[test]
    fn test_header_rendering() {
        let mut message = SoapMessage::new(SoapVersion::Soap11);
        let ns = "http://www.w3.org/2005/08/addressing";
        message.headers.push(
            HeaderElement::text(QName::new(ns, "To"), "http://example.com/sink").must_understand(),
        );
        message
            .headers
            .push(HeaderElement::text(QName::new(ns, "MessageID"), "uid:1234"));

        let xml = message.to_xml();
        assert!(xml.contains("<h:To xmlns:h=\"http://www.w3.org/2005/08/addressing\" soap:mustUnderstand=\"1\">http://example.com/sink</h:To>"));
        assert!(xml.contains("<h:MessageID xmlns:h=\"http://www.w3.org/2005/08/addressing\">uid:1234</h:MessageID>"));
    }

    #[test]
    fn test_nested_header_rendering() {
        let ns = "http://www.w3.org/2005/08/addressing";
        let mut message = SoapMessage::new(SoapVersion::Soap11);
        message.headers.push(HeaderElement {
            name: QName::new(ns, "ReplyTo"),
            text: None,
            children: vec![(QName::new(ns, "Address"), "http://example.com/client".to_string())],
            must_understand: false,
        });

        let xml = message.to_xml();
        assert!(xml.contains("<h:ReplyTo xmlns:h=\"http://www.w3.org/2005/08/addressing\">"));
        assert!(xml.contains("<h:Address>http://example.com/client</h:Address>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut message = SoapMessage::new(SoapVersion::Soap11);
        message.headers.push(HeaderElement::text(
            QName::new("urn:example", "Note"),
            "a < b & c",
        ));
        let xml = message.to_xml();
        assert!(xml.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_soap_11_fault() {
        let ns = "http://www.w3.org/2005/08/addressing";
        let mut message = SoapMessage::new(SoapVersion::Soap11);
        message.set_fault(SoapFault {
            subcode: Some(QName::new(ns, "MessageAddressingHeaderRequired")),
            reason: "A required header representing a Message Addressing Property is not present"
                .to_string(),
            problem_header: Some(QName::new(ns, "MessageID")),
        });

        let xml = message.to_xml();
        assert!(xml.contains("<faultcode>wsa:MessageAddressingHeaderRequired</faultcode>"));
        assert!(xml.contains("xmlns:wsa=\"http://www.w3.org/2005/08/addressing\""));
        assert!(xml.contains("<wsa:ProblemHeaderQName>wsa:MessageID</wsa:ProblemHeaderQName>"));
    }

    #[test]
    fn test_soap_12_fault() {
        let ns = "http://www.w3.org/2005/08/addressing";
        let mut message = SoapMessage::new(SoapVersion::Soap12);
        message.set_fault(SoapFault {
            subcode: Some(QName::new(ns, "MessageAddressingHeaderRequired")),
            reason: "A required header representing a Message Addressing Property is not present"
                .to_string(),
            problem_header: Some(QName::new(ns, "MessageID")),
        });

        let xml = message.to_xml();
        assert!(xml.contains("<soap:Value>soap:Sender</soap:Value>"));
        assert!(xml.contains("<soap:Value>wsa:MessageAddressingHeaderRequired</soap:Value>"));
        assert!(xml.contains("<soap:Text xml:lang=\"en\">"));
    }

    #[test]
    fn test_set_fault_replaces_payload() {
        let mut message = SoapMessage::new(SoapVersion::Soap11);
        message.body.payload = Some(QName::new("urn:example", "Echo"));
        message.set_fault(SoapFault::new("boom"));
        assert!(message.has_fault());
        assert!(message.body.payload.is_none());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(SoapVersion::Soap11.content_type(), "text/xml; charset=utf-8");
        assert_eq!(
            SoapVersion::Soap12.content_type(),
            "application/soap+xml; charset=utf-8"
        );
    }
}
