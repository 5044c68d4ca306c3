//! SOAP XML parsing utilities.
//!
//! Uses quick-xml which is safe against XXE by default (doesn't expand
//! entities). Parsing is namespace-aware: addressing headers are matched by
//! resolved namespace URI, not by prefix.

use crate::error::AddressingError;
use crate::message::{
    HeaderElement, QName, SoapBody, SoapMessage, SoapVersion, SOAP_11_NS, SOAP_12_NS,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

/// Parse raw bytes as a SOAP message.
///
/// Header blocks are captured with one level of nesting (enough for an
/// endpoint reference's `Address` child); body content below the first
/// payload element is treated as opaque.
pub fn parse_soap_message(data: &[u8]) -> Result<SoapMessage, AddressingError> {
    let xml = std::str::from_utf8(data)
        .map_err(|e| AddressingError::XmlParse(format!("invalid UTF-8: {}", e)))?;

    check_xxe_patterns(xml)?;

    let mut reader = NsReader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut version: Option<SoapVersion> = None;
    let mut headers: Vec<HeaderElement> = Vec::new();
    let mut payload: Option<QName> = None;

    let mut depth = 0u32;
    let mut in_header = false;
    let mut in_body = false;
    let mut saw_body = false;

    let mut current: Option<HeaderElement> = None;
    let mut current_child: Option<(QName, String)> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = resolved_name(&reader, e);

                if depth == 0 {
                    version = Some(envelope_version(&name)?);
                } else if depth == 1 {
                    if name.local_name == "Header" && is_envelope_ns(&name, version) {
                        in_header = true;
                    } else if name.local_name == "Body" && is_envelope_ns(&name, version) {
                        in_body = true;
                        saw_body = true;
                    }
                } else if in_header {
                    if depth == 2 {
                        current = Some(HeaderElement {
                            name,
                            text: None,
                            children: Vec::new(),
                            must_understand: get_must_understand(e),
                        });
                    } else if depth == 3 {
                        current_child = Some((name, String::new()));
                    }
                } else if in_body && depth == 2 && payload.is_none() {
                    payload = Some(name);
                }

                depth += 1;
            }

            Ok(Event::Empty(ref e)) => {
                // Self-closing tags, e.g. <soap:Body/> or an empty header block.
                let name = resolved_name(&reader, e);

                if depth == 0 {
                    version = Some(envelope_version(&name)?);
                } else if depth == 1 {
                    if name.local_name == "Body" && is_envelope_ns(&name, version) {
                        saw_body = true;
                    }
                } else if in_header {
                    if depth == 2 {
                        headers.push(HeaderElement {
                            name,
                            text: None,
                            children: Vec::new(),
                            must_understand: get_must_understand(e),
                        });
                    } else if depth == 3 {
                        if let Some(cur) = current.as_mut() {
                            cur.children.push((name, String::new()));
                        }
                    }
                } else if in_body && depth == 2 && payload.is_none() {
                    payload = Some(name);
                }
            }

            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);

                if depth == 1 {
                    if in_header {
                        in_header = false;
                    } else if in_body {
                        in_body = false;
                    }
                } else if in_header {
                    if depth == 2 {
                        if let Some(cur) = current.take() {
                            headers.push(cur);
                        }
                    } else if depth == 3 {
                        if let (Some(child), Some(cur)) = (current_child.take(), current.as_mut()) {
                            cur.children.push(child);
                        }
                    }
                }
            }

            Ok(Event::Text(ref e)) => {
                if in_header && (depth == 3 || depth == 4) {
                    let text = e
                        .decode()
                        .map_err(|err| AddressingError::XmlParse(err.to_string()))?;
                    if depth == 4 {
                        if let Some(child) = current_child.as_mut() {
                            child.1.push_str(&text);
                        }
                    } else if let Some(cur) = current.as_mut() {
                        match cur.text.as_mut() {
                            Some(existing) => existing.push_str(&text),
                            None => cur.text = Some(text.into_owned()),
                        }
                    }
                }
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(AddressingError::XmlParse(format!("XML parse error: {}", e)));
            }

            _ => {}
        }

        buf.clear();
    }

    let version = version.ok_or_else(|| {
        AddressingError::InvalidEnvelope(
            "no SOAP Envelope found with a recognized namespace".to_string(),
        )
    })?;

    if !saw_body {
        return Err(AddressingError::InvalidEnvelope(
            "SOAP Body is missing".to_string(),
        ));
    }

    Ok(SoapMessage {
        version,
        headers,
        body: SoapBody {
            payload,
            fault: None,
        },
    })
}

/// Check for XXE attack patterns before handing the document to the parser.
fn check_xxe_patterns(xml: &str) -> Result<(), AddressingError> {
    if xml.contains("<!DOCTYPE") || xml.contains("<!doctype") {
        return Err(AddressingError::XmlParse(
            "DOCTYPE declarations are not allowed".to_string(),
        ));
    }

    if xml.contains("<!ENTITY") || xml.contains("<!entity") {
        return Err(AddressingError::XmlParse(
            "entity declarations are not allowed".to_string(),
        ));
    }

    Ok(())
}

fn envelope_version(name: &QName) -> Result<SoapVersion, AddressingError> {
    if name.local_name != "Envelope" {
        return Err(AddressingError::InvalidEnvelope(format!(
            "root element is '{}', expected a SOAP Envelope",
            name.local_name
        )));
    }
    match name.namespace.as_str() {
        SOAP_11_NS => Ok(SoapVersion::Soap11),
        SOAP_12_NS => Ok(SoapVersion::Soap12),
        other => Err(AddressingError::InvalidEnvelope(format!(
            "unrecognized envelope namespace '{}'",
            other
        ))),
    }
}

fn is_envelope_ns(name: &QName, version: Option<SoapVersion>) -> bool {
    version.map_or(false, |v| name.namespace == v.envelope_namespace())
}

/// Resolve an element name against the in-scope namespace declarations.
fn resolved_name(reader: &NsReader<&[u8]>, e: &BytesStart) -> QName {
    let (resolution, local) = reader.resolve_element(e.name());
    let namespace = match resolution {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.into_inner()).into_owned(),
        _ => String::new(),
    };
    QName::new(
        namespace,
        String::from_utf8_lossy(local.into_inner()).into_owned(),
    )
}

/// Check the mustUnderstand attribute.
fn get_must_understand(e: &BytesStart) -> bool {
    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
        if key.ends_with("mustUnderstand") {
            let value = std::str::from_utf8(&attr.value).unwrap_or("");
            return value == "1" || value == "true";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";

    const ADDRESSED_REQUEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:wsa="http://www.w3.org/2005/08/addressing">
  <soap:Header>
    <wsa:To soap:mustUnderstand="1">http://example.com/fabrikam/acct</wsa:To>
    <wsa:Action>http://example.com/fabrikam/acct/Deposit</wsa:Action>
    <wsa:MessageID>urn:uuid:21a7c98b-bd6b-4c29-a5c3-a0c88e1ac6f5</wsa:MessageID>
    <wsa:ReplyTo>
      <wsa:Address>http://example.com/business/client1</wsa:Address>
    </wsa:ReplyTo>
  </soap:Header>
  <soap:Body>
    <acct:Deposit xmlns:acct="http://example.com/fabrikam/acct">
      <acct:Amount>100</acct:Amount>
    </acct:Deposit>
  </soap:Body>
</soap:Envelope>"#;

    #[test]
    fn test_parse_addressed_request() {
        let message = parse_soap_message(ADDRESSED_REQUEST.as_bytes()).unwrap();
        assert_eq!(message.version, SoapVersion::Soap11);
        assert_eq!(message.headers.len(), 4);

        let to = message.find_header(WSA_NS, "To").unwrap();
        assert_eq!(to.text.as_deref(), Some("http://example.com/fabrikam/acct"));
        assert!(to.must_understand);

        let message_id = message.find_header(WSA_NS, "MessageID").unwrap();
        assert_eq!(
            message_id.text.as_deref(),
            Some("urn:uuid:21a7c98b-bd6b-4c29-a5c3-a0c88e1ac6f5")
        );

        let reply_to = message.find_header(WSA_NS, "ReplyTo").unwrap();
        assert_eq!(
            reply_to.child_text(WSA_NS, "Address"),
            Some("http://example.com/business/client1")
        );
    }

    #[test]
    fn test_parse_captures_payload_name() {
        let message = parse_soap_message(ADDRESSED_REQUEST.as_bytes()).unwrap();
        let payload = message.body.payload.unwrap();
        assert_eq!(payload.local_name, "Deposit");
        assert_eq!(payload.namespace, "http://example.com/fabrikam/acct");
    }

    #[test]
    fn test_parse_soap_12() {
        let xml = r#"<?xml version="1.0"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"
              xmlns:wsa="http://www.w3.org/2005/08/addressing">
  <env:Header>
    <wsa:MessageID>uid:1234</wsa:MessageID>
  </env:Header>
  <env:Body/>
</env:Envelope>"#;
        let message = parse_soap_message(xml.as_bytes()).unwrap();
        assert_eq!(message.version, SoapVersion::Soap12);
        assert_eq!(
            message.find_header(WSA_NS, "MessageID").unwrap().text.as_deref(),
            Some("uid:1234")
        );
        assert!(message.body.payload.is_none());
    }

    #[test]
    fn test_prefix_declared_on_header_element() {
        let xml = r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header>
    <a:MessageID xmlns:a="http://www.w3.org/2005/08/addressing">uid:99</a:MessageID>
  </soap:Header>
  <soap:Body/>
</soap:Envelope>"#;
        let message = parse_soap_message(xml.as_bytes()).unwrap();
        let header = message.find_header(WSA_NS, "MessageID").unwrap();
        assert_eq!(header.text.as_deref(), Some("uid:99"));
    }

    #[test]
    fn test_xxe_rejected() {
        let xxe = r#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>&xxe;</soap:Body>
</soap:Envelope>"#;
        let err = parse_soap_message(xxe.as_bytes()).unwrap_err();
        assert!(matches!(err, AddressingError::XmlParse(_)));
    }

    #[test]
    fn test_non_soap_root_rejected() {
        let err = parse_soap_message(b"<html><body/></html>").unwrap_err();
        assert!(matches!(err, AddressingError::InvalidEnvelope(_)));
    }

    #[test]
    fn test_unknown_envelope_namespace_rejected() {
        let xml = r#"<e:Envelope xmlns:e="urn:not-soap"><e:Body/></e:Envelope>"#;
        let err = parse_soap_message(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, AddressingError::InvalidEnvelope(_)));
    }

    #[test]
    fn test_missing_body_rejected() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header/>
</soap:Envelope>"#;
        let err = parse_soap_message(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, AddressingError::InvalidEnvelope(_)));
    }
}
