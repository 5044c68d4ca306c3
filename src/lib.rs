//! Server-side WS-Addressing for SOAP message exchanges.
//!
//! Provides an endpoint interceptor that validates the addressing headers
//! of inbound requests (MessageID presence, duplicate detection) and routes
//! outbound replies to the destination the request asked for: back over the
//! inbound channel, suppressed entirely, or delivered out-of-band through a
//! pluggable transport.
//!
//! # Features
//!
//! - WS-Addressing 1.0 and 2004/08 revisions
//! - Protocol fault generation for requests missing required headers
//! - Pluggable message-identifier generation and replay detection
//! - Out-of-band reply delivery with first-match sender negotiation
//!
//! # Example
//!
//! ```
//! use soap_addressing::interceptor::AddressingInterceptor;
//! use soap_addressing::context::MessageContext;
//! use soap_addressing::messageid::UuidMessageIdStrategy;
//! use soap_addressing::parser::parse_soap_message;
//! use soap_addressing::sender::HttpMessageSender;
//! use soap_addressing::version::Addressing10;
//!
//! # fn main() -> Result<(), soap_addressing::AddressingError> {
//! let interceptor = AddressingInterceptor::new(
//!     Box::new(Addressing10),
//!     Box::new(UuidMessageIdStrategy),
//!     vec![Box::new(HttpMessageSender::new())],
//!     "http://example.com/orders/reply",
//!     "http://example.com/orders/fault",
//! );
//!
//! let request = parse_soap_message(
//!     br#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
//!                        xmlns:wsa="http://www.w3.org/2005/08/addressing">
//!           <soap:Header>
//!             <wsa:Action>http://example.com/orders/Submit</wsa:Action>
//!             <wsa:MessageID>urn:uuid:6e8bc430-9c3a-11d9-9669-0800200c9a66</wsa:MessageID>
//!           </soap:Header>
//!           <soap:Body/>
//!         </soap:Envelope>"#,
//! )?;
//!
//! let mut context = MessageContext::new(request);
//! if interceptor.handle_request(&mut context)? {
//!     // ... invoke the endpoint, then:
//!     let delivered_inband = interceptor.handle_response(&mut context)?;
//!     assert!(delivered_inband);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod interceptor;
pub mod message;
pub mod messageid;
pub mod parser;
pub mod sender;
pub mod version;

pub use config::AddressingConfig;
pub use context::MessageContext;
pub use error::AddressingError;
pub use interceptor::AddressingInterceptor;
pub use message::{HeaderElement, QName, SoapFault, SoapMessage, SoapVersion};
pub use messageid::MessageIdStrategy;
pub use sender::{MessageConnection, MessageSender};
pub use version::{Addressing10, Addressing200408, AddressingVersion};
