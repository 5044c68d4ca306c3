//! Configuration types for the addressing interceptor.

use crate::interceptor::AddressingInterceptor;
use crate::messageid::{InMemoryMessageIdStrategy, MessageIdStrategy, UuidMessageIdStrategy};
use crate::sender::MessageSender;
use crate::version::{Addressing10, Addressing200408, AddressingVersion};
use serde::{Deserialize, Serialize};

/// Declarative configuration for an [`AddressingInterceptor`].
///
/// The reply and fault action URIs are deployment-specific and therefore
/// required; everything else has defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressingConfig {
    /// WS-Addressing revision to enforce.
    #[serde(default)]
    pub version: WsAddressingVersion,

    /// Action URI stamped on normal replies.
    pub reply_action: String,

    /// Action URI stamped on fault replies.
    pub fault_action: String,

    /// Track seen MessageIDs in memory and drop replays. When false,
    /// every request is treated as fresh.
    #[serde(default)]
    pub duplicate_detection: bool,
}

/// Supported WS-Addressing revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WsAddressingVersion {
    /// W3C Recommendation, 2005/08 namespace.
    #[default]
    #[serde(rename = "1.0")]
    V10,
    /// August 2004 member submission.
    #[serde(rename = "2004/08")]
    V200408,
}

impl AddressingConfig {
    /// Build an interceptor from this configuration and an ordered list of
    /// out-of-band senders.
    pub fn into_interceptor(
        self,
        message_senders: Vec<Box<dyn MessageSender>>,
    ) -> AddressingInterceptor {
        let version: Box<dyn AddressingVersion> = match self.version {
            WsAddressingVersion::V10 => Box::new(Addressing10),
            WsAddressingVersion::V200408 => Box::new(Addressing200408),
        };
        let strategy: Box<dyn MessageIdStrategy> = if self.duplicate_detection {
            Box::new(InMemoryMessageIdStrategy::new())
        } else {
            Box::new(UuidMessageIdStrategy)
        };
        AddressingInterceptor::new(
            version,
            strategy,
            message_senders,
            self.reply_action,
            self.fault_action,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
version: "1.0"
reply_action: "urn:replyAction"
fault_action: "urn:faultAction"
duplicate_detection: true
"#;
        let config: AddressingConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, WsAddressingVersion::V10);
        assert_eq!(config.reply_action, "urn:replyAction");
        assert_eq!(config.fault_action, "urn:faultAction");
        assert!(config.duplicate_detection);
    }

    #[test]
    fn test_config_defaults() {
        let yaml = r#"
reply_action: "urn:replyAction"
fault_action: "urn:faultAction"
"#;
        let config: AddressingConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, WsAddressingVersion::V10);
        assert!(!config.duplicate_detection);
    }

    #[test]
    fn test_config_selects_2004_08_revision() {
        let yaml = r#"
version: "2004/08"
reply_action: "urn:replyAction"
fault_action: "urn:faultAction"
"#;
        let config: AddressingConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.version, WsAddressingVersion::V200408);
    }

    #[test]
    fn test_config_round_trip() {
        let config = AddressingConfig {
            version: WsAddressingVersion::V200408,
            reply_action: "urn:replyAction".to_string(),
            fault_action: "urn:faultAction".to_string(),
            duplicate_detection: true,
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AddressingConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, config.version);
        assert_eq!(parsed.reply_action, config.reply_action);
    }

    #[test]
    fn test_missing_actions_rejected() {
        let result: Result<AddressingConfig, _> = serde_yaml::from_str("version: \"1.0\"\n");
        assert!(result.is_err());
    }
}
