//! Route configuration model
//!
//! Routes are authored as YAML with camelCase keys:
//!
//! ```yaml
//! inboundFormat: JSON
//! outboundFormat: XML
//! mode: PASSIVE
//! namespace:
//!   uri: urn:iso:std:iso:20022:tech:xsd:pacs.008.001.08
//!   prefix: ""
//!   rootElementPrefix: ns
//! mappings:
//!   request:
//!     - from: source.amount
//!       to: target:CdtTrfTxInf/IntrBkSttlmAmt
//!   response:
//!     - from: target:TxInfAndSts/TxSts
//!       to: status
//!       transform: mapStatusToResponseCode(value)
//! ```

use crate::{Error, Result};
use msgmap_codec::MessageFormat;
use msgmap_ir::element::is_valid_name;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Root element name used when a route does not configure one
pub const DEFAULT_ROOT_ELEMENT: &str = "Document";

/// Immutable per-route mapping configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    /// Route identifier; stamped from the file name when loaded from disk
    #[serde(default)]
    pub route_id: String,

    /// Wire format of requests arriving on this route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_format: Option<MessageFormat>,

    /// Wire format sent downstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_format: Option<MessageFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    /// Downstream endpoint for active routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Namespace of the canonical XML document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<NamespaceConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_element_name: Option<String>,

    #[serde(default)]
    pub mappings: Mappings,
}

/// Whether a route forwards downstream or answers directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Forward the translated message downstream
    Active,
    /// Return the translated message to the caller
    Passive,
}

/// Namespace applied to the canonical XML root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Prefix bound to `uri`; empty or absent means the default namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Prefix written on the serialized root tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_element_prefix: Option<String>,
}

/// Downstream credentials reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "type", default)]
    pub auth_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Ordered field mappings for both directions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub request: Vec<FieldMapping>,

    #[serde(default)]
    pub response: Vec<FieldMapping>,
}

/// One `from` → `to` rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Source path or `constant:<literal>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Target path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,

    /// Used when the source value is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl FieldMapping {
    /// Create a plain mapping
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            ..Self::default()
        }
    }

    /// Attach a transform expression
    #[must_use]
    pub fn with_transform(mut self, expression: impl Into<String>) -> Self {
        self.transform = Some(expression.into());
        self
    }

    /// Attach a default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Transform expression, if one is set and not blank
    #[must_use]
    pub fn transform_expression(&self) -> Option<&str> {
        self.transform.as_deref().filter(|t| !t.trim().is_empty())
    }
}

impl MappingConfig {
    /// Parse a route configuration from YAML
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] with the YAML location when parsing fails.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            let mut message = format!("failed to parse route YAML: {e}");
            if let Some(location) = e.location() {
                message = format!(
                    "{message} (line {}, column {})",
                    location.line(),
                    location.column()
                );
            }
            Error::Config(message)
        })
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("failed to serialize route: {e}")))
    }

    /// Root element name, defaulting to `Document`
    #[must_use]
    pub fn root_element_name(&self) -> &str {
        self.root_element_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_ROOT_ELEMENT)
    }

    /// Namespace URI, when a namespace with a URI is configured
    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_ref().and_then(|ns| ns.uri.as_deref())
    }

    /// True when the route forwards downstream
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mode == Some(Mode::Active)
    }

    /// Check structural constraints the engine relies on
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.route_id.trim().is_empty() {
            return Err(Error::Config("routeId must not be empty".to_string()));
        }

        let root = self.root_element_name();
        if !is_valid_name(root) {
            return Err(Error::Config(format!(
                "route '{}': rootElementName '{root}' is not a valid XML name",
                self.route_id
            )));
        }

        if let Some(ns) = &self.namespace {
            for (field, prefix) in [
                ("prefix", ns.prefix.as_deref()),
                ("rootElementPrefix", ns.root_element_prefix.as_deref()),
            ] {
                if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
                    if !is_valid_name(prefix) {
                        return Err(Error::Config(format!(
                            "route '{}': namespace {field} '{prefix}' is not a valid XML prefix",
                            self.route_id
                        )));
                    }
                }
            }
            if ns.uri.as_deref().is_some_and(|u| u.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "route '{}': namespace uri must not be blank",
                    self.route_id
                )));
            }
        }

        Ok(())
    }
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Active => "ACTIVE",
            Mode::Passive => "PASSIVE",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Mode::Active),
            "PASSIVE" => Ok(Mode::Passive),
            _ => Err(Error::Config(format!("unknown mode '{s}'"))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE: &str = r#"
routeId: pacs008-inbound
inboundFormat: json
outboundFormat: XML
mode: active
endpoint: https://bank.example/pacs
auth:
  type: API_KEY
  key: vault://keys/pacs
namespace:
  uri: "urn:iso:std:iso:20022:tech:xsd:pacs.008.001.08"
  prefix: ""
  rootElementPrefix: ns
mappings:
  request:
    - from: source.amount
      to: target:CdtTrfTxInf/IntrBkSttlmAmt
    - from: source.missing
      to: target:CdtTrfTxInf/Purp
      defaultValue: SALA
  response:
    - from: target:TxInfAndSts/TxSts
      to: status
      transform: mapStatusToResponseCode(value)
"#;

    #[test]
    fn test_parse_full_route() {
        let config = MappingConfig::from_yaml(ROUTE).unwrap();

        assert_eq!(config.route_id, "pacs008-inbound");
        assert_eq!(config.inbound_format, Some(MessageFormat::Json));
        assert_eq!(config.outbound_format, Some(MessageFormat::Xml));
        assert_eq!(config.mode, Some(Mode::Active));
        assert!(config.is_active());
        assert_eq!(config.auth.as_ref().unwrap().auth_type, "API_KEY");
        assert_eq!(
            config.namespace.as_ref().unwrap().root_element_prefix.as_deref(),
            Some("ns")
        );
        assert_eq!(config.mappings.request.len(), 2);
        assert_eq!(config.mappings.request[1].default_value.as_deref(), Some("SALA"));
        assert_eq!(
            config.mappings.response[0].transform_expression(),
            Some("mapStatusToResponseCode(value)")
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_minimal_route_defaults() {
        let config = MappingConfig::from_yaml("inboundFormat: XML\n").unwrap();
        assert_eq!(config.root_element_name(), "Document");
        assert!(config.mappings.request.is_empty());
        assert!(config.namespace_uri().is_none());
        assert!(!config.is_active());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = MappingConfig::from_yaml("inboundFormat: EDIFACT\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported format: EDIFACT"));
    }

    #[test]
    fn test_yaml_error_has_location() {
        let err = MappingConfig::from_yaml("mappings:\n  request: [\n").unwrap_err();
        assert!(err.to_string().contains("line"));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let mut config = MappingConfig {
            route_id: "r1".to_string(),
            root_element_name: Some("1Bad".to_string()),
            ..MappingConfig::default()
        };
        assert!(config.validate().is_err());

        config.root_element_name = None;
        config.namespace = Some(NamespaceConfig {
            uri: Some("urn:x".to_string()),
            prefix: Some("bad prefix".to_string()),
            root_element_prefix: None,
        });
        assert!(config.validate().is_err());

        config.route_id = String::new();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_transform_ignored() {
        let mapping = FieldMapping::new("a", "b").with_transform("   ");
        assert!(mapping.transform_expression().is_none());
    }

    #[test]
    fn test_yaml_output_uses_camel_case() {
        let config = MappingConfig {
            route_id: "r1".to_string(),
            root_element_name: Some("Envelope".to_string()),
            mappings: Mappings {
                request: vec![FieldMapping::new("a", "b").with_default("x")],
                response: Vec::new(),
            },
            ..MappingConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("routeId: r1"));
        assert!(yaml.contains("rootElementName: Envelope"));
        assert!(yaml.contains("defaultValue: x"));
    }
}
