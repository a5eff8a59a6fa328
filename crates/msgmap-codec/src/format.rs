//! Wire format tags

use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Declared wire format of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFormat {
    /// Arbitrary JSON object
    Json,
    /// SOAP envelope; the first element of the Body is the payload
    Soap,
    /// Plain XML
    Xml,
    /// Vendor-specific XML, parsed like plain XML
    ProprietaryXml,
}

impl MessageFormat {
    /// Canonical upper-case tag
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageFormat::Json => "JSON",
            MessageFormat::Soap => "SOAP",
            MessageFormat::Xml => "XML",
            MessageFormat::ProprietaryXml => "PROPRIETARY_XML",
        }
    }
}

impl FromStr for MessageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JSON" => Ok(MessageFormat::Json),
            "SOAP" => Ok(MessageFormat::Soap),
            "XML" => Ok(MessageFormat::Xml),
            "PROPRIETARY_XML" => Ok(MessageFormat::ProprietaryXml),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MessageFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_case_insensitive() {
        assert_eq!("json".parse::<MessageFormat>().unwrap(), MessageFormat::Json);
        assert_eq!("Soap".parse::<MessageFormat>().unwrap(), MessageFormat::Soap);
        assert_eq!("XML".parse::<MessageFormat>().unwrap(), MessageFormat::Xml);
        assert_eq!(
            "proprietary_xml".parse::<MessageFormat>().unwrap(),
            MessageFormat::ProprietaryXml
        );
    }

    #[test]
    fn test_unknown_tag() {
        let err = "EDIFACT".parse::<MessageFormat>().unwrap_err();
        assert_eq!(err, Error::UnsupportedFormat("EDIFACT".to_string()));
        assert_eq!(err.to_string(), "Unsupported format: EDIFACT");
    }
}
