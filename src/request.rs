//! The request payload handed to the engine when monitoring starts.
//!
//! The payload's schema belongs to the engine's protocol, not to this
//! shell: callers may supply arbitrary bytes and they are passed through
//! untouched. [`MonitoringRequest::from_namespaces`] covers the common case
//! of requesting mDL data elements by namespace.

use crate::helpers::NonEmptyMap;

pub type NameSpace = String;
pub type DataElementIdentifier = String;
/// Whether the holder must release the element for the session to proceed.
pub type Mandatory = bool;
pub type DataElements = NonEmptyMap<DataElementIdentifier, Mandatory>;
pub type Namespaces = NonEmptyMap<NameSpace, DataElements>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not serialize the monitoring request: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Opaque byte payload describing which credential fields are requested.
///
/// The shell never parses or validates the bytes; the engine does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringRequest(Vec<u8>);

impl MonitoringRequest {
    /// Wrap raw payload bytes as-is.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self(payload.into())
    }

    /// Serialize a namespace → data-element map to the JSON shape the
    /// engine expects: `{"<namespace>": {"<element>": <mandatory>}}`.
    pub fn from_namespaces(namespaces: &Namespaces) -> Result<Self, Error> {
        Ok(Self(serde_json::to_vec(namespaces)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for MonitoringRequest {
    fn from(payload: Vec<u8>) -> Self {
        Self(payload)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const NAMESPACE: &str = "org.iso.18013.5.1";

    #[test]
    fn namespaces_serialize_to_engine_shape() {
        let mut elements = DataElements::new("family_name".to_string(), false);
        elements.insert("issuing_country".to_string(), true);
        let request =
            MonitoringRequest::from_namespaces(&Namespaces::new(NAMESPACE.into(), elements))
                .unwrap();
        assert_eq!(
            std::str::from_utf8(request.as_bytes()).unwrap(),
            r#"{"org.iso.18013.5.1":{"family_name":false,"issuing_country":true}}"#
        );
    }

    #[test]
    fn raw_payloads_pass_through_unmodified() {
        let payload = b"not even json \xff".to_vec();
        let request = MonitoringRequest::new(payload.clone());
        assert_eq!(request.as_bytes(), payload.as_slice());
    }
}
