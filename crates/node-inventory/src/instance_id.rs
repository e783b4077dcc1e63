//! Instance id extraction across kubelet API shapes.
//!
//! Kubelets before 1.11 publish the cloud instance id in `spec.externalID`.
//! From 1.11 on it lives in `spec.providerID` (`<provider>://<...>/<id>`),
//! read by position. The kubelet version reported in `status.nodeInfo`
//! selects which extractor applies.

use crate::error::ParseError;
use k8s_openapi::api::core::v1::NodeSpec;
use std::fmt;
use std::str::FromStr;

/// First kubelet version that reports `providerID` instead of `externalID`
pub const PROVIDER_ID_SINCE: KubeletVersion = KubeletVersion {
    major: 1,
    minor: 11,
};

/// `providerID` segment (after splitting on `/`) that holds the instance id
const PROVIDER_ID_SEGMENT: usize = 4;

/// Major/minor part of a kubelet version string such as `v1.28.3-eks-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KubeletVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl FromStr for KubeletVersion {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::KubeletVersion(raw.to_string());

        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let mut parts = trimmed.split('.');

        let major = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;

        // Minor may carry a vendor tail, e.g. "28+" on GKE
        let minor_part = parts.next().ok_or_else(invalid)?;
        let digits = minor_part
            .find(|c: char| !c.is_ascii_digit())
            .map_or(minor_part, |end| &minor_part[..end]);
        let minor = digits.parse().map_err(|_| invalid())?;

        Ok(Self { major, minor })
    }
}

impl fmt::Display for KubeletVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Reads the instance id from one shape of the node spec.
pub trait InstanceIdExtractor: Send + Sync {
    /// Spec field this extractor reads, for diagnostics
    fn field(&self) -> &'static str;

    /// Extract the instance id. An absent field yields an empty id.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the field is present but malformed.
    fn extract(&self, spec: Option<&NodeSpec>) -> Result<String, ParseError>;
}

/// `spec.externalID`, reported by kubelets before 1.11
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalId;

impl InstanceIdExtractor for ExternalId {
    fn field(&self) -> &'static str {
        "externalID"
    }

    fn extract(&self, spec: Option<&NodeSpec>) -> Result<String, ParseError> {
        Ok(spec
            .and_then(|spec| spec.external_id.clone())
            .unwrap_or_default())
    }
}

/// `spec.providerID`, reported by kubelets from 1.11 on
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderId;

impl InstanceIdExtractor for ProviderId {
    fn field(&self) -> &'static str {
        "providerID"
    }

    fn extract(&self, spec: Option<&NodeSpec>) -> Result<String, ParseError> {
        let Some(provider_id) = spec.and_then(|spec| spec.provider_id.as_deref()) else {
            return Ok(String::new());
        };

        provider_id
            .split('/')
            .nth(PROVIDER_ID_SEGMENT)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ParseError::ProviderId(provider_id.to_string()))
    }
}

static EXTERNAL_ID: ExternalId = ExternalId;
static PROVIDER_ID: ProviderId = ProviderId;

/// Pick the extractor matching what a kubelet of `version` reports.
#[must_use]
pub fn extractor_for(version: KubeletVersion) -> &'static dyn InstanceIdExtractor {
    if version < PROVIDER_ID_SINCE {
        &EXTERNAL_ID
    } else {
        &PROVIDER_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_provider_id(provider_id: &str) -> NodeSpec {
        NodeSpec {
            provider_id: Some(provider_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_plain_version() {
        let version: KubeletVersion = "v1.10.3".parse().unwrap();
        assert_eq!(version, KubeletVersion { major: 1, minor: 10 });
    }

    #[test]
    fn test_parse_vendor_versions() {
        let eks: KubeletVersion = "v1.29.0-eks-5e0fdde".parse().unwrap();
        assert_eq!(eks, KubeletVersion { major: 1, minor: 29 });

        let gke: KubeletVersion = "v1.28+".parse().unwrap();
        assert_eq!(gke, KubeletVersion { major: 1, minor: 28 });

        let k3s: KubeletVersion = "v1.30.2+k3s1".parse().unwrap();
        assert_eq!(k3s.minor, 30);
    }

    #[test]
    fn test_parse_invalid_version() {
        assert!(matches!(
            "".parse::<KubeletVersion>(),
            Err(ParseError::KubeletVersion(_))
        ));
        assert!(matches!(
            "v1".parse::<KubeletVersion>(),
            Err(ParseError::KubeletVersion(_))
        ));
        assert!(matches!(
            "latest".parse::<KubeletVersion>(),
            Err(ParseError::KubeletVersion(_))
        ));
    }

    #[test]
    fn test_version_gate_selects_extractor() {
        let old: KubeletVersion = "v1.10.0".parse().unwrap();
        let new: KubeletVersion = "v1.11.0".parse().unwrap();

        assert_eq!(extractor_for(old).field(), "externalID");
        assert_eq!(extractor_for(new).field(), "providerID");
        assert_eq!(
            extractor_for(KubeletVersion { major: 2, minor: 0 }).field(),
            "providerID"
        );
    }

    #[test]
    fn test_provider_id_takes_fifth_segment() {
        let spec = spec_with_provider_id("aws:///us-east-1a/i-0123456789abcdef0");
        assert_eq!(
            ProviderId.extract(Some(&spec)).unwrap(),
            "i-0123456789abcdef0"
        );

        let spec = spec_with_provider_id("gce://my-project/europe-west1-b/gke-pool-1");
        assert_eq!(ProviderId.extract(Some(&spec)).unwrap(), "gke-pool-1");
    }

    #[test]
    fn test_provider_id_too_short() {
        let spec = spec_with_provider_id("kind://docker/kind");
        assert_eq!(
            ProviderId.extract(Some(&spec)),
            Err(ParseError::ProviderId("kind://docker/kind".to_string()))
        );
    }

    #[test]
    fn test_provider_id_empty_segment() {
        let spec = spec_with_provider_id("aws:///us-east-1a/");
        assert!(matches!(
            ProviderId.extract(Some(&spec)),
            Err(ParseError::ProviderId(_))
        ));
    }

    #[test]
    fn test_absent_fields_yield_empty_id() {
        assert_eq!(ProviderId.extract(None).unwrap(), "");
        assert_eq!(ProviderId.extract(Some(&NodeSpec::default())).unwrap(), "");
        assert_eq!(ExternalId.extract(Some(&NodeSpec::default())).unwrap(), "");
    }

    #[test]
    fn test_external_id() {
        let spec = NodeSpec {
            external_id: Some("i-legacy".to_string()),
            ..Default::default()
        };
        assert_eq!(ExternalId.extract(Some(&spec)).unwrap(), "i-legacy");
    }
}
