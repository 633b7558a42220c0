//! Strong type definitions for certledger.
//!
//! Identifiers are newtypes so a fingerprint can never be passed where a
//! content id is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::canonical::canonicalize;
use crate::crypto::{multicodec, Sha256Hash};
use crate::error::CoreError;

/// Names of the four identity fields, in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Organization,
    Candidate,
    Course,
    Identifier,
}

impl FieldName {
    /// All fields in canonical encoding order.
    pub const ALL: [FieldName; 4] = [
        FieldName::Organization,
        FieldName::Candidate,
        FieldName::Course,
        FieldName::Identifier,
    ];

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            FieldName::Organization => "organization",
            FieldName::Candidate => "candidate name",
            FieldName::Course => "course name",
            FieldName::Identifier => "identifier",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four identity fields of a certificate.
///
/// Values are kept exactly as supplied. Trimming happens in
/// [`CertificateFields::normalized`] and in canonicalization, so issuance and
/// verification always hash the same bytes for the same visible text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateFields {
    pub organization: String,
    pub candidate: String,
    pub course: String,
    pub identifier: String,
}

impl CertificateFields {
    /// Create a new set of fields.
    pub fn new(
        organization: impl Into<String>,
        candidate: impl Into<String>,
        course: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            candidate: candidate.into(),
            course: course.into(),
            identifier: identifier.into(),
        }
    }

    /// Get a field by name.
    pub fn get(&self, name: FieldName) -> &str {
        match name {
            FieldName::Organization => &self.organization,
            FieldName::Candidate => &self.candidate,
            FieldName::Course => &self.course,
            FieldName::Identifier => &self.identifier,
        }
    }

    /// Field values in canonical order, trimmed.
    pub fn trimmed_parts(&self) -> [&str; 4] {
        FieldName::ALL.map(|name| self.get(name).trim())
    }

    /// A copy with leading and trailing whitespace stripped from every field.
    pub fn normalized(&self) -> Self {
        let [organization, candidate, course, identifier] = self.trimmed_parts();
        Self::new(organization, candidate, course, identifier)
    }
}

/// A certificate fingerprint: SHA-256 of the canonical field encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of a set of fields.
    pub fn of(fields: &CertificateFields) -> Self {
        crate::crypto::fingerprint(&canonicalize(fields))
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex. Surrounding whitespace is ignored, case is not significant.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(CoreError::InvalidFingerprint(format!(
                "expected 64 hex digits, got {}",
                s.len()
            )));
        }
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidFingerprint(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Sha256Hash> for Fingerprint {
    fn from(hash: Sha256Hash) -> Self {
        Self(hash.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Content identifier of a blob: CIDv1, sha2-256 multihash, base32 multibase.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Content id of raw bytes.
    pub fn for_bytes(data: &[u8]) -> Self {
        Self(Sha256Hash::hash(data).to_cid(multicodec::RAW))
    }

    /// Parse a base32 multibase CID string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let Some(body) = s.strip_prefix('b') else {
            return Err(CoreError::InvalidContentId(
                "missing base32 multibase prefix".into(),
            ));
        };
        if body.is_empty() {
            return Err(CoreError::InvalidContentId("empty".into()));
        }
        if let Some(c) = body
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '2'..='7'))
        {
            return Err(CoreError::InvalidContentId(format!(
                "invalid base32 character {:?}",
                c
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// The CID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}
