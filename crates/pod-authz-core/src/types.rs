//! Strong type definitions for the authorization registry.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// A 32-byte principal identity, as attributed by the execution runtime.
///
/// The registry never verifies this identity; it trusts whatever the runtime
/// hands it as the invoking caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Principal(pub [u8; 32]);

impl Principal {
    /// Create a Principal from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic principal from a label.
    ///
    /// Blake3 of the label with a domain prefix. Useful for fixtures and for
    /// runtimes that name callers by account string.
    pub fn derive(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"pod-authz/principal/v1");
        hasher.update(label.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Principal {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Principal {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Principal {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// Opaque identifier of the contract or document an authorization applies to.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHash(String);

impl ResourceHash {
    /// Wrap an existing identifier.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Hash document bytes into a resource identifier (Blake3, hex).
    pub fn digest(document: &[u8]) -> Self {
        Self(blake3::hash(document).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceHash({})", self.0)
    }
}

impl fmt::Display for ResourceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ResourceHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque identifier of the application being authorized.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the default (never granted) app id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppId({})", self.0)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_hex_roundtrip() {
        let p = Principal::from_bytes([0x42; 32]);
        let recovered = Principal::from_hex(&p.to_hex()).unwrap();
        assert_eq!(p, recovered);
    }

    #[test]
    fn test_principal_from_hex_rejects_short_input() {
        assert!(Principal::from_hex("abcd").is_err());
    }

    #[test]
    fn test_principal_display() {
        let p = Principal::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", p), "abababababababab");
        assert!(format!("{:?}", p).starts_with("Principal("));
    }

    #[test]
    fn test_principal_derive_is_deterministic() {
        assert_eq!(Principal::derive("alice"), Principal::derive("alice"));
        assert_ne!(Principal::derive("alice"), Principal::derive("bob"));
    }

    #[test]
    fn test_resource_digest() {
        let a = ResourceHash::digest(b"contract v1");
        let b = ResourceHash::digest(b"contract v1");
        let c = ResourceHash::digest(b"contract v2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_string_newtypes_serialize_transparently() {
        let hash = ResourceHash::from("hash_123");
        assert_eq!(serde_json::to_string(&hash).unwrap(), "\"hash_123\"");

        let app = AppId::from("app_xyz");
        assert_eq!(serde_json::to_string(&app).unwrap(), "\"app_xyz\"");
        assert!(AppId::default().is_empty());
    }
}
