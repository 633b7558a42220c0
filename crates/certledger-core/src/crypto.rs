//! Hashing primitives: SHA-256 and CIDv1 rendering.
//!
//! SHA-256 keeps fingerprints and content ids interoperable with the
//! IPFS/CID ecosystem and with any verifier that can hash in another
//! language.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::Fingerprint;

/// Multicodec codes used in CIDs.
pub mod multicodec {
    /// Raw bytes. Issued documents are stored as opaque blobs.
    pub const RAW: u8 = 0x55;
    /// sha2-256 multihash code.
    pub const SHA2_256: u8 = 0x12;
}

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Convert to CIDv1 with the given content codec.
    ///
    /// Format: `b` + base32lower(0x01 || codec || 0x12 || 0x20 || hash)
    pub fn to_cid(&self, codec: u8) -> String {
        let mut cid_bytes = Vec::with_capacity(36);
        cid_bytes.push(0x01);
        cid_bytes.push(codec);
        cid_bytes.push(multicodec::SHA2_256);
        cid_bytes.push(0x20);
        cid_bytes.extend_from_slice(&self.0);

        format!("b{}", base32_encode(&cid_bytes))
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Fingerprint engine: hash canonical bytes.
///
/// Any byte sequence is valid input, including the empty one.
pub fn fingerprint(canonical: &[u8]) -> Fingerprint {
    Sha256Hash::hash(canonical).into()
}

// RFC 4648 Base32 encoding (lowercase, no padding)
fn base32_encode(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz234567";
    let mut result = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in data {
        buffer = (buffer << 8) | (byte as u64);
        bits_in_buffer += 8;

        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let index = ((buffer >> bits_in_buffer) & 0x1f) as usize;
            result.push(ALPHABET[index] as char);
        }
    }

    if bits_in_buffer > 0 {
        let index = ((buffer << (5 - bits_in_buffer)) & 0x1f) as usize;
        result.push(ALPHABET[index] as char);
    }

    result
}
