//! CHAP credentials for RADIUS (RFC 2865 Sections 2.2, 5.3 and 5.40).
//!
//! The CHAP-Password attribute carries a one-byte chap identifier followed
//! by `MD5(ident || password || challenge)`; the 16-byte challenge travels
//! in CHAP-Challenge.

use crate::attributes::{AttributeError, ValueKind};
use rand::Rng;

/// Decoded CHAP-Password attribute value: chap ident plus the 16-byte hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapPassword {
    pub ident: u8,
    pub hash: [u8; 16],
}

impl ChapPassword {
    /// Parse the 17-byte CHAP-Password attribute value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AttributeError> {
        if bytes.len() != 17 {
            return Err(AttributeError::BadAttributeLength {
                kind: ValueKind::Octets,
                length: bytes.len() + 2,
            });
        }
        let mut hash = [0u8; 16];
        hash.copy_from_slice(&bytes[1..17]);
        Ok(ChapPassword {
            ident: bytes[0],
            hash,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(17);
        bytes.push(self.ident);
        bytes.extend_from_slice(&self.hash);
        bytes
    }
}

/// A fresh 16-byte challenge from the CSPRNG.
pub fn generate_challenge() -> [u8; 16] {
    let mut challenge = [0u8; 16];
    let mut rng = rand::rng();
    rng.fill(&mut challenge);
    challenge
}

/// `MD5(ident || password || challenge)`.
pub fn compute_chap_hash(ident: u8, password: &str, challenge: &[u8]) -> [u8; 16] {
    let mut input = Vec::with_capacity(1 + password.len() + challenge.len());
    input.push(ident);
    input.extend_from_slice(password.as_bytes());
    input.extend_from_slice(challenge);
    md5::compute(&input).0
}

/// Build the CHAP-Password value for a fresh challenge, picking the chap
/// ident from the CSPRNG as well.
pub fn compute_chap_password(password: &str, challenge: &[u8; 16]) -> ChapPassword {
    let mut rng = rand::rng();
    let ident: u8 = rng.random();
    ChapPassword {
        ident,
        hash: compute_chap_hash(ident, password, challenge),
    }
}

/// Verify a CHAP-Password against a candidate plaintext.
///
/// The attribute values must have their exact RFC widths (17 and 16 bytes);
/// anything else is malformed rather than a mismatch.
pub fn verify_chap_password(
    chap_password: &[u8],
    chap_challenge: &[u8],
    password: &str,
) -> Result<bool, AttributeError> {
    let parsed = ChapPassword::from_bytes(chap_password)?;
    if chap_challenge.len() != 16 {
        return Err(AttributeError::BadAttributeLength {
            kind: ValueKind::Octets,
            length: chap_challenge.len() + 2,
        });
    }
    let expected = compute_chap_hash(parsed.ident, password, chap_challenge);
    Ok(parsed.hash == expected)
}
