//! Authenticator constructions and PAP password obfuscation (RFC 2865).
//!
//! Three authenticators, all MD5 over an explicit byte layout:
//!
//! - Access-Request: `MD5(secret || 16 CSPRNG bytes)`, generated once and
//!   reused across retries.
//! - Accounting/CoA/Disconnect-Request:
//!   `MD5(code || id || length || zero16 || attributes || secret)`.
//! - Responses:
//!   `MD5(code || id || length || request-authenticator || attributes || secret)`.

use crate::attributes::AttributeError;
use crate::packet::{Packet, PacketError};
use rand::Rng;

/// Longest password PAP will carry: eight 16-byte blocks.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Generate the random Access-Request authenticator.
///
/// The 16 random bytes come from a CSPRNG and are whitened through MD5
/// together with the shared secret.
pub fn generate_request_authenticator(secret: &[u8]) -> [u8; 16] {
    let mut seed = [0u8; 16];
    let mut rng = rand::rng();
    rng.fill(&mut seed);

    let mut input = Vec::with_capacity(secret.len() + 16);
    input.extend_from_slice(secret);
    input.extend_from_slice(&seed);
    md5::compute(&input).0
}

/// Hash `code || id || length || auth || attributes || secret` for an
/// already-encoded datagram, substituting `auth` for the authenticator
/// field the bytes carry.
fn digest_with_authenticator(encoded: &[u8], auth: &[u8; 16], secret: &[u8]) -> [u8; 16] {
    let mut input = Vec::with_capacity(encoded.len() + secret.len());
    input.extend_from_slice(&encoded[..4]);
    input.extend_from_slice(auth);
    input.extend_from_slice(&encoded[Packet::HEADER_LEN..]);
    input.extend_from_slice(secret);
    md5::compute(&input).0
}

/// Deterministic Request Authenticator for Accounting-Request, CoA-Request
/// and Disconnect-Request (RFC 2866 Section 3, RFC 5176 Section 2.3).
pub fn calculate_request_authenticator(
    packet: &Packet,
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let encoded = packet.encode()?;
    Ok(digest_with_authenticator(&encoded, &[0u8; 16], secret))
}

/// Recompute a deterministic Request Authenticator with sixteen zero bytes
/// in place of the transmitted one and compare. Used when this library is
/// the one consuming an accounting or dynamic-authorization request.
pub fn verify_request_authenticator(packet: &Packet, secret: &[u8]) -> Result<bool, PacketError> {
    let Some(received) = packet.authenticator else {
        return Ok(false);
    };
    let expected = calculate_request_authenticator(packet, secret)?;
    Ok(received == expected)
}

/// Verify a deterministic Request Authenticator over an already-encoded
/// datagram, preserving the attribute order the peer actually sent.
pub fn verify_request_authenticator_bytes(encoded: &[u8], secret: &[u8]) -> bool {
    if encoded.len() < Packet::HEADER_LEN {
        return false;
    }
    encoded[4..20] == digest_with_authenticator(encoded, &[0u8; 16], secret)
}

/// Response Authenticator over the reply and the originating request's
/// authenticator (RFC 2865 Section 3).
pub fn calculate_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let encoded = response.encode()?;
    Ok(digest_with_authenticator(
        &encoded,
        request_authenticator,
        secret,
    ))
}

pub fn verify_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<bool, PacketError> {
    let Some(received) = response.authenticator else {
        return Ok(false);
    };
    let expected = calculate_response_authenticator(response, request_authenticator, secret)?;
    Ok(received == expected)
}

/// Verify a Response Authenticator over the reply bytes as received.
///
/// Hashing the received buffer rather than a re-encoded packet keeps
/// verification honest for peers that do not order attributes the way this
/// crate's encoder does.
pub fn verify_response_authenticator_bytes(
    encoded: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    if encoded.len() < Packet::HEADER_LEN {
        return false;
    }
    encoded[4..20] == digest_with_authenticator(encoded, request_authenticator, secret)
}

/// Obfuscate a PAP password per RFC 2865 Section 5.2.
///
/// The password is truncated to 128 bytes, zero-padded to a 16-byte
/// boundary, and each block is XORed with the running MD5 chain seeded by
/// `MD5(secret || request-authenticator)`.
pub fn encrypt_password(password: &str, secret: &[u8], authenticator: &[u8; 16]) -> Vec<u8> {
    let mut padded = password.as_bytes().to_vec();
    padded.truncate(MAX_PASSWORD_LEN);
    let rem = padded.len() % 16;
    if rem != 0 || padded.is_empty() {
        padded.resize(padded.len() + 16 - rem, 0);
    }

    let mut out = Vec::with_capacity(padded.len());
    let mut chain: [u8; 16] = *authenticator;
    for block in padded.chunks(16) {
        let mut input = Vec::with_capacity(secret.len() + 16);
        input.extend_from_slice(secret);
        input.extend_from_slice(&chain);
        let mask = md5::compute(&input).0;

        let mut cipher = [0u8; 16];
        for i in 0..16 {
            cipher[i] = block[i] ^ mask[i];
        }
        chain = cipher;
        out.extend_from_slice(&cipher);
    }
    out
}

/// Invert [`encrypt_password`] and strip the zero padding.
///
/// Returns the password bytes; truncation on encode can split a UTF-8
/// sequence, so the caller decides how to interpret them.
pub fn decrypt_password(
    encrypted: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, AttributeError> {
    if encrypted.is_empty() || encrypted.len() % 16 != 0 || encrypted.len() > MAX_PASSWORD_LEN {
        return Err(AttributeError::BadAttributeLength {
            kind: crate::attributes::ValueKind::Octets,
            length: encrypted.len() + 2,
        });
    }

    let mut out = Vec::with_capacity(encrypted.len());
    let mut chain: [u8; 16] = *authenticator;
    for block in encrypted.chunks(16) {
        let mut input = Vec::with_capacity(secret.len() + 16);
        input.extend_from_slice(secret);
        input.extend_from_slice(&chain);
        let mask = md5::compute(&input).0;

        for i in 0..16 {
            out.push(block[i] ^ mask[i]);
        }
        chain.copy_from_slice(block);
    }

    while out.last() == Some(&0) {
        out.pop();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;
    use crate::packet::Code;

    #[test]
    fn request_authenticators_are_random() {
        let a = generate_request_authenticator(b"secret");
        let b = generate_request_authenticator(b"secret");
        assert_ne!(a, b);
    }

    #[test]
    fn pap_round_trip() {
        for password in ["p", "exactly-16-bytes", "a password longer than one block"] {
            let auth = [0x42u8; 16];
            let encrypted = encrypt_password(password, b"sharedsecret", &auth);
            assert_eq!(encrypted.len() % 16, 0);
            let decrypted = decrypt_password(&encrypted, b"sharedsecret", &auth).unwrap();
            assert_eq!(decrypted, password.as_bytes());
        }
    }

    #[test]
    fn pap_empty_password_pads_to_one_block() {
        let encrypted = encrypt_password("", b"s", &[0u8; 16]);
        assert_eq!(encrypted.len(), 16);
        assert!(decrypt_password(&encrypted, b"s", &[0u8; 16]).unwrap().is_empty());
    }

    #[test]
    fn pap_truncates_at_128_bytes() {
        let long = "a".repeat(130);
        let auth = [9u8; 16];
        let encrypted = encrypt_password(&long, b"s", &auth);
        assert_eq!(encrypted.len(), 128);
        let decrypted = decrypt_password(&encrypted, b"s", &auth).unwrap();
        assert_eq!(decrypted, long.as_bytes()[..128].to_vec());
    }

    #[test]
    fn pap_rejects_ragged_ciphertext() {
        assert!(decrypt_password(&[0u8; 15], b"s", &[0u8; 16]).is_err());
        assert!(decrypt_password(&[], b"s", &[0u8; 16]).is_err());
        assert!(decrypt_password(&[0u8; 144], b"s", &[0u8; 16]).is_err());
    }

    #[test]
    fn response_authenticator_round_trip() {
        let request_auth = [3u8; 16];
        let mut reply = Packet::new(Code::AccessAccept, 42);
        reply.add_attribute(Attribute::string(18, "welcome"));
        reply.authenticator =
            Some(calculate_response_authenticator(&reply, &request_auth, b"secret").unwrap());

        assert!(verify_response_authenticator(&reply, &request_auth, b"secret").unwrap());
        assert!(!verify_response_authenticator(&reply, &request_auth, b"other").unwrap());
        assert!(!verify_response_authenticator(&reply, &[4u8; 16], b"secret").unwrap());
    }

    #[test]
    fn deterministic_request_authenticator_round_trip() {
        let mut request = Packet::new(Code::AccountingRequest, 7);
        request.add_attribute(Attribute::string(1, "user"));
        request.add_attribute(Attribute::integer(40, 1));
        request.authenticator =
            Some(calculate_request_authenticator(&request, b"secret").unwrap());

        assert!(verify_request_authenticator(&request, b"secret").unwrap());
        assert!(!verify_request_authenticator(&request, b"wrong").unwrap());
    }
}
