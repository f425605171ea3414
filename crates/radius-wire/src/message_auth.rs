//! Message-Authenticator attribute (RFC 2869 Section 5.14, RFC 3579
//! Section 3.2): HMAC-MD5 over the whole datagram, keyed by the shared
//! secret, with the attribute's own value zeroed while hashing.
//!
//! For replies, the authenticator field is considered to hold the
//! originating request's authenticator during the computation.

use crate::attributes::StandardAttribute;
use crate::packet::Packet;
use hmac::{Hmac, Mac};
use md5_digest::Md5;

type HmacMd5 = Hmac<Md5>;

/// HMAC-MD5 of an encoded datagram.
pub fn calculate_message_authenticator(packet_bytes: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut mac = HmacMd5::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(packet_bytes);
    let mut out = [0u8; 16];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Offset of the Message-Authenticator value within the datagram, found by
/// walking the TLVs. `None` when the attribute is absent or the walk does
/// not line up (framing errors are the codec's to report).
fn find_value_offset(packet_bytes: &[u8]) -> Option<usize> {
    let mut offset = Packet::HEADER_LEN;
    while offset + 2 <= packet_bytes.len() {
        let code = packet_bytes[offset];
        let length = packet_bytes[offset + 1] as usize;
        if length < 2 || offset + length > packet_bytes.len() {
            return None;
        }
        if code == StandardAttribute::MessageAuthenticator as u8 && length == 18 {
            return Some(offset + 2);
        }
        offset += length;
    }
    None
}

/// Fill in the Message-Authenticator of an encoded request in place.
///
/// The request must already carry the attribute with a zeroed (or stale)
/// 16-byte value; returns false when it does not.
pub fn sign_request(packet_bytes: &mut [u8], secret: &[u8]) -> bool {
    let Some(value_at) = find_value_offset(packet_bytes) else {
        return false;
    };
    packet_bytes[value_at..value_at + 16].fill(0);
    let mac = calculate_message_authenticator(packet_bytes, secret);
    packet_bytes[value_at..value_at + 16].copy_from_slice(&mac);
    true
}

/// Verify the Message-Authenticator of a reply, if it carries one.
///
/// Returns `None` when the attribute is absent; replies are not required
/// to include it.
pub fn verify_reply(
    reply_bytes: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Option<bool> {
    let value_at = find_value_offset(reply_bytes)?;

    let mut copy = reply_bytes.to_vec();
    copy[4..20].copy_from_slice(request_authenticator);
    copy[value_at..value_at + 16].fill(0);

    let expected = calculate_message_authenticator(&copy, secret);
    Some(reply_bytes[value_at..value_at + 16] == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;
    use crate::packet::Code;

    fn signed_request() -> (Vec<u8>, [u8; 16]) {
        let auth = [0x21u8; 16];
        let mut packet = Packet::new(Code::AccessRequest, 5);
        packet.authenticator = Some(auth);
        packet.add_attribute(Attribute::string(1, "nemo"));
        packet.add_attribute(Attribute::octets(
            StandardAttribute::MessageAuthenticator as u8,
            vec![0u8; 16],
        ));
        let mut bytes = packet.encode().unwrap();
        assert!(sign_request(&mut bytes, b"secret"));
        (bytes, auth)
    }

    #[test]
    fn sign_fills_the_placeholder() {
        let (bytes, _) = signed_request();
        let value_at = find_value_offset(&bytes).unwrap();
        assert_ne!(&bytes[value_at..value_at + 16], &[0u8; 16]);
    }

    #[test]
    fn sign_requires_the_placeholder() {
        let mut packet = Packet::new(Code::AccessRequest, 5);
        packet.authenticator = Some([0u8; 16]);
        let mut bytes = packet.encode().unwrap();
        assert!(!sign_request(&mut bytes, b"secret"));
    }

    #[test]
    fn reply_verification_round_trip() {
        let request_auth = [7u8; 16];
        let mut reply = Packet::new(Code::AccessAccept, 5);
        // Authenticator slot holds the request authenticator while the HMAC
        // is computed, then the real response authenticator goes in.
        reply.authenticator = Some(request_auth);
        reply.add_attribute(Attribute::octets(
            StandardAttribute::MessageAuthenticator as u8,
            vec![0u8; 16],
        ));
        let mut bytes = reply.encode().unwrap();
        assert!(sign_request(&mut bytes, b"secret"));

        assert_eq!(verify_reply(&bytes, &request_auth, b"secret"), Some(true));
        assert_eq!(verify_reply(&bytes, &request_auth, b"other"), Some(false));
        assert_eq!(verify_reply(&bytes, &[0u8; 16], b"secret"), Some(false));
    }

    #[test]
    fn absent_attribute_is_not_an_error() {
        let mut reply = Packet::new(Code::AccessAccept, 5);
        reply.authenticator = Some([0u8; 16]);
        let bytes = reply.encode().unwrap();
        assert_eq!(verify_reply(&bytes, &[0u8; 16], b"secret"), None);
    }

    #[test]
    fn tampering_breaks_verification() {
        let (mut bytes, auth) = signed_request();
        assert_eq!(verify_reply(&bytes, &auth, b"secret"), Some(true));
        bytes[1] ^= 1;
        assert_eq!(verify_reply(&bytes, &auth, b"secret"), Some(false));
    }
}
