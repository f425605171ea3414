//! Request facades: one type per request kind, each enforcing its
//! mandatory attributes and picking the authenticator construction the RFC
//! assigns to it.
//!
//! A facade draws its identifier and (for Access-Request) its random
//! authenticator when first needed and keeps both across re-encodes, so a
//! retried request is byte-identical and responders can deduplicate.

use crate::accounting::AcctStatusType;
use crate::attributes::{
    Attribute, AttributeError, StandardAttribute, MICROSOFT_VENDOR_ID, MS_CHAP2_RESPONSE,
    MS_CHAP_CHALLENGE,
};
use crate::dictionary::Dictionary;
use crate::packet::{Code, Packet, PacketError};
use crate::{auth, chap, ident, message_auth};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// An Access-Request with no recognized credential attributes.
    #[error("access-request carries no recognized credential attributes")]
    MissingCredentials,

    /// Verification asked for a protocol this library only classifies.
    #[error("password verification is not implemented for {0:?}")]
    UnsupportedAuthProtocol(AuthProtocol),

    /// A request kind that mandates exactly one User-Name.
    #[error("request requires exactly one User-Name attribute, found {0}")]
    UserNameCount(usize),

    /// A mandatory attribute is absent.
    #[error("missing required attribute {0}")]
    MissingAttribute(&'static str),

    /// Acct-Status-Type outside the 1..=15 wire range.
    #[error("Acct-Status-Type value {0} is outside 1..=15")]
    InvalidAcctStatusType(u32),

    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// How an Access-Request proves the password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProtocol {
    /// User-Password attribute, RFC 2865 Section 5.2 obfuscation.
    Pap,
    /// CHAP-Password + CHAP-Challenge attributes.
    Chap,
    /// Microsoft vendor sub-attributes 11/25. Classified, not verified.
    MsChapV2,
    /// EAP-Message attribute. Classified, not verified.
    Eap,
}

fn count_user_names(packet: &Packet) -> usize {
    packet
        .find_all_attributes(StandardAttribute::UserName as u8)
        .len()
}

fn require_one_user_name(packet: &Packet) -> Result<(), RequestError> {
    match count_user_names(packet) {
        1 => Ok(()),
        n => Err(RequestError::UserNameCount(n)),
    }
}

/// Access-Request (code 1): exactly one User-Name plus credentials
/// materialized from a cleartext password at encode time.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    packet: Packet,
    password: Option<String>,
    auth_protocol: AuthProtocol,
    chap_ident: Option<u8>,
    chap_challenge: Option<[u8; 16]>,
    sign_messages: bool,
}

impl AccessRequest {
    pub fn new(user_name: &str) -> Self {
        Self::with_identifier(user_name, ident::next_identifier())
    }

    /// Like [`AccessRequest::new`] with a caller-chosen identifier, for
    /// isolated identifier spaces.
    pub fn with_identifier(user_name: &str, identifier: u8) -> Self {
        let mut packet = Packet::new(Code::AccessRequest, identifier);
        packet.add_attribute(Attribute::string(
            StandardAttribute::UserName as u8,
            user_name,
        ));
        AccessRequest {
            packet,
            password: None,
            auth_protocol: AuthProtocol::Pap,
            chap_ident: None,
            chap_challenge: None,
            sign_messages: false,
        }
    }

    /// Interpret an already-decoded Access-Request, classifying the auth
    /// protocol from the credential attributes it carries. This is the
    /// consuming-side path; the cleartext password stays empty.
    pub fn from_packet(packet: Packet) -> Result<Self, RequestError> {
        require_one_user_name(&packet)?;
        let auth_protocol = if packet
            .find_attribute(StandardAttribute::UserPassword as u8)
            .is_some()
        {
            AuthProtocol::Pap
        } else if packet
            .find_attribute(StandardAttribute::ChapPassword as u8)
            .is_some()
        {
            AuthProtocol::Chap
        } else if packet
            .find_vendor_attribute(MICROSOFT_VENDOR_ID, MS_CHAP_CHALLENGE)
            .is_some()
            || packet
                .find_vendor_attribute(MICROSOFT_VENDOR_ID, MS_CHAP2_RESPONSE)
                .is_some()
        {
            AuthProtocol::MsChapV2
        } else if packet
            .find_attribute(StandardAttribute::EapMessage as u8)
            .is_some()
        {
            AuthProtocol::Eap
        } else {
            return Err(RequestError::MissingCredentials);
        };

        Ok(AccessRequest {
            packet,
            password: None,
            auth_protocol,
            chap_ident: None,
            chap_challenge: None,
            sign_messages: false,
        })
    }

    /// Decode and classify raw Access-Request bytes.
    pub fn decode(data: &[u8], dict: &Dictionary) -> Result<Self, RequestError> {
        Self::from_packet(Packet::decode(data, dict)?)
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(password.into());
    }

    pub fn set_auth_protocol(&mut self, protocol: AuthProtocol) {
        self.auth_protocol = protocol;
    }

    pub fn auth_protocol(&self) -> AuthProtocol {
        self.auth_protocol
    }

    /// Include a Message-Authenticator attribute when encoding.
    pub fn sign_messages(&mut self, enabled: bool) {
        self.sign_messages = enabled;
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.packet.add_attribute(attribute);
    }

    pub fn identifier(&self) -> u8 {
        self.packet.identifier
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn user_name(&self) -> Option<&str> {
        self.packet
            .find_attribute(StandardAttribute::UserName as u8)
            .and_then(Attribute::as_string)
    }

    /// Serialize for transmission.
    ///
    /// The random authenticator is generated on the first encode and kept;
    /// credential attributes are rebuilt from the cleartext on every call,
    /// with stable CHAP state so retries stay byte-identical.
    pub fn encode(&mut self, secret: &[u8]) -> Result<Vec<u8>, RequestError> {
        require_one_user_name(&self.packet)?;

        let authenticator = *self
            .packet
            .authenticator
            .get_or_insert_with(|| auth::generate_request_authenticator(secret));

        self.packet.attributes.retain(|a| {
            !(a.vendor.is_none()
                && matches!(
                    a.code,
                    c if c == StandardAttribute::UserPassword as u8
                        || c == StandardAttribute::ChapPassword as u8
                        || c == StandardAttribute::ChapChallenge as u8
                        || c == StandardAttribute::MessageAuthenticator as u8
                ))
        });

        match self.auth_protocol {
            AuthProtocol::Pap => {
                let password = self
                    .password
                    .as_deref()
                    .ok_or(RequestError::MissingCredentials)?;
                let encrypted = auth::encrypt_password(password, secret, &authenticator);
                self.packet.add_attribute(Attribute::octets(
                    StandardAttribute::UserPassword as u8,
                    encrypted,
                ));
            }
            AuthProtocol::Chap => {
                let password = self
                    .password
                    .as_deref()
                    .ok_or(RequestError::MissingCredentials)?;
                let challenge = *self
                    .chap_challenge
                    .get_or_insert_with(chap::generate_challenge);
                let chap_ident = *self
                    .chap_ident
                    .get_or_insert_with(|| rand::random::<u8>());
                let chap_password = chap::ChapPassword {
                    ident: chap_ident,
                    hash: chap::compute_chap_hash(chap_ident, password, &challenge),
                };
                self.packet.add_attribute(Attribute::octets(
                    StandardAttribute::ChapPassword as u8,
                    chap_password.to_bytes(),
                ));
                self.packet.add_attribute(Attribute::octets(
                    StandardAttribute::ChapChallenge as u8,
                    challenge.to_vec(),
                ));
            }
            AuthProtocol::MsChapV2 | AuthProtocol::Eap => {
                // Credentials are caller-supplied attributes for these.
            }
        }

        if self.sign_messages {
            self.packet.add_attribute(Attribute::octets(
                StandardAttribute::MessageAuthenticator as u8,
                vec![0u8; 16],
            ));
        }

        let mut bytes = self.packet.encode()?;
        if self.sign_messages {
            message_auth::sign_request(&mut bytes, secret);
        }
        Ok(bytes)
    }

    /// Verify a candidate password against the credentials this request
    /// carries (consuming-side path).
    ///
    /// Malformed credential attributes are errors; a clean mismatch is
    /// `Ok(false)`.
    pub fn verify_password(&self, secret: &[u8], candidate: &str) -> Result<bool, RequestError> {
        let authenticator = self.packet.authenticator.ok_or_else(|| {
            PacketError::MalformedPacket("request carries no authenticator".into())
        })?;

        match self.auth_protocol {
            AuthProtocol::Pap => {
                let encrypted = self
                    .packet
                    .find_attribute(StandardAttribute::UserPassword as u8)
                    .and_then(Attribute::as_octets)
                    .ok_or(RequestError::MissingAttribute("User-Password"))?;
                let decrypted = auth::decrypt_password(encrypted, secret, &authenticator)?;
                Ok(decrypted == candidate.as_bytes())
            }
            AuthProtocol::Chap => {
                let chap_password = self
                    .packet
                    .find_attribute(StandardAttribute::ChapPassword as u8)
                    .and_then(Attribute::as_octets)
                    .ok_or(RequestError::MissingAttribute("CHAP-Password"))?;
                // RFC 2865 Section 5.3: without a CHAP-Challenge attribute
                // the request authenticator is the challenge.
                let challenge = match self
                    .packet
                    .find_attribute(StandardAttribute::ChapChallenge as u8)
                    .and_then(Attribute::as_octets)
                {
                    Some(c) => c.to_vec(),
                    None => authenticator.to_vec(),
                };
                Ok(chap::verify_chap_password(chap_password, &challenge, candidate)?)
            }
            protocol => Err(RequestError::UnsupportedAuthProtocol(protocol)),
        }
    }
}

/// Accounting-Request (code 4): User-Name plus Acct-Status-Type in 1..=15,
/// signed with the deterministic request authenticator.
#[derive(Debug, Clone)]
pub struct AccountingRequest {
    packet: Packet,
}

impl AccountingRequest {
    pub fn new(user_name: &str, status: AcctStatusType) -> Self {
        Self::with_identifier(user_name, status, ident::next_identifier())
    }

    pub fn with_identifier(user_name: &str, status: AcctStatusType, identifier: u8) -> Self {
        let mut packet = Packet::new(Code::AccountingRequest, identifier);
        packet.add_attribute(Attribute::string(
            StandardAttribute::UserName as u8,
            user_name,
        ));
        packet.add_attribute(Attribute::integer(
            StandardAttribute::AcctStatusType as u8,
            status.as_u32(),
        ));
        AccountingRequest { packet }
    }

    pub fn from_packet(packet: Packet) -> Result<Self, RequestError> {
        let request = AccountingRequest { packet };
        request.validate()?;
        Ok(request)
    }

    pub fn decode(data: &[u8], dict: &Dictionary) -> Result<Self, RequestError> {
        Self::from_packet(Packet::decode(data, dict)?)
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.packet.add_attribute(attribute);
    }

    pub fn identifier(&self) -> u8 {
        self.packet.identifier
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn status_type(&self) -> Option<u32> {
        self.packet
            .find_attribute(StandardAttribute::AcctStatusType as u8)
            .and_then(Attribute::as_integer)
    }

    fn validate(&self) -> Result<(), RequestError> {
        if count_user_names(&self.packet) == 0 {
            return Err(RequestError::MissingAttribute("User-Name"));
        }
        let status = self
            .status_type()
            .ok_or(RequestError::MissingAttribute("Acct-Status-Type"))?;
        if !AcctStatusType::valid_wire_value(status) {
            return Err(RequestError::InvalidAcctStatusType(status));
        }
        Ok(())
    }

    pub fn encode(&mut self, secret: &[u8]) -> Result<Vec<u8>, RequestError> {
        self.validate()?;
        let authenticator = auth::calculate_request_authenticator(&self.packet, secret)?;
        self.packet.authenticator = Some(authenticator);
        Ok(self.packet.encode()?)
    }

    /// Consuming-side hook: recompute the deterministic authenticator and
    /// compare. Recomputes over the canonical encoding; for a raw datagram
    /// in peer order use [`auth::verify_request_authenticator_bytes`].
    pub fn verify(&self, secret: &[u8]) -> Result<(), RequestError> {
        if !auth::verify_request_authenticator(&self.packet, secret)? {
            return Err(PacketError::BadRequestAuthenticator.into());
        }
        Ok(())
    }
}

/// CoA-Request (43) or Disconnect-Request (40), RFC 5176. Same
/// deterministic authenticator as accounting; no attribute is mandatory
/// beyond what the caller supplies.
#[derive(Debug, Clone)]
pub struct DynAuthRequest {
    packet: Packet,
}

impl DynAuthRequest {
    pub fn coa() -> Self {
        DynAuthRequest {
            packet: Packet::new(Code::CoaRequest, ident::next_identifier()),
        }
    }

    pub fn disconnect() -> Self {
        DynAuthRequest {
            packet: Packet::new(Code::DisconnectRequest, ident::next_identifier()),
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.packet.add_attribute(attribute);
    }

    pub fn identifier(&self) -> u8 {
        self.packet.identifier
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn encode(&mut self, secret: &[u8]) -> Result<Vec<u8>, RequestError> {
        let authenticator = auth::calculate_request_authenticator(&self.packet, secret)?;
        self.packet.authenticator = Some(authenticator);
        Ok(self.packet.encode()?)
    }

    pub fn verify(&self, secret: &[u8]) -> Result<(), RequestError> {
        if !auth::verify_request_authenticator(&self.packet, secret)? {
            return Err(PacketError::BadRequestAuthenticator.into());
        }
        Ok(())
    }
}

/// A decoded inbound request, dispatched on the packet code.
#[derive(Debug)]
pub enum DecodedRequest {
    Access(Box<AccessRequest>),
    Accounting(Box<AccountingRequest>),
    /// Anything without a dedicated facade.
    Other(Packet),
}

/// Decode raw request bytes into the matching facade.
pub fn decode_request(data: &[u8], dict: &Dictionary) -> Result<DecodedRequest, RequestError> {
    let packet = Packet::decode(data, dict)?;
    match packet.code {
        Code::AccessRequest => Ok(DecodedRequest::Access(Box::new(AccessRequest::from_packet(
            packet,
        )?))),
        Code::AccountingRequest => Ok(DecodedRequest::Accounting(Box::new(
            AccountingRequest::from_packet(packet)?,
        ))),
        _ => Ok(DecodedRequest::Other(packet)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Vsa;
    use crate::dictionary::default_dictionary;

    const SECRET: &[u8] = b"xyzzy5461";

    #[test]
    fn pap_request_round_trips_through_the_server_path() {
        let mut request = AccessRequest::with_identifier("nemo", 3);
        request.set_password("arctangent");
        let bytes = request.encode(SECRET).unwrap();

        let decoded = AccessRequest::decode(&bytes, default_dictionary()).unwrap();
        assert_eq!(decoded.auth_protocol(), AuthProtocol::Pap);
        assert_eq!(decoded.user_name(), Some("nemo"));
        assert!(decoded.verify_password(SECRET, "arctangent").unwrap());
        assert!(!decoded.verify_password(SECRET, "cotangent").unwrap());
    }

    #[test]
    fn chap_request_round_trips_through_the_server_path() {
        let mut request = AccessRequest::with_identifier("nemo", 4);
        request.set_password("arctangent");
        request.set_auth_protocol(AuthProtocol::Chap);
        let bytes = request.encode(SECRET).unwrap();

        let decoded = AccessRequest::decode(&bytes, default_dictionary()).unwrap();
        assert_eq!(decoded.auth_protocol(), AuthProtocol::Chap);
        assert!(decoded.verify_password(SECRET, "arctangent").unwrap());
        assert!(!decoded.verify_password(SECRET, "wrong").unwrap());
    }

    #[test]
    fn retries_are_byte_identical() {
        let mut request = AccessRequest::with_identifier("nemo", 5);
        request.set_password("arctangent");
        request.set_auth_protocol(AuthProtocol::Chap);
        let first = request.encode(SECRET).unwrap();
        let second = request.encode(SECRET).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn encode_without_credentials_fails() {
        let mut request = AccessRequest::with_identifier("nemo", 6);
        let err = request.encode(SECRET).unwrap_err();
        assert_eq!(err, RequestError::MissingCredentials);
    }

    #[test]
    fn classification_covers_all_protocols() {
        let dict = default_dictionary();

        let mut packet = Packet::new(Code::AccessRequest, 1);
        packet.authenticator = Some([0u8; 16]);
        packet.add_attribute(Attribute::string(1, "u"));
        packet.add_attribute(Attribute::octets(79, vec![2, 1, 0, 4]));
        let bytes = packet.encode().unwrap();
        let decoded = AccessRequest::decode(&bytes, dict).unwrap();
        assert_eq!(decoded.auth_protocol(), AuthProtocol::Eap);
        assert_eq!(
            decoded.verify_password(SECRET, "x").unwrap_err(),
            RequestError::UnsupportedAuthProtocol(AuthProtocol::Eap)
        );

        let mut packet = Packet::new(Code::AccessRequest, 1);
        packet.authenticator = Some([0u8; 16]);
        packet.add_attribute(Attribute::string(1, "u"));
        let mut vsa = Vsa::new(MICROSOFT_VENDOR_ID);
        vsa.add_sub(Attribute::vendor_octets(
            MICROSOFT_VENDOR_ID,
            MS_CHAP2_RESPONSE,
            vec![0u8; 50],
        ))
        .unwrap();
        packet.add_attribute(Attribute::vsa(vsa));
        let bytes = packet.encode().unwrap();
        let decoded = AccessRequest::decode(&bytes, dict).unwrap();
        assert_eq!(decoded.auth_protocol(), AuthProtocol::MsChapV2);
        assert_eq!(
            decoded.verify_password(SECRET, "x").unwrap_err(),
            RequestError::UnsupportedAuthProtocol(AuthProtocol::MsChapV2)
        );
    }

    #[test]
    fn request_without_credentials_is_rejected_on_decode() {
        let mut packet = Packet::new(Code::AccessRequest, 1);
        packet.authenticator = Some([0u8; 16]);
        packet.add_attribute(Attribute::string(1, "u"));
        let bytes = packet.encode().unwrap();
        let err = AccessRequest::decode(&bytes, default_dictionary()).unwrap_err();
        assert_eq!(err, RequestError::MissingCredentials);
    }

    #[test]
    fn user_name_must_appear_exactly_once() {
        let mut packet = Packet::new(Code::AccessRequest, 1);
        packet.authenticator = Some([0u8; 16]);
        packet.add_attribute(Attribute::octets(2, vec![0u8; 16]));
        let bytes = packet.encode().unwrap();
        assert_eq!(
            AccessRequest::decode(&bytes, default_dictionary()).unwrap_err(),
            RequestError::UserNameCount(0)
        );

        let mut packet = Packet::new(Code::AccessRequest, 1);
        packet.authenticator = Some([0u8; 16]);
        packet.add_attribute(Attribute::string(1, "a"));
        packet.add_attribute(Attribute::string(1, "b"));
        packet.add_attribute(Attribute::octets(2, vec![0u8; 16]));
        let bytes = packet.encode().unwrap();
        assert_eq!(
            AccessRequest::decode(&bytes, default_dictionary()).unwrap_err(),
            RequestError::UserNameCount(2)
        );
    }

    #[test]
    fn accounting_request_signs_and_verifies() {
        let mut request = AccountingRequest::with_identifier("user", AcctStatusType::Start, 42);
        let bytes = request.encode(b"secret").unwrap();

        let decoded = AccountingRequest::decode(&bytes, default_dictionary()).unwrap();
        decoded.verify(b"secret").unwrap();
        assert_eq!(
            decoded.verify(b"wrong").unwrap_err(),
            RequestError::Packet(PacketError::BadRequestAuthenticator)
        );
    }

    #[test]
    fn accounting_request_validates_status_range() {
        let mut packet = Packet::new(Code::AccountingRequest, 1);
        packet.authenticator = Some([0u8; 16]);
        packet.add_attribute(Attribute::string(1, "u"));
        packet.add_attribute(Attribute::integer(40, 16));
        let bytes = packet.encode().unwrap();
        assert_eq!(
            AccountingRequest::decode(&bytes, default_dictionary()).unwrap_err(),
            RequestError::InvalidAcctStatusType(16)
        );
    }

    #[test]
    fn dyn_auth_requests_use_the_deterministic_authenticator() {
        let mut request = DynAuthRequest::disconnect();
        request.add_attribute(Attribute::string(1, "nemo"));
        let bytes = request.encode(b"secret").unwrap();

        let packet = Packet::decode(&bytes, default_dictionary()).unwrap();
        assert_eq!(packet.code, Code::DisconnectRequest);
        assert!(auth::verify_request_authenticator(&packet, b"secret").unwrap());
        assert!(!auth::verify_request_authenticator(&packet, b"other").unwrap());
    }

    #[test]
    fn decode_request_dispatches_on_code() {
        let dict = default_dictionary();

        let mut access = AccessRequest::with_identifier("nemo", 9);
        access.set_password("pw");
        let bytes = access.encode(SECRET).unwrap();
        assert!(matches!(
            decode_request(&bytes, dict).unwrap(),
            DecodedRequest::Access(_)
        ));

        let mut acct = AccountingRequest::with_identifier("u", AcctStatusType::Stop, 10);
        let bytes = acct.encode(SECRET).unwrap();
        assert!(matches!(
            decode_request(&bytes, dict).unwrap(),
            DecodedRequest::Accounting(_)
        ));

        let mut coa = DynAuthRequest::coa();
        let bytes = coa.encode(SECRET).unwrap();
        assert!(matches!(
            decode_request(&bytes, dict).unwrap(),
            DecodedRequest::Other(_)
        ));
    }
}
