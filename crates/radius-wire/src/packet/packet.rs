use super::Code;
use crate::attributes::{Attribute, AttributeError};
use crate::dictionary::Dictionary;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Header or TLV framing inconsistency.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// Encoded datagram past the 4096-byte ceiling. Surfaced before any
    /// transmission; an oversized packet is a programmer error.
    #[error("encoded packet of {0} bytes exceeds the 4096-byte limit")]
    PacketTooLong(usize),

    /// Reply identifier does not echo the request's.
    #[error("response identifier {received} does not match request identifier {expected}")]
    IdentifierMismatch { expected: u8, received: u8 },

    /// Response Authenticator failed its MD5 recomputation.
    #[error("response authenticator verification failed")]
    BadResponseAuthenticator,

    /// Deterministic request authenticator failed its MD5 recomputation.
    #[error("request authenticator verification failed")]
    BadRequestAuthenticator,

    /// Message-Authenticator attribute failed its HMAC-MD5 recomputation.
    #[error("message authenticator verification failed")]
    BadMessageAuthenticator,

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// A RADIUS packet: the RFC 2865 Section 3 header plus an ordered attribute
/// list.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Authenticator                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// `authenticator` is `None` on a request that has not been signed yet;
/// encoding an unsigned packet writes sixteen zero bytes, which is exactly
/// the placeholder the deterministic authenticator constructions hash over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub code: Code,
    pub identifier: u8,
    pub authenticator: Option<[u8; 16]>,
    pub attributes: Vec<Attribute>,
}

impl Packet {
    /// Header size: code + identifier + length + authenticator.
    pub const HEADER_LEN: usize = 20;
    /// Largest datagram RFC 2865 allows.
    pub const MAX_LEN: usize = 4096;

    pub fn new(code: Code, identifier: u8) -> Self {
        Packet {
            code,
            identifier,
            authenticator: None,
            attributes: Vec::new(),
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// First attribute with the given standard-space code.
    pub fn find_attribute(&self, code: u8) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.vendor.is_none() && a.code == code)
    }

    /// All attributes with the given standard-space code.
    pub fn find_all_attributes(&self, code: u8) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|a| a.vendor.is_none() && a.code == code)
            .collect()
    }

    /// First sub-attribute with the given code inside any VSA container for
    /// `vendor`.
    pub fn find_vendor_attribute(&self, vendor: u32, code: u8) -> Option<&Attribute> {
        self.attributes
            .iter()
            .filter_map(|a| a.as_vsa())
            .filter(|vsa| vsa.vendor_id() == vendor)
            .find_map(|vsa| vsa.sub(code))
    }

    /// Look an attribute up by dictionary name, descending into VSA
    /// containers for vendor sub-attributes.
    pub fn attribute_by_name<'a>(
        &'a self,
        dict: &Dictionary,
        name: &str,
    ) -> Option<&'a Attribute> {
        let desc = dict.attribute_by_name(name)?;
        match desc.vendor {
            None => self.find_attribute(desc.code),
            Some(vendor) => self.find_vendor_attribute(vendor, desc.code),
        }
    }

    /// The datagram length this packet will encode to.
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_LEN
            + self
                .attributes
                .iter()
                .map(Attribute::encoded_len)
                .sum::<usize>()
    }

    /// Serialize the packet.
    ///
    /// Attributes are canonicalized to ascending type-code order; the sort
    /// is stable, so attributes sharing a code (and VSA sub-attributes,
    /// which are not sorted at all) keep their insertion order.
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let total = self.encoded_len();
        if total > Self::MAX_LEN {
            return Err(PacketError::PacketTooLong(total));
        }

        let mut ordered: Vec<&Attribute> = self.attributes.iter().collect();
        ordered.sort_by_key(|a| a.code);

        let mut buf = Vec::with_capacity(total);
        buf.push(self.code.as_u8());
        buf.push(self.identifier);
        buf.extend_from_slice(&(total as u16).to_be_bytes());
        buf.extend_from_slice(&self.authenticator.unwrap_or([0u8; 16]));
        for attr in ordered {
            attr.write(&mut buf)?;
        }
        debug_assert_eq!(buf.len(), total);
        Ok(buf)
    }

    /// Deserialize a datagram, selecting typed attribute views through
    /// `dict`.
    pub fn decode(data: &[u8], dict: &Dictionary) -> Result<Self, PacketError> {
        Self::decode_as(data, dict, None)
    }

    /// Deserialize with an optional code override for callers that already
    /// know what kind of packet the bytes must be.
    pub fn decode_as(
        data: &[u8],
        dict: &Dictionary,
        force_code: Option<Code>,
    ) -> Result<Self, PacketError> {
        if data.len() < Self::HEADER_LEN {
            return Err(PacketError::MalformedPacket(format!(
                "datagram of {} bytes is shorter than the 20-byte header",
                data.len()
            )));
        }

        let code = match force_code {
            Some(code) => code,
            None => Code::from_u8(data[0]).ok_or_else(|| {
                PacketError::MalformedPacket(format!("unknown packet code {}", data[0]))
            })?,
        };
        let identifier = data[1];
        let declared = u16::from_be_bytes([data[2], data[3]]) as usize;

        if declared < Self::HEADER_LEN || declared > Self::MAX_LEN {
            return Err(PacketError::MalformedPacket(format!(
                "declared length {declared} outside 20..=4096"
            )));
        }
        if data.len() < declared {
            return Err(PacketError::MalformedPacket(format!(
                "datagram of {} bytes shorter than declared length {declared}",
                data.len()
            )));
        }

        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&data[4..20]);

        // Pass 1: the TLV walk must cover declared-20 bytes exactly, every
        // length at least 2.
        let body = &data[Self::HEADER_LEN..declared];
        let mut offset = 0;
        while offset < body.len() {
            if body.len() - offset < 2 {
                return Err(PacketError::MalformedPacket(
                    "truncated attribute header".into(),
                ));
            }
            let length = body[offset + 1] as usize;
            if length < 2 || offset + length > body.len() {
                return Err(PacketError::MalformedPacket(format!(
                    "attribute {} declares length {length} with {} bytes left",
                    body[offset],
                    body.len() - offset
                )));
            }
            offset += length;
        }

        // Pass 2: construct typed attributes through the dictionary.
        let mut attributes = Vec::new();
        let mut offset = 0;
        while offset < body.len() {
            let code = body[offset];
            let length = body[offset + 1] as usize;
            let attr = Attribute::from_wire(dict, None, code, &body[offset + 2..offset + length])?;
            attributes.push(attr);
            offset += length;
        }

        Ok(Packet {
            code,
            identifier,
            authenticator: Some(authenticator),
            attributes,
        })
    }

    /// Deserialize and verify a reply to `request`: the identifier must
    /// echo the request's and the Response Authenticator must recompute
    /// over the request authenticator and the shared secret.
    pub fn decode_response(
        data: &[u8],
        dict: &Dictionary,
        request: &Packet,
        secret: &[u8],
    ) -> Result<Self, PacketError> {
        let response = Self::decode(data, dict)?;
        if response.identifier != request.identifier {
            return Err(PacketError::IdentifierMismatch {
                expected: request.identifier,
                received: response.identifier,
            });
        }
        let request_auth = request.authenticator.ok_or_else(|| {
            PacketError::MalformedPacket("request was never encoded, no authenticator".into())
        })?;
        // Hash the bytes as received; the responder's attribute order is
        // part of the signed content and need not match this encoder's.
        let declared = u16::from_be_bytes([data[2], data[3]]) as usize;
        if !crate::auth::verify_response_authenticator_bytes(
            &data[..declared],
            &request_auth,
            secret,
        ) {
            return Err(PacketError::BadResponseAuthenticator);
        }
        Ok(response)
    }
}
