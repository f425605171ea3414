use super::{AttributeError, Vsa};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Value kind tag carried by a dictionary descriptor.
///
/// The tag picks the decoded representation of an attribute; attributes with
/// no dictionary entry fall back to [`ValueKind::Octets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Octets,
    Integer,
    /// Seconds since the epoch; encoded exactly like `Integer`.
    Date,
    Ipv4,
    Ipv6,
    Ipv6Prefix,
    /// Vendor-Specific container (attribute 26).
    VendorSpecific,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Octets => "octets",
            ValueKind::Integer => "integer",
            ValueKind::Date => "date",
            ValueKind::Ipv4 => "ipv4",
            ValueKind::Ipv6 => "ipv6",
            ValueKind::Ipv6Prefix => "ipv6-prefix",
            ValueKind::VendorSpecific => "vendor-specific",
        };
        f.write_str(name)
    }
}

/// An IPv6 prefix value: `[reserved:1][prefix-length:1][prefix bytes 0..=16]`
/// on the wire. Prefix bytes missing from the wire are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Prefix {
    pub addr: Ipv6Addr,
    pub prefix_len: u8,
}

impl fmt::Display for Ipv6Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// A decoded attribute value.
///
/// The variant is selected by the dictionary's [`ValueKind`] tag when a
/// packet is decoded; constructors on [`super::Attribute`] pick it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Octets(Vec<u8>),
    Integer(u32),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Ipv6Prefix(Ipv6Prefix),
    Vendor(Vsa),
}

impl Value {
    /// Decode raw value bytes as `kind`.
    ///
    /// `tlv_length` is the full on-wire attribute length (value + 2) and is
    /// only used for error reporting. A string value that is not valid UTF-8
    /// decodes as [`Value::Octets`] so the raw bytes survive unchanged.
    pub fn decode(kind: ValueKind, data: &[u8]) -> Result<Value, AttributeError> {
        let tlv_length = data.len() + 2;
        match kind {
            ValueKind::String => Ok(match String::from_utf8(data.to_vec()) {
                Ok(text) => Value::String(text),
                Err(raw) => Value::Octets(raw.into_bytes()),
            }),
            ValueKind::Octets => Ok(Value::Octets(data.to_vec())),
            ValueKind::Integer | ValueKind::Date => {
                if data.len() != 4 {
                    return Err(AttributeError::BadAttributeLength {
                        kind,
                        length: tlv_length,
                    });
                }
                Ok(Value::Integer(u32::from_be_bytes([
                    data[0], data[1], data[2], data[3],
                ])))
            }
            ValueKind::Ipv4 => {
                if data.len() != 4 {
                    return Err(AttributeError::BadAttributeLength {
                        kind,
                        length: tlv_length,
                    });
                }
                Ok(Value::Ipv4(Ipv4Addr::new(data[0], data[1], data[2], data[3])))
            }
            ValueKind::Ipv6 => {
                if data.len() != 16 {
                    return Err(AttributeError::BadAttributeLength {
                        kind,
                        length: tlv_length,
                    });
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(data);
                Ok(Value::Ipv6(Ipv6Addr::from(octets)))
            }
            ValueKind::Ipv6Prefix => {
                if data.len() < 2 || data.len() > 18 {
                    return Err(AttributeError::BadAttributeLength {
                        kind,
                        length: tlv_length,
                    });
                }
                let prefix_len = data[1];
                let mut octets = [0u8; 16];
                octets[..data.len() - 2].copy_from_slice(&data[2..]);
                Ok(Value::Ipv6Prefix(Ipv6Prefix {
                    addr: Ipv6Addr::from(octets),
                    prefix_len,
                }))
            }
            // The VSA payload needs the dictionary for its sub-attributes,
            // so the container is decoded in Vsa::read, not here.
            ValueKind::VendorSpecific => Err(AttributeError::MalformedVsa(
                "vendor-specific value decoded outside its container".into(),
            )),
        }
    }

    /// Encode the value bytes. The VSA variant frames itself in
    /// [`Vsa::write`] and never reaches this path.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Value::String(s) => s.as_bytes().to_vec(),
            Value::Octets(b) => b.clone(),
            Value::Integer(v) => v.to_be_bytes().to_vec(),
            Value::Ipv4(a) => a.octets().to_vec(),
            Value::Ipv6(a) => a.octets().to_vec(),
            Value::Ipv6Prefix(p) => {
                let mut out = Vec::with_capacity(18);
                out.push(0);
                out.push(p.prefix_len);
                out.extend_from_slice(&p.addr.octets());
                out
            }
            Value::Vendor(_) => Vec::new(),
        }
    }

    /// The wire length of the encoded value bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::String(s) => s.len(),
            Value::Octets(b) => b.len(),
            Value::Integer(_) | Value::Ipv4(_) => 4,
            Value::Ipv6(_) => 16,
            Value::Ipv6Prefix(_) => 18,
            Value::Vendor(vsa) => vsa.payload_len(),
        }
    }

    /// Render the value as text: strings verbatim, octets as `0x` + lowercase
    /// hex, addresses in their canonical notation, integers in decimal.
    /// Enumerated integers are rendered by [`super::Attribute::format`],
    /// which has the dictionary at hand.
    pub fn as_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Octets(b) => {
                let mut out = String::with_capacity(2 + b.len() * 2);
                out.push_str("0x");
                for byte in b {
                    out.push_str(&format!("{byte:02x}"));
                }
                out
            }
            Value::Integer(v) => v.to_string(),
            Value::Ipv4(a) => a.to_string(),
            Value::Ipv6(a) => a.to_string(),
            Value::Ipv6Prefix(p) => p.to_string(),
            Value::Vendor(vsa) => format!(
                "vendor {} ({} sub-attributes)",
                vsa.vendor_id(),
                vsa.sub_attributes().len()
            ),
        }
    }

    /// Parse `text` as a value of `kind`. The inverse of [`Value::as_text`]
    /// for every kind except the VSA container, which has no text form.
    pub fn from_text(kind: ValueKind, text: &str) -> Result<Value, AttributeError> {
        let invalid = |reason: &str| AttributeError::InvalidText {
            kind,
            text: text.to_string(),
            reason: reason.to_string(),
        };
        match kind {
            ValueKind::String => Ok(Value::String(text.to_string())),
            ValueKind::Octets => {
                let hex = text.strip_prefix("0x").unwrap_or(text);
                if hex.len() % 2 != 0 {
                    return Err(invalid("odd number of hex digits"));
                }
                let mut bytes = Vec::with_capacity(hex.len() / 2);
                for i in (0..hex.len()).step_by(2) {
                    let byte = u8::from_str_radix(&hex[i..i + 2], 16)
                        .map_err(|_| invalid("not a hex digit"))?;
                    bytes.push(byte);
                }
                Ok(Value::Octets(bytes))
            }
            ValueKind::Integer | ValueKind::Date => text
                .parse::<u32>()
                .map(Value::Integer)
                .map_err(|_| invalid("not an unsigned 32-bit integer")),
            ValueKind::Ipv4 => text
                .parse::<Ipv4Addr>()
                .map(Value::Ipv4)
                .map_err(|_| invalid("not a dotted-quad IPv4 address")),
            ValueKind::Ipv6 => text
                .parse::<Ipv6Addr>()
                .map(Value::Ipv6)
                .map_err(|_| invalid("not an IPv6 address")),
            ValueKind::Ipv6Prefix => {
                let (addr, len) = text
                    .split_once('/')
                    .ok_or_else(|| invalid("missing /prefix-length"))?;
                let addr = addr
                    .parse::<Ipv6Addr>()
                    .map_err(|_| invalid("not an IPv6 address"))?;
                let prefix_len = len
                    .parse::<u8>()
                    .ok()
                    .filter(|l| *l <= 128)
                    .ok_or_else(|| invalid("prefix length must be 0..=128"))?;
                Ok(Value::Ipv6Prefix(Ipv6Prefix { addr, prefix_len }))
            }
            ValueKind::VendorSpecific => Err(invalid("vendor-specific has no text form")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_does_not_sign_extend() {
        let v = Value::decode(ValueKind::Integer, &[0xff, 0xff, 0xff, 0xff]).unwrap();
        assert_eq!(v, Value::Integer(0xFFFF_FFFF));
        assert_eq!(v.as_text(), "4294967295");
    }

    #[test]
    fn integer_rejects_wrong_width() {
        let err = Value::decode(ValueKind::Integer, &[0, 0, 1]).unwrap_err();
        assert_eq!(
            err,
            AttributeError::BadAttributeLength {
                kind: ValueKind::Integer,
                length: 5
            }
        );
    }

    #[test]
    fn string_falls_back_to_octets_on_invalid_utf8() {
        let v = Value::decode(ValueKind::String, &[0xff, 0xfe]).unwrap();
        assert_eq!(v, Value::Octets(vec![0xff, 0xfe]));
        assert_eq!(v.as_text(), "0xfffe");
    }

    #[test]
    fn empty_string_round_trips() {
        let v = Value::decode(ValueKind::String, &[]).unwrap();
        assert_eq!(v, Value::String(String::new()));
        assert!(v.encode().is_empty());
    }

    #[test]
    fn ipv6_prefix_fills_missing_bytes_with_zero() {
        // 2001:db8::/32 truncated to the four significant bytes
        let v = Value::decode(ValueKind::Ipv6Prefix, &[0, 32, 0x20, 0x01, 0x0d, 0xb8]).unwrap();
        assert_eq!(v.as_text(), "2001:db8::/32");
    }

    #[test]
    fn ipv6_prefix_boundary_lengths() {
        let zero = Value::decode(ValueKind::Ipv6Prefix, &[0, 0]).unwrap();
        assert_eq!(zero.as_text(), "::/0");

        let mut full = vec![0, 128];
        full.extend_from_slice(&[0xab; 16]);
        let v = Value::decode(ValueKind::Ipv6Prefix, &full).unwrap();
        assert_eq!(
            v,
            Value::Ipv6Prefix(Ipv6Prefix {
                addr: Ipv6Addr::from([0xab; 16]),
                prefix_len: 128
            })
        );

        assert!(Value::decode(ValueKind::Ipv6Prefix, &[0]).is_err());
        assert!(Value::decode(ValueKind::Ipv6Prefix, &[0u8; 19]).is_err());
    }

    #[test]
    fn text_round_trips() {
        for (kind, text) in [
            (ValueKind::String, "nemo"),
            (ValueKind::Octets, "0xdeadbeef"),
            (ValueKind::Integer, "4294967295"),
            (ValueKind::Ipv4, "192.0.2.7"),
            (ValueKind::Ipv6, "2001:db8::1"),
            (ValueKind::Ipv6Prefix, "2001:db8::/32"),
        ] {
            let value = Value::from_text(kind, text).unwrap();
            assert_eq!(value.as_text(), text, "{kind}");
        }
    }

    #[test]
    fn bad_text_is_rejected() {
        assert!(Value::from_text(ValueKind::Integer, "not-a-number").is_err());
        assert!(Value::from_text(ValueKind::Octets, "0xabc").is_err());
        assert!(Value::from_text(ValueKind::Ipv6Prefix, "2001:db8::/200").is_err());
    }
}
