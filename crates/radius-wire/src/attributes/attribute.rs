use super::{AttributeError, StandardAttribute, Value, ValueKind, Vsa};
use crate::dictionary::Dictionary;
use std::net::{Ipv4Addr, Ipv6Addr};

/// A single RADIUS attribute.
///
/// `vendor` is `None` for attributes in the standard space and `Some(id)`
/// for sub-attributes living inside a Vendor-Specific container. An
/// attribute is owned by exactly one packet or one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Type code within its space (1-255).
    pub code: u8,
    /// Owning vendor space; `None` means the standard RFC space.
    pub vendor: Option<u32>,
    /// Decoded value.
    pub value: Value,
}

impl Attribute {
    /// Largest value an attribute can carry: 255 minus the 2-byte header.
    pub const MAX_VALUE_LEN: usize = 253;

    pub fn new(code: u8, value: Value) -> Self {
        Attribute {
            code,
            vendor: None,
            value,
        }
    }

    pub fn string(code: u8, text: impl Into<String>) -> Self {
        Self::new(code, Value::String(text.into()))
    }

    pub fn octets(code: u8, bytes: Vec<u8>) -> Self {
        Self::new(code, Value::Octets(bytes))
    }

    pub fn integer(code: u8, value: u32) -> Self {
        Self::new(code, Value::Integer(value))
    }

    pub fn ipv4(code: u8, addr: Ipv4Addr) -> Self {
        Self::new(code, Value::Ipv4(addr))
    }

    pub fn ipv6(code: u8, addr: Ipv6Addr) -> Self {
        Self::new(code, Value::Ipv6(addr))
    }

    /// Wrap a container as the standard Vendor-Specific attribute (26).
    pub fn vsa(container: Vsa) -> Self {
        Self::new(
            StandardAttribute::VendorSpecific as u8,
            Value::Vendor(container),
        )
    }

    pub fn vendor_string(vendor: u32, code: u8, text: impl Into<String>) -> Self {
        Attribute {
            code,
            vendor: Some(vendor),
            value: Value::String(text.into()),
        }
    }

    pub fn vendor_octets(vendor: u32, code: u8, bytes: Vec<u8>) -> Self {
        Attribute {
            code,
            vendor: Some(vendor),
            value: Value::Octets(bytes),
        }
    }

    pub fn vendor_integer(vendor: u32, code: u8, value: u32) -> Self {
        Attribute {
            code,
            vendor: Some(vendor),
            value: Value::Integer(value),
        }
    }

    /// Build an attribute from a dictionary name and its text rendering.
    ///
    /// Integer attributes accept the enumeration's symbolic names. The
    /// returned attribute carries the descriptor's vendor; vendor
    /// sub-attributes still need a [`Vsa`] container before they can join a
    /// packet.
    pub fn from_name(
        dict: &Dictionary,
        name: &str,
        text: &str,
    ) -> Result<Attribute, crate::dictionary::DictionaryError> {
        let desc = dict.require_attribute(name)?;
        let value = match desc.kind {
            ValueKind::Integer | ValueKind::Date => match desc.value_by_name(text) {
                Some(v) => Value::Integer(v),
                None => Value::from_text(desc.kind, text)
                    .map_err(|e| crate::dictionary::DictionaryError::BadValue(e.to_string()))?,
            },
            kind => Value::from_text(kind, text)
                .map_err(|e| crate::dictionary::DictionaryError::BadValue(e.to_string()))?,
        };
        Ok(Attribute {
            code: desc.code,
            vendor: desc.vendor,
            value,
        })
    }

    /// Decode value bytes into a typed attribute.
    ///
    /// The kind comes from the dictionary; undeclared attributes keep the
    /// raw octets view. Attribute 26 in the standard space is always the
    /// Vendor-Specific container.
    pub fn from_wire(
        dict: &Dictionary,
        vendor: Option<u32>,
        code: u8,
        data: &[u8],
    ) -> Result<Attribute, AttributeError> {
        if vendor.is_none() && code == StandardAttribute::VendorSpecific as u8 {
            let container = Vsa::read(dict, data)?;
            return Ok(Attribute::vsa(container));
        }
        let kind = dict
            .attribute_by_code(vendor, code)
            .map(|d| d.kind)
            .unwrap_or(ValueKind::Octets);
        let value = Value::decode(kind, data)?;
        Ok(Attribute {
            code,
            vendor,
            value,
        })
    }

    /// Append the `[type][length][value]` frame (the full VSA frame for
    /// containers).
    pub fn write(&self, buf: &mut Vec<u8>) -> Result<(), AttributeError> {
        if let Value::Vendor(container) = &self.value {
            return container.write(buf);
        }
        let data = self.value.encode();
        if data.len() > Self::MAX_VALUE_LEN {
            return Err(AttributeError::ValueTooLong(data.len()));
        }
        buf.push(self.code);
        buf.push((data.len() + 2) as u8);
        buf.extend_from_slice(&data);
        Ok(())
    }

    /// On-wire length including the 2-byte header.
    pub fn encoded_len(&self) -> usize {
        2 + self.value.encoded_len()
    }

    /// Text rendering; enumerated integers use the symbolic name when the
    /// dictionary registers one.
    pub fn format(&self, dict: &Dictionary) -> String {
        if let Value::Integer(v) = self.value {
            if let Some(desc) = dict.attribute_by_code(self.vendor, self.code) {
                if let Some(name) = desc.value_name(v) {
                    return name.to_string();
                }
            }
        }
        self.value.as_text()
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u32> {
        match self.value {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_octets(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Octets(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_vsa(&self) -> Option<&Vsa> {
        match &self.value {
            Value::Vendor(v) => Some(v),
            _ => None,
        }
    }
}
