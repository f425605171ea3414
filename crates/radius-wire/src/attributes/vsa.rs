use super::{Attribute, AttributeError, StandardAttribute, Value};
use crate::dictionary::Dictionary;

/// Vendor-Specific attribute container (attribute 26, RFC 2865 Section 5.26).
///
/// The value payload is a 4-byte big-endian vendor id followed by
/// sub-attributes in the same `[type][length][value]` framing as top-level
/// attributes. Sub-attributes keep their insertion order on the wire; some
/// vendor servers are order-sensitive, and the RFC does not ask for sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vsa {
    vendor_id: u32,
    subs: Vec<Attribute>,
}

impl Vsa {
    pub fn new(vendor_id: u32) -> Self {
        Vsa {
            vendor_id,
            subs: Vec::new(),
        }
    }

    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    pub fn sub_attributes(&self) -> &[Attribute] {
        &self.subs
    }

    /// Add a sub-attribute. Its vendor must match the container's.
    pub fn add_sub(&mut self, attr: Attribute) -> Result<(), AttributeError> {
        if attr.vendor != Some(self.vendor_id) {
            return Err(AttributeError::VendorIdMismatch {
                container: self.vendor_id,
                sub: attr.vendor,
            });
        }
        if matches!(attr.value, Value::Vendor(_)) {
            return Err(AttributeError::MalformedVsa(
                "vendor-specific containers do not nest".into(),
            ));
        }
        self.subs.push(attr);
        Ok(())
    }

    /// Find a sub-attribute by its vendor type code.
    pub fn sub(&self, code: u8) -> Option<&Attribute> {
        self.subs.iter().find(|a| a.code == code)
    }

    /// Length of the value payload: vendor id plus framed sub-attributes.
    pub fn payload_len(&self) -> usize {
        4 + self
            .subs
            .iter()
            .map(|a| 2 + a.value.encoded_len())
            .sum::<usize>()
    }

    /// Write the full `[26][length][vendor-id][sub-attributes...]` frame.
    pub fn write(&self, buf: &mut Vec<u8>) -> Result<(), AttributeError> {
        let total = 2 + self.payload_len();
        if total > u8::MAX as usize {
            return Err(AttributeError::OversizedVsa(total));
        }
        buf.push(StandardAttribute::VendorSpecific as u8);
        buf.push(total as u8);
        buf.extend_from_slice(&self.vendor_id.to_be_bytes());
        for sub in &self.subs {
            let data = sub.value.encode();
            buf.push(sub.code);
            buf.push((data.len() + 2) as u8);
            buf.extend_from_slice(&data);
        }
        Ok(())
    }

    /// Parse a VSA value payload (the bytes after `[26][length]`).
    ///
    /// The payload must carry the 4-byte vendor id, and the inner TLV walk
    /// must consume it exactly with every sub-length at least 2.
    pub fn read(dict: &Dictionary, payload: &[u8]) -> Result<Self, AttributeError> {
        if payload.len() < 4 {
            return Err(AttributeError::MalformedVsa(format!(
                "payload of {} bytes is shorter than its vendor id",
                payload.len()
            )));
        }
        let vendor_id = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);

        let mut subs = Vec::new();
        let mut offset = 4;
        while offset < payload.len() {
            if payload.len() - offset < 2 {
                return Err(AttributeError::MalformedVsa(
                    "truncated sub-attribute header".into(),
                ));
            }
            let code = payload[offset];
            let sublen = payload[offset + 1] as usize;
            if sublen < 2 || offset + sublen > payload.len() {
                return Err(AttributeError::MalformedVsa(format!(
                    "sub-attribute {code} declares length {sublen} with {} bytes left",
                    payload.len() - offset
                )));
            }
            let attr = Attribute::from_wire(
                dict,
                Some(vendor_id),
                code,
                &payload[offset + 2..offset + sublen],
            )?;
            subs.push(attr);
            offset += sublen;
        }

        Ok(Vsa { vendor_id, subs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Dictionary {
        let mut d = Dictionary::new();
        d.add_vendor(14988, "Mikrotik").unwrap();
        d.add_attribute(crate::dictionary::AttributeDescriptor::vendor(
            "Mikrotik-Rate-Limit",
            14988,
            8,
            crate::ValueKind::String,
        ))
        .unwrap();
        d
    }

    #[test]
    fn round_trips_with_insertion_order_preserved() {
        let dict = dict();
        let mut vsa = Vsa::new(14988);
        vsa.add_sub(Attribute::vendor_string(14988, 8, "5M/10M")).unwrap();
        vsa.add_sub(Attribute::vendor_octets(14988, 3, vec![9, 7])).unwrap();

        let mut buf = Vec::new();
        vsa.write(&mut buf).unwrap();
        assert_eq!(buf[0], 26);
        assert_eq!(buf[1] as usize, buf.len());
        assert_eq!(&buf[2..6], &14988u32.to_be_bytes());

        let parsed = Vsa::read(&dict, &buf[2..]).unwrap();
        assert_eq!(parsed, vsa);
        assert_eq!(parsed.sub_attributes()[0].code, 8);
        assert_eq!(parsed.sub_attributes()[1].code, 3);
    }

    #[test]
    fn rejects_foreign_vendor_sub() {
        let mut vsa = Vsa::new(14988);
        let err = vsa
            .add_sub(Attribute::vendor_string(311, 11, "x"))
            .unwrap_err();
        assert_eq!(
            err,
            AttributeError::VendorIdMismatch {
                container: 14988,
                sub: Some(311)
            }
        );
    }

    #[test]
    fn rejects_inner_walk_mismatch() {
        let dict = dict();
        // sub-length 1 is below the 2-byte header minimum
        let err = Vsa::read(&dict, &[0, 0, 0x3a, 0x8c, 8, 1]).unwrap_err();
        assert!(matches!(err, AttributeError::MalformedVsa(_)));

        // sub-length runs past the declared payload
        let err = Vsa::read(&dict, &[0, 0, 0x3a, 0x8c, 8, 9, b'x']).unwrap_err();
        assert!(matches!(err, AttributeError::MalformedVsa(_)));
    }

    #[test]
    fn vendor_id_alone_is_a_valid_payload() {
        let dict = dict();
        let vsa = Vsa::read(&dict, &14988u32.to_be_bytes()).unwrap();
        assert_eq!(vsa.vendor_id(), 14988);
        assert!(vsa.sub_attributes().is_empty());
    }

    #[test]
    fn oversized_container_is_rejected() {
        let mut vsa = Vsa::new(9);
        for _ in 0..2 {
            vsa.add_sub(Attribute::vendor_octets(9, 1, vec![0u8; 130])).unwrap();
        }
        let err = vsa.write(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, AttributeError::OversizedVsa(_)));
    }
}
