//! RADIUS attributes: the `[type][length][value]` TLVs carried after the
//! packet header, decoded into typed values through the dictionary.

mod attribute;
mod types;
mod value;
mod vsa;

pub use attribute::Attribute;
pub use types::{
    StandardAttribute, MICROSOFT_VENDOR_ID, MS_CHAP2_RESPONSE, MS_CHAP_CHALLENGE,
};
pub use value::{Ipv6Prefix, Value, ValueKind};
pub use vsa::Vsa;

use thiserror::Error;

/// Errors raised while reading or writing attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// The TLV length is incompatible with the attribute's value kind
    /// (integer and ipv4 need length 6, ipv6 needs 18, ipv6-prefix 4..=20,
    /// everything else at least 2).
    #[error("attribute length {length} is invalid for a {kind} value")]
    BadAttributeLength { kind: ValueKind, length: usize },

    /// A value longer than the 253 bytes an attribute can carry.
    #[error("attribute value of {0} bytes exceeds the 253-byte limit")]
    ValueTooLong(usize),

    /// The inner TLV walk of a Vendor-Specific attribute did not line up
    /// with the declared payload.
    #[error("malformed vendor-specific attribute: {0}")]
    MalformedVsa(String),

    /// A sub-attribute was added to a container owned by a different vendor.
    #[error("sub-attribute vendor {sub:?} does not match container vendor {container}")]
    VendorIdMismatch { container: u32, sub: Option<u32> },

    /// A Vendor-Specific attribute that would not fit its one-byte length.
    #[error("vendor-specific attribute of {0} bytes exceeds the 255-byte frame")]
    OversizedVsa(usize),

    /// Text that does not parse as the attribute's value kind.
    #[error("cannot parse {text:?} as a {kind} value: {reason}")]
    InvalidText {
        kind: ValueKind,
        text: String,
        reason: String,
    },
}
