//! RADIUS protocol engine
//!
//! Client-side implementation of the RADIUS wire protocol as defined in
//! RFC 2865 (authentication), RFC 2866 (accounting) and RFC 5176/3576
//! (dynamic authorization), driven by an extensible attribute dictionary.
//!
//! # Features
//!
//! - Packet encoding and decoding with strict TLV framing checks
//! - Dictionary-driven typed attributes, including vendor-specific
//!   sub-attributes and the FreeRADIUS-style dictionary file format
//! - Request, response and Message-Authenticator verification
//! - PAP password obfuscation and CHAP credentials
//!
//! # Example
//!
//! ```rust
//! use radius_wire::AccessRequest;
//! use radius_wire::dictionary::default_dictionary;
//!
//! let mut request = AccessRequest::new("alice");
//! request.set_password("correct horse");
//! let bytes = request.encode(b"shared-secret").unwrap();
//!
//! // A captured reply would be verified against the request:
//! // let reply = Packet::decode_response(&buf, default_dictionary(),
//! //                                     request.packet(), b"shared-secret")?;
//! # let _ = bytes;
//! # let _ = default_dictionary();
//! ```

pub mod accounting;
pub mod attributes;
pub mod auth;
pub mod chap;
pub mod dictionary;
pub mod ident;
pub mod message_auth;
pub mod packet;
pub mod request;

pub use accounting::{AcctAuthentic, AcctStatusType, AcctTerminateCause};
pub use attributes::{Attribute, AttributeError, StandardAttribute, Value, ValueKind, Vsa};
pub use dictionary::{AttributeDescriptor, Dictionary, DictionaryError};
pub use ident::{next_identifier, IdentifierSource};
pub use packet::{Code, Packet, PacketError};
pub use request::{
    decode_request, AccessRequest, AccountingRequest, AuthProtocol, DecodedRequest,
    DynAuthRequest, RequestError,
};
