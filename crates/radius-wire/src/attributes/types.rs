/// Standard attribute codes the protocol engine itself needs to know about.
///
/// Everything else is reached through the dictionary; these are the codes
/// with hard-wired semantics in the codec and the request facades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StandardAttribute {
    /// User-Name (1) - RFC 2865
    UserName = 1,
    /// User-Password (2) - RFC 2865, PAP-obfuscated
    UserPassword = 2,
    /// CHAP-Password (3) - RFC 2865, chap ident + MD5 hash
    ChapPassword = 3,
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// Vendor-Specific (26) - RFC 2865
    VendorSpecific = 26,
    /// Acct-Status-Type (40) - RFC 2866
    AcctStatusType = 40,
    /// CHAP-Challenge (60) - RFC 2865
    ChapChallenge = 60,
    /// EAP-Message (79) - RFC 3579
    EapMessage = 79,
    /// Message-Authenticator (80) - RFC 2869
    MessageAuthenticator = 80,
}

impl StandardAttribute {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Microsoft vendor id (MS-CHAP sub-attributes live here).
pub const MICROSOFT_VENDOR_ID: u32 = 311;

/// MS-CHAP-Challenge vendor sub-type.
pub const MS_CHAP_CHALLENGE: u8 = 11;

/// MS-CHAP2-Response vendor sub-type.
pub const MS_CHAP2_RESPONSE: u8 = 25;
