//! Accounting value enumerations (RFC 2866).
//!
//! The Acct-Status-Type values a client sends and the session metadata
//! enumerations that ride along with Stop records.

/// Acct-Status-Type values (RFC 2866 Section 5.1).
///
/// The attribute accepts the whole 1..=15 range on the wire; values 9..=14
/// are reserved and [`AcctStatusType::Failed`] (15) closes the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctStatusType {
    /// Session has begun.
    Start = 1,
    /// Session has ended.
    Stop = 2,
    /// Periodic update during an active session.
    InterimUpdate = 3,
    /// NAS is ready to accept requests.
    AccountingOn = 7,
    /// NAS is shutting down.
    AccountingOff = 8,
    /// Delivery of an earlier record failed.
    Failed = 15,
}

impl AcctStatusType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctStatusType::Start),
            2 => Some(AcctStatusType::Stop),
            3 => Some(AcctStatusType::InterimUpdate),
            7 => Some(AcctStatusType::AccountingOn),
            8 => Some(AcctStatusType::AccountingOff),
            15 => Some(AcctStatusType::Failed),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Whether a raw wire value is inside the range an Accounting-Request
    /// may carry, including the reserved codes.
    pub fn valid_wire_value(value: u32) -> bool {
        (1..=15).contains(&value)
    }
}

/// Acct-Terminate-Cause values (RFC 2866 Section 5.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctTerminateCause {
    UserRequest = 1,
    LostCarrier = 2,
    LostService = 3,
    IdleTimeout = 4,
    SessionTimeout = 5,
    AdminReset = 6,
    AdminReboot = 7,
    PortError = 8,
    NasError = 9,
    NasRequest = 10,
    NasReboot = 11,
    PortUnneeded = 12,
    PortPreempted = 13,
    PortSuspended = 14,
    ServiceUnavailable = 15,
    Callback = 16,
    UserError = 17,
    HostRequest = 18,
}

impl AcctTerminateCause {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctTerminateCause::UserRequest),
            2 => Some(AcctTerminateCause::LostCarrier),
            3 => Some(AcctTerminateCause::LostService),
            4 => Some(AcctTerminateCause::IdleTimeout),
            5 => Some(AcctTerminateCause::SessionTimeout),
            6 => Some(AcctTerminateCause::AdminReset),
            7 => Some(AcctTerminateCause::AdminReboot),
            8 => Some(AcctTerminateCause::PortError),
            9 => Some(AcctTerminateCause::NasError),
            10 => Some(AcctTerminateCause::NasRequest),
            11 => Some(AcctTerminateCause::NasReboot),
            12 => Some(AcctTerminateCause::PortUnneeded),
            13 => Some(AcctTerminateCause::PortPreempted),
            14 => Some(AcctTerminateCause::PortSuspended),
            15 => Some(AcctTerminateCause::ServiceUnavailable),
            16 => Some(AcctTerminateCause::Callback),
            17 => Some(AcctTerminateCause::UserError),
            18 => Some(AcctTerminateCause::HostRequest),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Acct-Authentic values (RFC 2866 Section 5.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AcctAuthentic {
    Radius = 1,
    Local = 2,
    Remote = 3,
}

impl AcctAuthentic {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(AcctAuthentic::Radius),
            2 => Some(AcctAuthentic::Local),
            3 => Some(AcctAuthentic::Remote),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}
