//! Blocking UDP client for RADIUS exchanges.
//!
//! The wire work lives in [`radius_wire`]; this crate owns the sockets:
//! send an encoded request, wait with a timeout, retry on silence, verify
//! whatever comes back.
//!
//! ```no_run
//! use radius_client::Client;
//!
//! let client = Client::new("radius.example.net", "shared-secret");
//! match client.authenticate("alice", "correct horse")? {
//!     outcome if outcome.is_accept() => println!("welcome"),
//!     outcome => println!("rejected: {:?}", outcome.reply_message()),
//! }
//! # Ok::<(), radius_client::ClientError>(())
//! ```

mod client;
mod settings;

pub use client::{AccessOutcome, Client, ClientError, DynAuthOutcome};
pub use settings::{Settings, SettingsError};

pub use radius_wire::{
    AccessRequest, AccountingRequest, AcctStatusType, Attribute, AuthProtocol, Code,
    DynAuthRequest, Packet,
};
