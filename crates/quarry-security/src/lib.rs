//! Quarry Security - authentication negotiation for secured cluster services
//!
//! Reads the security site file and decides which wire authentication a
//! client must use: plaintext (`NOSASL`) or Kerberos over SASL (`GSSAPI`).

#![allow(clippy::result_large_err)]

pub mod client;
pub mod site;

pub use client::{Mechanism, SecurityClient, SecurityDescriptor};
pub use site::SecuritySite;
