//! # SMB Client
//!
//! A Rust client for the **Server Message Block (SMB) Protocol Versions 2 and 3**
//! as specified in [\[MS-SMB2\]](https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-smb2/5606ad47-5ee0-437a-817e-70c366052962),
//! built to browse and transfer files on a single share.
//!
//! This crate provides:
//! - **Client layer** ([`client`]): The session state machine (negotiate,
//!   authenticate, tree connect, disconnect) and the file operations on top of
//!   it: directory listing, chunked read and write, delete, rename, create
//!   directory and stat.
//! - **Protocol layer** ([`protocol`]): Wire-format types for SMB2 headers and
//!   the bodies the client exchanges, and the `SMBMessage` wrapper with signing.
//! - **Socket layer** ([`socket`]): Session-service framing over TCP, the
//!   NetBIOS session handshake, and the `SMBTransport` seam.
//! - **Utilities** ([`util`]): Authentication (NTLMv2 via SPNEGO) and
//!   cryptographic primitives (SP800-108 KDF, HMAC-SHA256, AES-CMAC).
//!
//! ## Quick Start
//!
//! ```no_run
//! use smb_client::client::{SMBClient, SMBClientConfig};
//! use smb_client::util::auth::User;
//!
//! fn main() -> smb_core::SMBResult<()> {
//!     let config = SMBClientConfig {
//!         host: "192.168.1.20".into(),
//!         ..Default::default()
//!     };
//!     let mut client = SMBClient::connect(config, User::new("user", "pass"))?;
//!     client.write_all("/notes/hello.txt", b"hello")?;
//!     let content = client.read_all("/notes/hello.txt")?;
//!     assert_eq!(content, b"hello");
//!     client.disconnect();
//!     Ok(())
//! }
//! ```

/// Client session state machine and file operations.
pub mod client;
/// SMB2 wire-format protocol types: headers, bodies, and messages.
pub mod protocol;
/// Session-service transport: framing, NetBIOS session setup, TCP connection.
pub mod socket;
/// Utility modules: authentication and cryptography.
pub mod util;
