//! Session-service transport for SMB2 messages.
//!
//! Every message travels in a frame with a 4-byte header: a packet type
//! byte and a 24-bit big-endian length. [`SMBTransport`] is the seam the
//! client talks through; [`SMBSocketConnection`] implements it over any
//! pair of byte streams, TCP in practice.

pub mod message_stream;
pub mod netbios;

pub use message_stream::{SMBReadStream, SMBSocketConnection, SMBTransport, SMBWriteStream};
