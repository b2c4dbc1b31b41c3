//! The client session and the file operations built on it.
//!
//! [`SMBClient`] walks `Disconnected → Negotiating → Authenticating →
//! Authenticated → TreeConnected` and ends `Closed`, either on
//! [`SMBClient::disconnect`] or when the connection becomes unusable. File
//! operations need a connected share and fail with `NotConnected` otherwise.

mod client;
mod connection_info;
mod directory;
mod file;
mod metadata;
mod open;
mod request;
mod session;
mod tree_connect;
pub mod config;
pub mod path;

pub use client::{SMBClient, MAX_AUTH_ROUNDS};
pub use config::{SMBClientConfig, SMBClientConfigBuilder};

pub type ConnectionInfo = connection_info::ConnectionInfo;
pub type DirectoryEntry = directory::DirectoryEntry;
pub type DirectoryListing<'a, T> = directory::DirectoryListing<'a, T>;
pub type FileMetadata = metadata::FileMetadata;
pub type FileReader<'a, T> = file::FileReader<'a, T>;
pub type SMBAuthenticationState = session::SMBAuthenticationState;
pub type SMBFileHandle = open::SMBFileHandle;
pub type SMBHandleKind = open::SMBHandleKind;
pub type SMBRequestTracker = request::SMBRequestTracker;
pub type SMBServerParameters = session::SMBServerParameters;
pub type SMBSession = session::SMBSession;
pub type SMBSessionState = session::SMBSessionState;
pub type SMBTreeConnect = tree_connect::SMBTreeConnect;

pub use request::UNSOLICITED_MESSAGE_ID;
