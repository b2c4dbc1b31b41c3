use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::protocol::body::{Capabilities, FileTime, SMBDialect};
use crate::protocol::body::negotiate::{NegotiateSecurityMode, SMBNegotiateResponse};
use crate::protocol::body::session_setup::SMBSessionFlags;
use crate::util::crypto::smb2::SMBSigningKey;

/// Where a client is in its lifetime. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SMBSessionState {
    Disconnected,
    Negotiating,
    Authenticating,
    Authenticated,
    TreeConnected,
    Closed,
}

impl SMBSessionState {
    /// States in which the transport may still carry traffic.
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Disconnected | Self::Closed)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated | Self::TreeConnected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SMBAuthenticationState {
    Unauthenticated,
    ChallengeIssued,
    Authenticated,
    Expired,
}

/// What the server announced in its NEGOTIATE response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SMBServerParameters {
    pub dialect: SMBDialect,
    pub guid: Uuid,
    pub security_mode: NegotiateSecurityMode,
    pub capabilities: Capabilities,
    pub max_transact_size: u32,
    pub max_read_size: u32,
    pub max_write_size: u32,
    pub system_time: FileTime,
}

impl SMBServerParameters {
    pub fn signing_required(&self) -> bool {
        self.security_mode.contains(NegotiateSecurityMode::NEGOTIATE_SIGNING_REQUIRED)
    }
}

impl From<&SMBNegotiateResponse> for SMBServerParameters {
    fn from(response: &SMBNegotiateResponse) -> Self {
        Self {
            dialect: response.dialect,
            guid: response.guid,
            security_mode: response.security_mode,
            capabilities: response.capabilities,
            max_transact_size: response.max_transact_size,
            max_read_size: response.max_read_size,
            max_write_size: response.max_write_size,
            system_time: response.system_time,
        }
    }
}

/// The authenticated half of a session: its id and the keys derived for it.
#[derive(Debug, Clone)]
pub struct SMBSession {
    session_id: u64,
    auth_state: SMBAuthenticationState,
    flags: SMBSessionFlags,
    session_key: Option<Vec<u8>>,
    signing_key: Option<SMBSigningKey>,
}

impl SMBSession {
    pub fn new(session_id: u64) -> Self {
        Self {
            session_id,
            auth_state: SMBAuthenticationState::Unauthenticated,
            flags: SMBSessionFlags::empty(),
            session_key: None,
            signing_key: None,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn auth_state(&self) -> SMBAuthenticationState {
        self.auth_state
    }

    pub fn flags(&self) -> SMBSessionFlags {
        self.flags
    }

    pub fn session_key(&self) -> Option<&[u8]> {
        self.session_key.as_deref()
    }

    /// Present only when messages on this session are signed.
    pub fn signing_key(&self) -> Option<&SMBSigningKey> {
        self.signing_key.as_ref()
    }

    pub(crate) fn challenge_issued(&mut self, session_id: u64) {
        self.session_id = session_id;
        self.auth_state = SMBAuthenticationState::ChallengeIssued;
    }

    pub(crate) fn authenticated(&mut self, session_id: u64, flags: SMBSessionFlags, session_key: Option<Vec<u8>>, signing_key: Option<SMBSigningKey>) {
        self.session_id = session_id;
        self.auth_state = SMBAuthenticationState::Authenticated;
        self.flags = flags;
        self.session_key = session_key;
        self.signing_key = signing_key;
    }

    pub(crate) fn expire(&mut self) {
        self.auth_state = SMBAuthenticationState::Expired;
        self.signing_key = None;
    }

    pub fn is_guest(&self) -> bool {
        self.flags.intersects(SMBSessionFlags::IS_GUEST | SMBSessionFlags::IS_NULL)
    }
}
