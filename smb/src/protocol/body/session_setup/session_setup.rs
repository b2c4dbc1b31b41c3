use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::Capabilities;
use crate::protocol::body::session_setup::{SessionSetupSecurityMode, SMBSessionFlags, SMBSessionSetupFlags};

/// SMB2 SESSION_SETUP Request [MS-SMB2 2.2.5]. `buffer` carries the
/// security token produced by the credential provider.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 25)]
pub struct SMBSessionSetupRequest {
    #[smb_direct(start(fixed = 2))]
    pub flags: SMBSessionSetupFlags,
    #[smb_direct(start(fixed = 3))]
    pub security_mode: SessionSetupSecurityMode,
    #[smb_direct(start(fixed = 4))]
    pub capabilities: Capabilities,
    #[smb_direct(start(fixed = 16))]
    pub previous_session_id: u64,
    #[smb_buffer(
        offset(inner(start = 12, num_type = "u16", subtract = 64)),
        length(inner(start = 14, num_type = "u16"))
    )]
    pub buffer: Vec<u8>,
}

impl SMBSessionSetupRequest {
    pub fn new(security_mode: SessionSetupSecurityMode, buffer: Vec<u8>) -> Self {
        Self {
            flags: SMBSessionSetupFlags::empty(),
            security_mode,
            capabilities: Capabilities::empty(),
            previous_session_id: 0,
            buffer,
        }
    }
}

/// SMB2 SESSION_SETUP Response [MS-SMB2 2.2.6].
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 9)]
pub struct SMBSessionSetupResponse {
    #[smb_direct(start(fixed = 2))]
    pub session_flags: SMBSessionFlags,
    #[smb_buffer(
        offset(inner(start = 4, num_type = "u16", subtract = 64)),
        length(inner(start = 6, num_type = "u16"))
    )]
    pub buffer: Vec<u8>,
}

impl SMBSessionSetupResponse {
    pub fn new(session_flags: SMBSessionFlags, buffer: Vec<u8>) -> Self {
        Self { session_flags, buffer }
    }
}

#[cfg(test)]
mod tests {
    use smb_core::{SMBFromBytes, SMBToBytes};

    use super::*;

    /// MS-SMB2 2.2.5: the security buffer starts at offset 0x58.
    #[test]
    fn session_setup_request_layout() {
        let request = SMBSessionSetupRequest::new(SessionSetupSecurityMode::SIGNING_ENABLED, vec![0x60, 0x48, 0x06]);
        let bytes = request.smb_to_bytes();
        assert_eq!(&bytes[0..2], &[25, 0]);
        assert_eq!(bytes[3], 0x01);
        assert_eq!(&bytes[12..14], &[0x58, 0x00]);
        assert_eq!(&bytes[14..16], &[3, 0]);
        assert_eq!(&bytes[24..], &[0x60, 0x48, 0x06]);
        let (_, parsed) = SMBSessionSetupRequest::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn session_setup_response_round_trip() {
        let response = SMBSessionSetupResponse::new(SMBSessionFlags::IS_GUEST, vec![0xA1, 0x07]);
        let bytes = response.smb_to_bytes();
        assert_eq!(&bytes[4..6], &[0x48, 0x00]);
        let (remaining, parsed) = SMBSessionSetupResponse::smb_from_bytes(&bytes).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(parsed, response);
    }

    #[test]
    fn buffer_past_end_is_rejected() {
        let mut bytes = SMBSessionSetupResponse::new(SMBSessionFlags::empty(), vec![1, 2]).smb_to_bytes();
        bytes[6] = 40;
        assert!(SMBSessionSetupResponse::smb_from_bytes(&bytes).is_err());
    }
}
