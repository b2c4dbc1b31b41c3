use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::tree_connect::{SMBAccessMask, SMBShareFlags, SMBShareType, SMBTreeCapabilities};

/// SMB2 TREE_CONNECT Request [MS-SMB2 2.2.9]. `path` is the full UNC path
/// of the share, `\\server\share`.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 9)]
pub struct SMBTreeConnectRequest {
    #[smb_buffer(
        offset(inner(start = 4, num_type = "u16", subtract = 64)),
        length(inner(start = 6, num_type = "u16"))
    )]
    pub path: String,
}

impl SMBTreeConnectRequest {
    pub fn new<T: Into<String>>(path: T) -> Self {
        Self { path: path.into() }
    }
}

/// SMB2 TREE_CONNECT Response [MS-SMB2 2.2.10].
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 16)]
pub struct SMBTreeConnectResponse {
    #[smb_direct(start(fixed = 2))]
    pub share_type: SMBShareType,
    #[smb_direct(start(fixed = 4))]
    pub share_flags: SMBShareFlags,
    #[smb_direct(start(fixed = 8))]
    pub capabilities: SMBTreeCapabilities,
    #[smb_direct(start(fixed = 12))]
    pub maximal_access: SMBAccessMask,
}

#[cfg(test)]
mod tests {
    use smb_core::{SMBByteSize, SMBFromBytes, SMBToBytes};

    use super::*;

    #[test]
    fn tree_connect_request_layout() {
        let request = SMBTreeConnectRequest::new("\\\\3ds\\microSD");
        let bytes = request.smb_to_bytes();
        assert_eq!(&bytes[0..2], &[9, 0]);
        assert_eq!(&bytes[4..6], &[72, 0]);
        assert_eq!(&bytes[6..8], &[26, 0]);
        assert_eq!(&bytes[8..10], &[b'\\', 0]);
        assert_eq!(bytes.len(), request.smb_byte_size());
        let (_, parsed) = SMBTreeConnectRequest::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn tree_connect_response_round_trip() {
        let response = SMBTreeConnectResponse {
            share_type: SMBShareType::Disk,
            share_flags: SMBShareFlags::NO_CACHING,
            capabilities: SMBTreeCapabilities::empty(),
            maximal_access: SMBAccessMask::GENERIC_ALL | SMBAccessMask::DELETE,
        };
        let bytes = response.smb_to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[2], 0x01);
        let (_, parsed) = SMBTreeConnectResponse::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn unknown_share_type_is_rejected() {
        let mut bytes = SMBTreeConnectResponse {
            share_type: SMBShareType::Pipe,
            share_flags: SMBShareFlags::empty(),
            capabilities: SMBTreeCapabilities::empty(),
            maximal_access: SMBAccessMask::empty(),
        }.smb_to_bytes();
        bytes[2] = 0x09;
        assert!(SMBTreeConnectResponse::smb_from_bytes(&bytes).is_err());
    }
}
