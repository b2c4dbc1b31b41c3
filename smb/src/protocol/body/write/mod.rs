use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::create::SMBFileId;
use crate::protocol::body::read::SMBRWChannel;

mod flags;

pub type SMBWriteFlags = flags::SMBWriteFlags;

/// SMB2 WRITE Request [MS-SMB2 2.2.21].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 49)]
pub struct SMBWriteRequest {
    #[smb_direct(start(fixed = 8))]
    pub offset: u64,
    #[smb_direct(start(fixed = 16))]
    pub file_id: SMBFileId,
    #[smb_direct(start(fixed = 32))]
    pub channel: SMBRWChannel,
    #[smb_direct(start(fixed = 36))]
    pub remaining_bytes: u32,
    #[smb_direct(start(fixed = 44))]
    pub flags: SMBWriteFlags,
    #[smb_buffer(
        offset(inner(start = 2, num_type = "u16", subtract = 64)),
        length(inner(start = 4, num_type = "u32"))
    )]
    pub data: Vec<u8>,
}

impl SMBWriteRequest {
    pub fn new(file_id: SMBFileId, offset: u64, data: Vec<u8>) -> Self {
        Self {
            offset,
            file_id,
            channel: SMBRWChannel::None,
            remaining_bytes: 0,
            flags: SMBWriteFlags::empty(),
            data,
        }
    }
}

/// SMB2 WRITE Response [MS-SMB2 2.2.22].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 17)]
pub struct SMBWriteResponse {
    #[smb_direct(start(fixed = 4))]
    pub count: u32,
    #[smb_direct(start(fixed = 8))]
    pub remaining: u32,
}

impl SMBWriteResponse {
    pub fn new(count: u32) -> Self {
        Self { count, remaining: 0 }
    }
}

#[cfg(test)]
mod tests {
    use smb_core::{SMBFromBytes, SMBToBytes};

    use super::*;

    #[test]
    fn write_request_data_at_offset_112() {
        let request = SMBWriteRequest::new(SMBFileId::new(1, 2), 10, b"payload".to_vec());
        let bytes = request.smb_to_bytes();
        assert_eq!(&bytes[2..4], &[112, 0]);
        assert_eq!(&bytes[4..8], &[7, 0, 0, 0]);
        assert_eq!(&bytes[48..], b"payload");
        let (_, parsed) = SMBWriteRequest::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn write_response_count() {
        let bytes = SMBWriteResponse::new(65536).smb_to_bytes();
        assert_eq!(bytes.len(), 17);
        assert_eq!(&bytes[4..8], &[0, 0, 1, 0]);
        let (_, parsed) = SMBWriteResponse::smb_from_bytes(&bytes[..16]).unwrap();
        assert_eq!(parsed.count, 65536);
    }
}
