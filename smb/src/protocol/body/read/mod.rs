use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::create::SMBFileId;

mod channel;
mod flags;

pub type SMBRWChannel = channel::SMBRWChannel;
pub type SMBReadRequestFlags = flags::SMBReadRequestFlags;

/// Data offset suggested to the server for the response.
const RESPONSE_DATA_OFFSET: u8 = 0x50;

/// SMB2 READ Request [MS-SMB2 2.2.19].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 49)]
pub struct SMBReadRequest {
    #[smb_direct(start(fixed = 2))]
    pub padding: u8,
    #[smb_direct(start(fixed = 3))]
    pub flags: SMBReadRequestFlags,
    #[smb_direct(start(fixed = 4))]
    pub length: u32,
    #[smb_direct(start(fixed = 8))]
    pub offset: u64,
    #[smb_direct(start(fixed = 16))]
    pub file_id: SMBFileId,
    #[smb_direct(start(fixed = 32))]
    pub minimum_count: u32,
    #[smb_direct(start(fixed = 36))]
    pub channel: SMBRWChannel,
    #[smb_direct(start(fixed = 40))]
    pub remaining_bytes: u32,
}

impl SMBReadRequest {
    pub fn new(file_id: SMBFileId, offset: u64, length: u32) -> Self {
        Self {
            padding: RESPONSE_DATA_OFFSET,
            flags: SMBReadRequestFlags::empty(),
            length,
            offset,
            file_id,
            minimum_count: 0,
            channel: SMBRWChannel::None,
            remaining_bytes: 0,
        }
    }
}

/// SMB2 READ Response [MS-SMB2 2.2.20].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 17)]
pub struct SMBReadResponse {
    #[smb_direct(start(fixed = 8))]
    pub data_remaining: u32,
    #[smb_buffer(
        offset(inner(start = 2, num_type = "u8", subtract = 64)),
        length(inner(start = 4, num_type = "u32"))
    )]
    pub data: Vec<u8>,
}

impl SMBReadResponse {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data_remaining: 0, data }
    }
}
