use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::FileTime;
use crate::protocol::body::create::{SMBFileAttributes, SMBFileId};

mod flags;

pub type SMBCloseFlags = flags::SMBCloseFlags;

/// SMB2 CLOSE Request [MS-SMB2 2.2.15].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 24)]
pub struct SMBCloseRequest {
    #[smb_direct(start(fixed = 2))]
    pub flags: SMBCloseFlags,
    #[smb_direct(start(fixed = 8))]
    pub file_id: SMBFileId,
}

impl SMBCloseRequest {
    pub fn new(file_id: SMBFileId) -> Self {
        Self { flags: SMBCloseFlags::empty(), file_id }
    }
}

/// SMB2 CLOSE Response [MS-SMB2 2.2.16]. The attribute fields are only
/// meaningful when the request asked for `POSTQUERY_ATTRIB`.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Default, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 60)]
pub struct SMBCloseResponse {
    #[smb_direct(start(fixed = 2))]
    pub flags: u16,
    #[smb_direct(start(fixed = 8))]
    pub creation_time: FileTime,
    #[smb_direct(start(fixed = 16))]
    pub last_access_time: FileTime,
    #[smb_direct(start(fixed = 24))]
    pub last_write_time: FileTime,
    #[smb_direct(start(fixed = 32))]
    pub change_time: FileTime,
    #[smb_direct(start(fixed = 40))]
    pub allocation_size: u64,
    #[smb_direct(start(fixed = 48))]
    pub end_of_file: u64,
    #[smb_direct(start(fixed = 56))]
    pub file_attributes: SMBFileAttributes,
}
