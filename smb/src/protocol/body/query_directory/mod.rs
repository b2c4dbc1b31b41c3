use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::create::SMBFileId;
use crate::protocol::body::file_info::SMBFileInformationClass;

mod flags;

pub type SMBQueryDirectoryFlags = flags::SMBQueryDirectoryFlags;

/// SMB2 QUERY_DIRECTORY Request [MS-SMB2 2.2.33].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 33)]
pub struct SMBQueryDirectoryRequest {
    #[smb_direct(start(fixed = 2))]
    pub information_class: SMBFileInformationClass,
    #[smb_direct(start(fixed = 3))]
    pub flags: SMBQueryDirectoryFlags,
    #[smb_direct(start(fixed = 4))]
    pub file_index: u32,
    #[smb_direct(start(fixed = 8))]
    pub file_id: SMBFileId,
    #[smb_direct(start(fixed = 28))]
    pub output_buffer_length: u32,
    #[smb_buffer(
        offset(inner(start = 24, num_type = "u16", subtract = 64)),
        length(inner(start = 26, num_type = "u16"))
    )]
    pub search_pattern: String,
}

impl SMBQueryDirectoryRequest {
    pub fn new<T: Into<String>>(file_id: SMBFileId, search_pattern: T, flags: SMBQueryDirectoryFlags, output_buffer_length: u32) -> Self {
        Self {
            information_class: SMBFileInformationClass::FileDirectoryInformation,
            flags,
            file_index: 0,
            file_id,
            output_buffer_length,
            search_pattern: search_pattern.into(),
        }
    }
}

/// SMB2 QUERY_DIRECTORY Response [MS-SMB2 2.2.34]. `buffer` holds entries
/// of the requested information class.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 9)]
pub struct SMBQueryDirectoryResponse {
    #[smb_buffer(
        offset(inner(start = 2, num_type = "u16", subtract = 64)),
        length(inner(start = 4, num_type = "u32"))
    )]
    pub buffer: Vec<u8>,
}

impl SMBQueryDirectoryResponse {
    pub fn new(buffer: Vec<u8>) -> Self {
        Self { buffer }
    }
}
