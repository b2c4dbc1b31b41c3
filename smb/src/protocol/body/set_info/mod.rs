use serde::{Deserialize, Serialize};

use smb_core::SMBToBytes;
use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::create::SMBFileId;
use crate::protocol::body::file_info::{SMBFileDispositionInformation, SMBFileInformationClass, SMBFileRenameInformation};

mod info_type;

pub type SMBInfoType = info_type::SMBInfoType;

/// SMB2 SET_INFO Request [MS-SMB2 2.2.39]. `buffer` is the encoded
/// information structure for `file_info_class`.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 33)]
pub struct SMBSetInfoRequest {
    #[smb_direct(start(fixed = 2))]
    pub info_type: SMBInfoType,
    #[smb_direct(start(fixed = 3))]
    pub file_info_class: SMBFileInformationClass,
    #[smb_direct(start(fixed = 12))]
    pub additional_information: u32,
    #[smb_direct(start(fixed = 16))]
    pub file_id: SMBFileId,
    #[smb_buffer(
        offset(inner(start = 8, num_type = "u16", subtract = 64)),
        length(inner(start = 4, num_type = "u32"))
    )]
    pub buffer: Vec<u8>,
}

impl SMBSetInfoRequest {
    pub fn disposition(file_id: SMBFileId, info: SMBFileDispositionInformation) -> Self {
        Self::file_info(file_id, SMBFileInformationClass::FileDispositionInformation, info.smb_to_bytes())
    }

    pub fn rename(file_id: SMBFileId, info: &SMBFileRenameInformation) -> Self {
        Self::file_info(file_id, SMBFileInformationClass::FileRenameInformation, info.smb_to_bytes())
    }

    fn file_info(file_id: SMBFileId, file_info_class: SMBFileInformationClass, buffer: Vec<u8>) -> Self {
        Self {
            info_type: SMBInfoType::File,
            file_info_class,
            additional_information: 0,
            file_id,
            buffer,
        }
    }
}

/// SMB2 SET_INFO Response [MS-SMB2 2.2.40].
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Default, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 2)]
pub struct SMBSetInfoResponse;
