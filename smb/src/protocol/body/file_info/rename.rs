use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

/// FILE_RENAME_INFORMATION_TYPE_2 [MS-FSCC 2.4.37.2], the SMB2 layout.
/// `file_name` is the full target path relative to the share root.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, SMBByteSize, SMBFromBytes, SMBToBytes)]
pub struct SMBFileRenameInformation {
    #[smb_direct(start(fixed = 0))]
    pub replace_if_exists: bool,
    #[smb_direct(start(fixed = 8))]
    pub root_directory: u64,
    #[smb_buffer(length(inner(start = 16, num_type = "u32")))]
    pub file_name: String,
}

impl SMBFileRenameInformation {
    pub fn new<T: Into<String>>(file_name: T, replace_if_exists: bool) -> Self {
        Self {
            replace_if_exists,
            root_directory: 0,
            file_name: file_name.into(),
        }
    }
}
