use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

/// FILE_DISPOSITION_INFORMATION [MS-FSCC 2.4.11].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, SMBByteSize, SMBFromBytes, SMBToBytes)]
pub struct SMBFileDispositionInformation {
    #[smb_direct(start(fixed = 0))]
    pub delete_pending: bool,
}
