use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

/// SMB2 ERROR Response [MS-SMB2 2.2.2]. The failing status itself is carried
/// in the header. Servers may omit the padding byte when ByteCount is zero.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Default, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 9)]
pub struct SMBErrorResponse {
    #[smb_direct(start(fixed = 2))]
    pub error_context_count: u8,
    #[smb_buffer(length(inner(start = 4, num_type = "u32")))]
    pub error_data: Vec<u8>,
}

impl SMBErrorResponse {
    pub fn new() -> Self {
        Self::default()
    }
}
