use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use smb_core::{SMBByteSize, SMBFromBytes, SMBParseResult, SMBToBytes};

/// SMB2_FILEID [MS-SMB2 2.2.14.1].
#[derive(Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Clone, Copy, Default)]
pub struct SMBFileId {
    pub persistent: u64,
    pub volatile: u64,
}

impl SMBFileId {
    pub fn new(persistent: u64, volatile: u64) -> Self {
        Self { persistent, volatile }
    }
}

impl Display for SMBFileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}:{:016x}", self.persistent, self.volatile)
    }
}

impl SMBByteSize for SMBFileId {
    fn smb_byte_size(&self) -> usize {
        16
    }
}

impl SMBFromBytes for SMBFileId {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let (remaining, persistent) = u64::smb_from_bytes(input)?;
        let (remaining, volatile) = u64::smb_from_bytes(remaining)?;
        Ok((remaining, Self { persistent, volatile }))
    }
}

impl SMBToBytes for SMBFileId {
    fn smb_to_bytes(&self) -> Vec<u8> {
        [self.persistent.smb_to_bytes(), self.volatile.smb_to_bytes()].concat()
    }
}
