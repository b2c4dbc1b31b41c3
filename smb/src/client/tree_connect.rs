use serde::{Deserialize, Serialize};

use crate::protocol::body::tree_connect::{SMBAccessMask, SMBShareFlags, SMBShareType, SMBTreeConnectResponse};

/// The one share a client is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SMBTreeConnect {
    share: String,
    path: String,
    tree_id: u32,
    share_type: SMBShareType,
    share_flags: SMBShareFlags,
    maximal_access: SMBAccessMask,
}

impl SMBTreeConnect {
    pub fn init(share: String, path: String, tree_id: u32, response: &SMBTreeConnectResponse) -> Self {
        Self {
            share,
            path,
            tree_id,
            share_type: response.share_type,
            share_flags: response.share_flags,
            maximal_access: response.maximal_access,
        }
    }

    pub fn share(&self) -> &str {
        &self.share
    }

    /// `\\host\share`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn tree_id(&self) -> u32 {
        self.tree_id
    }

    pub fn share_type(&self) -> SMBShareType {
        self.share_type
    }

    pub fn share_flags(&self) -> SMBShareFlags {
        self.share_flags
    }

    pub fn maximal_access(&self) -> SMBAccessMask {
        self.maximal_access
    }

    pub fn can_write(&self) -> bool {
        self.maximal_access.intersects(SMBAccessMask::FILE_WRITE_DATA | SMBAccessMask::GENERIC_WRITE | SMBAccessMask::GENERIC_ALL)
    }
}
