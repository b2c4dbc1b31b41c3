mod access_mask;
mod flags;
mod tree_connect;

pub type SMBAccessMask = access_mask::SMBAccessMask;
pub type SMBShareType = flags::SMBShareType;
pub type SMBShareFlags = flags::SMBShareFlags;
pub type SMBTreeCapabilities = flags::SMBTreeCapabilities;
pub type SMBTreeConnectRequest = tree_connect::SMBTreeConnectRequest;
pub type SMBTreeConnectResponse = tree_connect::SMBTreeConnectResponse;
