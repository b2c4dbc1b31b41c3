use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::{impl_smb_for_bitflag, impl_smb_for_enum};

#[repr(u8)]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, TryFromPrimitive)]
pub enum SMBShareType {
    Disk = 0x01,
    Pipe = 0x02,
    Print = 0x03,
}

bitflags! {
    #[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Copy, Clone)]
    pub struct SMBShareFlags: u32 {
        const AUTO_CACHING                = 0x000010;
        const VDO_CACHING                 = 0x000020;
        const NO_CACHING                  = 0x000030;
        const DFS                         = 0x000001;
        const DFS_ROOT                    = 0x000002;
        const RESTRICT_EXCLUSIVE_OPENS    = 0x000100;
        const FORCE_SHARED_DELETE         = 0x000200;
        const ALLOW_NAMESPACE_CACHING     = 0x000400;
        const ACCESS_BASED_DIRECTORY_ENUM = 0x000800;
        const FORCE_LEVEL_II_OPLOCK       = 0x001000;
        const ENABLE_HASH_V1              = 0x002000;
        const ENABLE_HASH_V2              = 0x004000;
        const ENCRYPT_DATA                = 0x008000;
        const IDENTITY_REMOTING           = 0x040000;
        const COMPRESS_DATA               = 0x100000;
    }
}

bitflags! {
    #[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Copy, Clone)]
    pub struct SMBTreeCapabilities: u32 {
        const DFS                     = 0x0008;
        const CONTINUOUS_AVAILABILITY = 0x0010;
        const SCALEOUT                = 0x0020;
        const CLUSTER                 = 0x0040;
        const ASYMMETRIC              = 0x0080;
        const REDIRECT_TO_OWNER       = 0x0100;
    }
}

impl_smb_for_enum! { SMBShareType: u8 }
impl_smb_for_bitflag! { SMBShareFlags SMBTreeCapabilities }
