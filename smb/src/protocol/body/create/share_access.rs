use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_bitflag;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    pub struct SMBShareAccess: u32 {
        const READ   = 0x1;
        const WRITE  = 0x2;
        const DELETE = 0x4;
    }
}

impl_smb_for_bitflag! { SMBShareAccess }
