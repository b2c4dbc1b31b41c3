use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_enum;

#[repr(u8)]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, Serialize, Deserialize, Clone, Copy, Default)]
pub enum SMBOplockLevel {
    #[default]
    None = 0x0,
    II = 0x1,
    Exclusive = 0x8,
    Batch = 0x9,
    Lease = 0xFF,
}

impl_smb_for_enum! { SMBOplockLevel: u8 }
