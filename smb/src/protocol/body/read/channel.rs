use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_enum;

/// Transfer channel for READ and WRITE. Only `None` is used over TCP.
#[repr(u32)]
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, TryFromPrimitive, Clone, Copy, Default)]
pub enum SMBRWChannel {
    #[default]
    None = 0x0,
    RdmaV1 = 0x1,
    RdmaV1Invalidate = 0x2,
}

impl_smb_for_enum! { SMBRWChannel: u32 }
