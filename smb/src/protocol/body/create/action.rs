use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_enum;

#[repr(u32)]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, Serialize, Deserialize, Clone, Copy)]
pub enum SMBCreateAction {
    Superseded = 0x0,
    Opened = 0x1,
    Created = 0x2,
    Overwritten = 0x3,
}

impl_smb_for_enum! { SMBCreateAction: u32 }
