use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_enum;

/// What CREATE does when the file does or does not already exist.
#[repr(u32)]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, Serialize, Deserialize, Clone, Copy)]
pub enum SMBCreateDisposition {
    Supersede = 0x0,
    Open = 0x1,
    Create = 0x2,
    OpenIf = 0x3,
    Overwrite = 0x4,
    OverwriteIf = 0x5,
}

impl_smb_for_enum! { SMBCreateDisposition: u32 }
