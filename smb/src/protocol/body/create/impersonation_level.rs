use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_enum;

#[repr(u32)]
#[derive(Debug, Eq, PartialEq, TryFromPrimitive, Serialize, Deserialize, Clone, Copy, Default)]
pub enum SMBImpersonationLevel {
    Anonymous = 0x0,
    Identification = 0x1,
    #[default]
    Impersonation = 0x2,
    Delegate = 0x3,
}

impl_smb_for_enum! { SMBImpersonationLevel: u32 }
