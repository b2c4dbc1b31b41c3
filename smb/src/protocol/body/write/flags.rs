use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_bitflag;

bitflags! {
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
    pub struct SMBWriteFlags: u32 {
        const WRITE_THROUGH = 0x01;
        const WRITE_UNBUFFERED = 0x02;
    }
}

impl_smb_for_bitflag! { SMBWriteFlags }
