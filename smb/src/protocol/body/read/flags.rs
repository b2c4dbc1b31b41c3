use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_bitflag;

bitflags! {
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
    pub struct SMBReadRequestFlags: u8 {
        const UNBUFFERED = 0x01;
        const REQUEST_COMPRESSED = 0x02;
    }
}

impl_smb_for_bitflag! { SMBReadRequestFlags }
