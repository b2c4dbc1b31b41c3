use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_bitflag;

bitflags! {
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
    pub struct SMBCloseFlags: u16 {
        const POSTQUERY_ATTRIB = 0x01;
    }
}

impl_smb_for_bitflag! { SMBCloseFlags }
