use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_bitflag;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    pub struct SMBCreateOptions: u32 {
        const DIRECTORY_FILE            = 0x00000001;
        const WRITE_THROUGH             = 0x00000002;
        const SEQUENTIAL_ONLY           = 0x00000004;
        const NO_INTERMEDIATE_BUFFERING = 0x00000008;
        const SYNCHRONOUS_IO_ALERT      = 0x00000010;
        const SYNCHRONOUS_IO_NONALERT   = 0x00000020;
        const NON_DIRECTORY_FILE        = 0x00000040;
        const COMPLETE_IF_OPLOCKED      = 0x00000100;
        const NO_EA_KNOWLEDGE           = 0x00000200;
        const OPEN_REMOTE_INSTANCE      = 0x00000400;
        const RANDOM_ACCESS             = 0x00000800;
        const DELETE_ON_CLOSE           = 0x00001000;
        const OPEN_BY_FILE_ID           = 0x00002000;
        const OPEN_FOR_BACKUP_INTENT    = 0x00004000;
        const NO_COMPRESSION            = 0x00008000;
        const OPEN_REQUIRING_OPLOCK     = 0x00010000;
        const DISALLOW_EXCLUSIVE        = 0x00020000;
        const RESERVE_OPFILTER          = 0x00100000;
        const OPEN_REPARSE_POINT        = 0x00200000;
        const OPEN_NO_RECALL            = 0x00400000;
        const OPEN_FOR_FREE_SPACE_QUERY = 0x00800000;
    }
}

impl_smb_for_bitflag! { SMBCreateOptions }
