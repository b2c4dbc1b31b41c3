use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_bitflag;

bitflags! {
    /// [MS-FSCC 2.6] File attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
    pub struct SMBFileAttributes: u32 {
        const READONLY            = 0x00000001;
        const HIDDEN              = 0x00000002;
        const SYSTEM              = 0x00000004;
        const DIRECTORY           = 0x00000010;
        const ARCHIVE             = 0x00000020;
        const NORMAL              = 0x00000080;
        const TEMPORARY           = 0x00000100;
        const SPARSE_FILE         = 0x00000200;
        const REPARSE_POINT       = 0x00000400;
        const COMPRESSED          = 0x00000800;
        const OFFLINE             = 0x00001000;
        const NOT_CONTENT_INDEXED = 0x00002000;
        const ENCRYPTED           = 0x00004000;
        const INTEGRITY_STREAM    = 0x00008000;
        const NO_SCRUB_DATA       = 0x00020000;
    }
}

impl_smb_for_bitflag! { SMBFileAttributes }
