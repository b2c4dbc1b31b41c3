//! File information classes [MS-FSCC 2.4] carried in QUERY_DIRECTORY
//! responses and SET_INFO requests.

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_enum;

mod directory;
mod disposition;
mod rename;

pub type SMBDirectoryInformation = directory::SMBDirectoryInformation;
pub type SMBFileDispositionInformation = disposition::SMBFileDispositionInformation;
pub type SMBFileRenameInformation = rename::SMBFileRenameInformation;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum SMBFileInformationClass {
    FileDirectoryInformation = 0x01,
    FileFullDirectoryInformation = 0x02,
    FileBothDirectoryInformation = 0x03,
    FileBasicInformation = 0x04,
    FileRenameInformation = 0x0A,
    FileNamesInformation = 0x0C,
    FileDispositionInformation = 0x0D,
    FileEndOfFileInformation = 0x14,
    FileIdBothDirectoryInformation = 0x25,
    FileIdFullDirectoryInformation = 0x26,
}

impl_smb_for_enum! { SMBFileInformationClass: u8 }
