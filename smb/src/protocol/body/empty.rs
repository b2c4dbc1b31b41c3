use serde::{Deserialize, Serialize};

use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

/// Body shared by ECHO, LOGOFF and TREE_DISCONNECT requests and responses:
/// a structure size of 4 and two reserved bytes.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default, SMBByteSize, SMBFromBytes, SMBToBytes)]
#[smb_byte_tag(value = 4)]
pub struct SMBEmpty;
