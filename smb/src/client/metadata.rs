use serde::{Deserialize, Serialize};

use smb_core::SMBResult;

use crate::client::client::SMBClient;
use crate::client::path::{file_name, normalize_path};
use crate::protocol::body::close::{SMBCloseFlags, SMBCloseResponse};
use crate::protocol::body::create::{SMBCreateDisposition, SMBCreateOptions, SMBCreateResponse, SMBFileAttributes};
use crate::protocol::body::tree_connect::SMBAccessMask;
use crate::protocol::body::FileTime;
use crate::socket::SMBTransport;

/// Size, attributes and timestamps of one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    pub allocation_size: u64,
    pub attributes: SMBFileAttributes,
    pub created: FileTime,
    pub accessed: FileTime,
    pub modified: FileTime,
    pub changed: FileTime,
}

impl FileMetadata {
    pub fn is_directory(&self) -> bool {
        self.attributes.contains(SMBFileAttributes::DIRECTORY)
    }

    fn from_create(name: String, response: &SMBCreateResponse) -> Self {
        Self {
            name,
            size: response.end_of_file,
            allocation_size: response.allocation_size,
            attributes: response.file_attributes,
            created: response.creation_time,
            accessed: response.last_access_time,
            modified: response.last_write_time,
            changed: response.change_time,
        }
    }

    fn from_close(name: String, response: &SMBCloseResponse) -> Self {
        Self {
            name,
            size: response.end_of_file,
            allocation_size: response.allocation_size,
            attributes: response.file_attributes,
            created: response.creation_time,
            accessed: response.last_access_time,
            modified: response.last_write_time,
            changed: response.change_time,
        }
    }
}

impl<T: SMBTransport> SMBClient<T> {
    /// Looks up `path` without reading it. The attributes come from the
    /// CLOSE response when the server fills them in, else from CREATE.
    pub fn stat(&mut self, path: &str) -> SMBResult<FileMetadata> {
        self.require_tree()?;
        let path = normalize_path(path);
        let (handle, created) = self.open(
            &path,
            SMBAccessMask::FILE_READ_ATTRIBUTES,
            SMBCreateDisposition::Open,
            SMBCreateOptions::empty(),
        )?;
        let closed = self.close_handle(handle, SMBCloseFlags::POSTQUERY_ATTRIB)?;
        let name = file_name(&path).to_string();
        if closed.flags & SMBCloseFlags::POSTQUERY_ATTRIB.bits() != 0 {
            Ok(FileMetadata::from_close(name, &closed))
        } else {
            Ok(FileMetadata::from_create(name, &created))
        }
    }
}
