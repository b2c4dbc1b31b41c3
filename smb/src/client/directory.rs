use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use smb_core::error::SMBError;
use smb_core::logging::{debug, trace};
use smb_core::nt_status::NTStatus;
use smb_core::SMBResult;

use crate::client::client::SMBClient;
use crate::client::open::SMBFileHandle;
use crate::client::path::normalize_path;
use crate::protocol::body::close::SMBCloseFlags;
use crate::protocol::body::create::{SMBCreateDisposition, SMBCreateOptions, SMBFileAttributes};
use crate::protocol::body::file_info::SMBDirectoryInformation;
use crate::protocol::body::query_directory::{SMBQueryDirectoryFlags, SMBQueryDirectoryRequest};
use crate::protocol::body::tree_connect::SMBAccessMask;
use crate::protocol::body::{FileTime, SMBBody};
use crate::protocol::header::SMBCommandCode;
use crate::socket::SMBTransport;

const SEARCH_ALL: &str = "*";

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub size: u64,
    pub allocation_size: u64,
    pub attributes: SMBFileAttributes,
    pub created: FileTime,
    pub accessed: FileTime,
    pub modified: FileTime,
    pub changed: FileTime,
}

impl DirectoryEntry {
    pub fn is_directory(&self) -> bool {
        self.attributes.contains(SMBFileAttributes::DIRECTORY)
    }
}

impl From<SMBDirectoryInformation> for DirectoryEntry {
    fn from(info: SMBDirectoryInformation) -> Self {
        Self {
            name: info.file_name,
            size: info.end_of_file,
            allocation_size: info.allocation_size,
            attributes: info.file_attributes,
            created: info.creation_time,
            accessed: info.last_access_time,
            modified: info.last_write_time,
            changed: info.change_time,
        }
    }
}

/// Entries of one directory, fetched a QUERY_DIRECTORY page at a time.
///
/// The directory handle is closed once the listing is exhausted, fails, or
/// is dropped.
pub struct DirectoryListing<'a, T: SMBTransport> {
    client: &'a mut SMBClient<T>,
    handle: Option<SMBFileHandle>,
    entries: VecDeque<DirectoryEntry>,
    restart: bool,
}

impl<'a, T: SMBTransport> DirectoryListing<'a, T> {
    fn new(client: &'a mut SMBClient<T>, handle: SMBFileHandle) -> Self {
        Self {
            client,
            handle: Some(handle),
            entries: VecDeque::new(),
            restart: true,
        }
    }

    /// Path of the listed directory.
    pub fn path(&self) -> Option<&str> {
        self.handle.as_ref().map(SMBFileHandle::path)
    }

    /// Fetches the next page. `Ok(false)` once the server has no more entries.
    fn fetch_page(&mut self) -> SMBResult<bool> {
        let Some(handle) = self.handle.as_ref() else {
            return Ok(false);
        };
        let flags = if self.restart {
            SMBQueryDirectoryFlags::RESTART_SCANS
        } else {
            SMBQueryDirectoryFlags::empty()
        };
        self.restart = false;
        let path = handle.path().to_string();
        let request = SMBQueryDirectoryRequest::new(handle.file_id(), SEARCH_ALL, flags, self.client.query_buffer_size());
        let response = self.client.exchange(SMBCommandCode::QueryDirectory, SMBBody::QueryDirectoryRequest(request))?;
        let status = response.header.nt_status();
        let buffer = match (status, response.body) {
            (NTStatus::NoMoreFiles, _) => return Ok(false),
            (NTStatus::StatusSuccess, SMBBody::QueryDirectoryResponse(body)) => body.buffer,
            (NTStatus::StatusSuccess, _) => {
                return Err(self.client.fail(SMBError::protocol_error("QUERY_DIRECTORY succeeded without a listing")));
            }
            (status, _) => return Err(SMBError::from_status(status, path)),
        };
        let page = SMBDirectoryInformation::parse_list(&buffer).map_err(|e| self.client.fail(e))?;
        trace!(path = path.as_str(), count = page.len(), "directory page");
        if page.is_empty() {
            return Ok(false);
        }
        self.entries.extend(
            page.into_iter()
                .filter(|info| info.file_name != "." && info.file_name != "..")
                .map(DirectoryEntry::from),
        );
        Ok(true)
    }

    fn finish(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.client.close_quietly(handle);
        }
    }
}

impl<T: SMBTransport> Iterator for DirectoryListing<'_, T> {
    type Item = SMBResult<DirectoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.entries.pop_front() {
                return Some(Ok(entry));
            }
            match self.fetch_page() {
                Ok(true) => {}
                Ok(false) => {
                    self.finish();
                    return None;
                }
                Err(e) => {
                    self.finish();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<T: SMBTransport> Drop for DirectoryListing<'_, T> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl<T: SMBTransport> SMBClient<T> {
    /// Lists `path` lazily. `.` and `..` are left out.
    pub fn list_directory(&mut self, path: &str) -> SMBResult<DirectoryListing<'_, T>> {
        self.require_tree()?;
        let path = normalize_path(path);
        let (handle, _) = self.open(
            &path,
            SMBAccessMask::FILE_LIST_DIRECTORY | SMBAccessMask::FILE_READ_ATTRIBUTES,
            SMBCreateDisposition::Open,
            SMBCreateOptions::DIRECTORY_FILE,
        )?;
        debug!(path = path.as_str(), "listing directory");
        Ok(DirectoryListing::new(self, handle))
    }

    /// Creates the directory `path`. Its parent must exist.
    pub fn create_directory(&mut self, path: &str) -> SMBResult<()> {
        self.require_tree()?;
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(SMBError::AlreadyExists("\\".into()));
        }
        let (handle, _) = self.open(
            &path,
            SMBAccessMask::FILE_LIST_DIRECTORY | SMBAccessMask::FILE_READ_ATTRIBUTES,
            SMBCreateDisposition::Create,
            SMBCreateOptions::DIRECTORY_FILE,
        )?;
        debug!(path = path.as_str(), "created directory");
        self.close_handle(handle, SMBCloseFlags::empty())?;
        Ok(())
    }

    /// Deletes the empty directory `path`.
    pub fn delete_directory(&mut self, path: &str) -> SMBResult<()> {
        self.delete_path(path, SMBCreateOptions::DIRECTORY_FILE)
    }
}
