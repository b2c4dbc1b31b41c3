use serde::{Deserialize, Serialize};

use smb_core::{SMBByteSize, SMBFromBytes, SMBResult, SMBToBytes};
use smb_core::error::SMBError;
use smb_derive::{SMBByteSize, SMBFromBytes, SMBToBytes};

use crate::protocol::body::create::SMBFileAttributes;
use crate::protocol::body::FileTime;

const ENTRY_ALIGNMENT: usize = 8;

/// FILE_DIRECTORY_INFORMATION [MS-FSCC 2.4.10]: one entry of a
/// QUERY_DIRECTORY response buffer. A single encoded entry carries a zero
/// `NextEntryOffset`; the chain is handled by [`Self::parse_list`] and
/// [`Self::encode_list`].
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize, SMBByteSize, SMBFromBytes, SMBToBytes)]
pub struct SMBDirectoryInformation {
    #[smb_direct(start(fixed = 4))]
    pub file_index: u32,
    #[smb_direct(start(fixed = 8))]
    pub creation_time: FileTime,
    #[smb_direct(start(fixed = 16))]
    pub last_access_time: FileTime,
    #[smb_direct(start(fixed = 24))]
    pub last_write_time: FileTime,
    #[smb_direct(start(fixed = 32))]
    pub change_time: FileTime,
    #[smb_direct(start(fixed = 40))]
    pub end_of_file: u64,
    #[smb_direct(start(fixed = 48))]
    pub allocation_size: u64,
    #[smb_direct(start(fixed = 56))]
    pub file_attributes: SMBFileAttributes,
    #[smb_buffer(length(inner(start = 60, num_type = "u32")))]
    pub file_name: String,
}

impl SMBDirectoryInformation {
    /// Parses a buffer of entries chained by `NextEntryOffset`. A link that
    /// points backwards, into the current entry, or past the buffer is
    /// rejected.
    pub fn parse_list(buffer: &[u8]) -> SMBResult<Vec<Self>> {
        let mut entries = Vec::new();
        let mut position = 0;
        while position < buffer.len() {
            let entry_bytes = &buffer[position..];
            let (_, next_entry_offset) = u32::smb_from_bytes(entry_bytes)?;
            let (_, entry) = Self::smb_from_bytes(entry_bytes)?;
            let entry_size = entry.smb_byte_size();
            entries.push(entry);
            if next_entry_offset == 0 {
                break;
            }
            let next = next_entry_offset as usize;
            if next < entry_size || next > entry_bytes.len() {
                return Err(SMBError::parse_error(format!("Invalid NextEntryOffset {} at {}", next, position)));
            }
            position += next;
        }
        Ok(entries)
    }

    /// Lays out `entries` the way a server fills a QUERY_DIRECTORY buffer:
    /// each entry 8-byte aligned, the last with a zero `NextEntryOffset`.
    pub fn encode_list(entries: &[Self]) -> Vec<u8> {
        let mut buffer = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            let is_last = idx + 1 == entries.len();
            let size = entry.smb_byte_size();
            let padded = size.div_ceil(ENTRY_ALIGNMENT) * ENTRY_ALIGNMENT;
            let next_entry_offset = if is_last { 0 } else { padded as u32 };
            buffer.extend_from_slice(&next_entry_offset.smb_to_bytes());
            buffer.extend_from_slice(&entry.smb_to_bytes()[4..]);
            if !is_last {
                buffer.resize(buffer.len() + padded - size, 0);
            }
        }
        buffer
    }

    pub fn is_directory(&self) -> bool {
        self.file_attributes.contains(SMBFileAttributes::DIRECTORY)
    }
}
