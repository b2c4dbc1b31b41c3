use serde::{Deserialize, Serialize};

use smb_core::{SMBByteSize, SMBFromBytes, SMBParseResult, SMBToBytes, SMBVecFromBytes};

use crate::protocol::body::{buffer_offset, FileTime, parse_structure_size, read_buffer, remaining_after};
use crate::protocol::body::create::{SMBCreateAction, SMBCreateDisposition, SMBCreateOptions, SMBFileAttributes, SMBFileId, SMBImpersonationLevel, SMBOplockLevel, SMBShareAccess};
use crate::protocol::body::tree_connect::SMBAccessMask;

const REQUEST_FIXED_SIZE: usize = 56;
const RESPONSE_SIZE: usize = 88;

/// SMB2 CREATE Request [MS-SMB2 2.2.13]. `file_name` is share-relative with
/// backslash separators and no leading separator; empty names the share root.
/// Create contexts are never sent.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct SMBCreateRequest {
    pub oplock_level: SMBOplockLevel,
    pub impersonation_level: SMBImpersonationLevel,
    pub desired_access: SMBAccessMask,
    pub file_attributes: SMBFileAttributes,
    pub share_access: SMBShareAccess,
    pub create_disposition: SMBCreateDisposition,
    pub create_options: SMBCreateOptions,
    pub file_name: String,
}

impl SMBCreateRequest {
    pub fn new<T: Into<String>>(
        file_name: T,
        desired_access: SMBAccessMask,
        create_disposition: SMBCreateDisposition,
        create_options: SMBCreateOptions,
    ) -> Self {
        Self {
            oplock_level: SMBOplockLevel::None,
            impersonation_level: SMBImpersonationLevel::Impersonation,
            desired_access,
            file_attributes: SMBFileAttributes::empty(),
            share_access: SMBShareAccess::READ | SMBShareAccess::WRITE | SMBShareAccess::DELETE,
            create_disposition,
            create_options,
            file_name: file_name.into(),
        }
    }

    pub fn with_attributes(mut self, file_attributes: SMBFileAttributes) -> Self {
        self.file_attributes = file_attributes;
        self
    }
}

impl SMBByteSize for SMBCreateRequest {
    fn smb_byte_size(&self) -> usize {
        REQUEST_FIXED_SIZE + self.file_name.smb_byte_size().max(1)
    }
}

impl SMBFromBytes for SMBCreateRequest {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let remaining = parse_structure_size(input, 57)?;
        let (remaining, _security_flags) = u8::smb_from_bytes(remaining)?;
        let (remaining, oplock_level) = SMBOplockLevel::smb_from_bytes(remaining)?;
        let (remaining, impersonation_level) = SMBImpersonationLevel::smb_from_bytes(remaining)?;
        let (remaining, _create_flags) = u64::smb_from_bytes(remaining)?;
        let (remaining, _reserved) = u64::smb_from_bytes(remaining)?;
        let (remaining, desired_access) = SMBAccessMask::smb_from_bytes(remaining)?;
        let (remaining, file_attributes) = SMBFileAttributes::smb_from_bytes(remaining)?;
        let (remaining, share_access) = SMBShareAccess::smb_from_bytes(remaining)?;
        let (remaining, create_disposition) = SMBCreateDisposition::smb_from_bytes(remaining)?;
        let (remaining, create_options) = SMBCreateOptions::smb_from_bytes(remaining)?;
        let (remaining, offset) = u16::smb_from_bytes(remaining)?;
        let (_, length) = u16::smb_from_bytes(remaining)?;
        let name_bytes = read_buffer(input, offset as usize, length as usize)?;
        let (_, file_name) = String::smb_from_bytes_vec(name_bytes, length as usize)?;
        let consumed = if length == 0 { REQUEST_FIXED_SIZE + 1 } else { REQUEST_FIXED_SIZE };
        let remaining = remaining_after(input, consumed, offset as usize, length as usize);
        Ok((remaining, Self {
            oplock_level,
            impersonation_level,
            desired_access,
            file_attributes,
            share_access,
            create_disposition,
            create_options,
            file_name,
        }))
    }
}

impl SMBToBytes for SMBCreateRequest {
    fn smb_to_bytes(&self) -> Vec<u8> {
        let name = self.file_name.smb_to_bytes();
        let name_length = name.len() as u16;
        // The variable part may not be empty.
        let buffer = if name.is_empty() { vec![0] } else { name };
        [
            57_u16.smb_to_bytes(),
            vec![0],
            self.oplock_level.smb_to_bytes(),
            self.impersonation_level.smb_to_bytes(),
            0_u64.smb_to_bytes(),
            0_u64.smb_to_bytes(),
            self.desired_access.smb_to_bytes(),
            self.file_attributes.smb_to_bytes(),
            self.share_access.smb_to_bytes(),
            self.create_disposition.smb_to_bytes(),
            self.create_options.smb_to_bytes(),
            (buffer_offset(REQUEST_FIXED_SIZE) as u16).smb_to_bytes(),
            name_length.smb_to_bytes(),
            0_u32.smb_to_bytes(),
            0_u32.smb_to_bytes(),
            buffer,
        ].concat()
    }
}

/// SMB2 CREATE Response [MS-SMB2 2.2.14]. Create contexts in the response
/// are skipped.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct SMBCreateResponse {
    pub oplock_level: SMBOplockLevel,
    pub flags: u8,
    pub create_action: SMBCreateAction,
    pub creation_time: FileTime,
    pub last_access_time: FileTime,
    pub last_write_time: FileTime,
    pub change_time: FileTime,
    pub allocation_size: u64,
    pub end_of_file: u64,
    pub file_attributes: SMBFileAttributes,
    pub file_id: SMBFileId,
}

impl SMBByteSize for SMBCreateResponse {
    fn smb_byte_size(&self) -> usize {
        RESPONSE_SIZE
    }
}

impl SMBFromBytes for SMBCreateResponse {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let remaining = parse_structure_size(input, 89)?;
        let (remaining, oplock_level) = SMBOplockLevel::smb_from_bytes(remaining)?;
        let (remaining, flags) = u8::smb_from_bytes(remaining)?;
        let (remaining, create_action) = SMBCreateAction::smb_from_bytes(remaining)?;
        let (remaining, creation_time) = FileTime::smb_from_bytes(remaining)?;
        let (remaining, last_access_time) = FileTime::smb_from_bytes(remaining)?;
        let (remaining, last_write_time) = FileTime::smb_from_bytes(remaining)?;
        let (remaining, change_time) = FileTime::smb_from_bytes(remaining)?;
        let (remaining, allocation_size) = u64::smb_from_bytes(remaining)?;
        let (remaining, end_of_file) = u64::smb_from_bytes(remaining)?;
        let (remaining, file_attributes) = SMBFileAttributes::smb_from_bytes(remaining)?;
        let (remaining, _reserved) = u32::smb_from_bytes(remaining)?;
        let (remaining, file_id) = SMBFileId::smb_from_bytes(remaining)?;
        let (remaining, contexts_offset) = u32::smb_from_bytes(remaining)?;
        let (_, contexts_length) = u32::smb_from_bytes(remaining)?;
        let remaining = remaining_after(input, RESPONSE_SIZE, contexts_offset as usize, contexts_length as usize);
        Ok((remaining, Self {
            oplock_level,
            flags,
            create_action,
            creation_time,
            last_access_time,
            last_write_time,
            change_time,
            allocation_size,
            end_of_file,
            file_attributes,
            file_id,
        }))
    }
}

impl SMBToBytes for SMBCreateResponse {
    fn smb_to_bytes(&self) -> Vec<u8> {
        [
            89_u16.smb_to_bytes(),
            self.oplock_level.smb_to_bytes(),
            self.flags.smb_to_bytes(),
            self.create_action.smb_to_bytes(),
            self.creation_time.smb_to_bytes(),
            self.last_access_time.smb_to_bytes(),
            self.last_write_time.smb_to_bytes(),
            self.change_time.smb_to_bytes(),
            self.allocation_size.smb_to_bytes(),
            self.end_of_file.smb_to_bytes(),
            self.file_attributes.smb_to_bytes(),
            0_u32.smb_to_bytes(),
            self.file_id.smb_to_bytes(),
            0_u32.smb_to_bytes(),
            0_u32.smb_to_bytes(),
        ].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_layout() {
        let request = SMBCreateRequest::new(
            "dir\\a.txt",
            SMBAccessMask::GENERIC_READ,
            SMBCreateDisposition::Open,
            SMBCreateOptions::NON_DIRECTORY_FILE,
        );
        let bytes = request.smb_to_bytes();
        assert_eq!(&bytes[0..2], &[57, 0]);
        assert_eq!(&bytes[36..40], &[1, 0, 0, 0]);
        assert_eq!(&bytes[44..46], &[0x78, 0x00]);
        assert_eq!(&bytes[46..48], &[18, 0]);
        assert_eq!(&bytes[56..58], &[b'd', 0]);
        assert_eq!(bytes.len(), request.smb_byte_size());
        let (remaining, parsed) = SMBCreateRequest::smb_from_bytes(&bytes).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(parsed, request);
    }

    #[test]
    fn share_root_request_is_padded() {
        let request = SMBCreateRequest::new(
            "",
            SMBAccessMask::FILE_LIST_DIRECTORY,
            SMBCreateDisposition::Open,
            SMBCreateOptions::DIRECTORY_FILE,
        );
        let bytes = request.smb_to_bytes();
        assert_eq!(bytes.len(), 57);
        assert_eq!(&bytes[46..48], &[0, 0]);
        let (_, parsed) = SMBCreateRequest::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed.file_name, "");
    }

    #[test]
    fn create_response_round_trip() {
        let response = SMBCreateResponse {
            oplock_level: SMBOplockLevel::None,
            flags: 0,
            create_action: SMBCreateAction::Created,
            creation_time: FileTime::from_unix(1_600_000_000),
            last_access_time: FileTime::from_unix(1_600_000_001),
            last_write_time: FileTime::from_unix(1_600_000_002),
            change_time: FileTime::from_unix(1_600_000_003),
            allocation_size: 4096,
            end_of_file: 12,
            file_attributes: SMBFileAttributes::ARCHIVE,
            file_id: SMBFileId::new(1, 2),
        };
        let bytes = response.smb_to_bytes();
        assert_eq!(bytes.len(), 88);
        assert_eq!(&bytes[64..72], &[1, 0, 0, 0, 0, 0, 0, 0]);
        let (_, parsed) = SMBCreateResponse::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, response);
    }
}
