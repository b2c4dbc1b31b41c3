use serde::{Deserialize, Serialize};
use uuid::Uuid;

use smb_core::{SMBByteSize, SMBFromBytes, SMBParseResult, SMBToBytes, SMBVecFromBytes};

use crate::protocol::body::{buffer_offset, Capabilities, FileTime, parse_structure_size, read_buffer, remaining_after, SMBDialect};
use crate::protocol::body::negotiate::NegotiateSecurityMode;

const REQUEST_FIXED_SIZE: usize = 36;
const RESPONSE_FIXED_SIZE: usize = 64;

/// SMB2 NEGOTIATE Request [MS-SMB2 2.2.3], without negotiate contexts.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct SMBNegotiateRequest {
    pub security_mode: NegotiateSecurityMode,
    pub capabilities: Capabilities,
    pub client_guid: Uuid,
    pub dialects: Vec<SMBDialect>,
}

impl SMBNegotiateRequest {
    pub fn new(security_mode: NegotiateSecurityMode, client_guid: Uuid, dialects: Vec<SMBDialect>) -> Self {
        Self {
            security_mode,
            capabilities: Capabilities::empty(),
            client_guid,
            dialects,
        }
    }
}

impl SMBByteSize for SMBNegotiateRequest {
    fn smb_byte_size(&self) -> usize {
        REQUEST_FIXED_SIZE + self.dialects.len() * 2
    }
}

impl SMBFromBytes for SMBNegotiateRequest {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let remaining = parse_structure_size(input, 36)?;
        let (remaining, dialect_count) = u16::smb_from_bytes(remaining)?;
        let (remaining, security_mode) = NegotiateSecurityMode::smb_from_bytes(remaining)?;
        let (remaining, _reserved) = u16::smb_from_bytes(remaining)?;
        let (remaining, capabilities) = Capabilities::smb_from_bytes(remaining)?;
        let (remaining, client_guid) = Uuid::smb_from_bytes(remaining)?;
        let (remaining, _client_start_time) = u64::smb_from_bytes(remaining)?;
        let (remaining, dialects) = <Vec<SMBDialect>>::smb_from_bytes_vec(remaining, dialect_count as usize)?;
        Ok((remaining, Self {
            security_mode,
            capabilities,
            client_guid,
            dialects,
        }))
    }
}

impl SMBToBytes for SMBNegotiateRequest {
    fn smb_to_bytes(&self) -> Vec<u8> {
        [
            36_u16.smb_to_bytes(),
            (self.dialects.len() as u16).smb_to_bytes(),
            self.security_mode.smb_to_bytes(),
            0_u16.smb_to_bytes(),
            self.capabilities.smb_to_bytes(),
            self.client_guid.smb_to_bytes(),
            0_u64.smb_to_bytes(),
            self.dialects.smb_to_bytes(),
        ].concat()
    }
}

/// SMB2 NEGOTIATE Response [MS-SMB2 2.2.4]. Negotiate contexts only exist
/// for 3.1.1, which this client never offers.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct SMBNegotiateResponse {
    pub security_mode: NegotiateSecurityMode,
    pub dialect: SMBDialect,
    pub guid: Uuid,
    pub capabilities: Capabilities,
    pub max_transact_size: u32,
    pub max_read_size: u32,
    pub max_write_size: u32,
    pub system_time: FileTime,
    pub server_start_time: FileTime,
    pub buffer: Vec<u8>,
}

impl SMBByteSize for SMBNegotiateResponse {
    fn smb_byte_size(&self) -> usize {
        RESPONSE_FIXED_SIZE + self.buffer.len()
    }
}

impl SMBFromBytes for SMBNegotiateResponse {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let remaining = parse_structure_size(input, 65)?;
        let (remaining, security_mode) = NegotiateSecurityMode::smb_from_bytes(remaining)?;
        let (remaining, dialect) = SMBDialect::smb_from_bytes(remaining)?;
        let (remaining, _context_count) = u16::smb_from_bytes(remaining)?;
        let (remaining, guid) = Uuid::smb_from_bytes(remaining)?;
        let (remaining, capabilities) = Capabilities::smb_from_bytes(remaining)?;
        let (remaining, max_transact_size) = u32::smb_from_bytes(remaining)?;
        let (remaining, max_read_size) = u32::smb_from_bytes(remaining)?;
        let (remaining, max_write_size) = u32::smb_from_bytes(remaining)?;
        let (remaining, system_time) = FileTime::smb_from_bytes(remaining)?;
        let (remaining, server_start_time) = FileTime::smb_from_bytes(remaining)?;
        let (remaining, buffer_offset) = u16::smb_from_bytes(remaining)?;
        let (remaining, buffer_length) = u16::smb_from_bytes(remaining)?;
        let (_, _context_offset) = u32::smb_from_bytes(remaining)?;
        let buffer = read_buffer(input, buffer_offset as usize, buffer_length as usize)?.to_vec();
        let remaining = remaining_after(input, RESPONSE_FIXED_SIZE, buffer_offset as usize, buffer_length as usize);
        Ok((remaining, Self {
            security_mode,
            dialect,
            guid,
            capabilities,
            max_transact_size,
            max_read_size,
            max_write_size,
            system_time,
            server_start_time,
            buffer,
        }))
    }
}

impl SMBToBytes for SMBNegotiateResponse {
    fn smb_to_bytes(&self) -> Vec<u8> {
        [
            65_u16.smb_to_bytes(),
            self.security_mode.smb_to_bytes(),
            self.dialect.smb_to_bytes(),
            0_u16.smb_to_bytes(),
            self.guid.smb_to_bytes(),
            self.capabilities.smb_to_bytes(),
            self.max_transact_size.smb_to_bytes(),
            self.max_read_size.smb_to_bytes(),
            self.max_write_size.smb_to_bytes(),
            self.system_time.smb_to_bytes(),
            self.server_start_time.smb_to_bytes(),
            (buffer_offset(RESPONSE_FIXED_SIZE) as u16).smb_to_bytes(),
            (self.buffer.len() as u16).smb_to_bytes(),
            0_u32.smb_to_bytes(),
            self.buffer.clone(),
        ].concat()
    }
}
