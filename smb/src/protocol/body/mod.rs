use smb_core::{SMBFromBytes, SMBResult};
use smb_core::error::SMBError;

use crate::protocol::header::SMB2_HEADER_SIZE;

mod body;
mod capabilities;
mod dialect;
mod empty;
mod filetime;
pub mod close;
pub mod create;
pub mod error;
pub mod file_info;
pub mod negotiate;
pub mod query_directory;
pub mod read;
pub mod session_setup;
pub mod set_info;
pub mod tree_connect;
pub mod write;

pub type SMBBody = body::SMBBody;
pub type Capabilities = capabilities::Capabilities;
pub type FileTime = filetime::FileTime;
pub type SMBDialect = dialect::SMBDialect;
pub use empty::SMBEmpty;

/// Consumes the leading StructureSize field, rejecting any other value.
pub(crate) fn parse_structure_size(input: &[u8], expected: u16) -> SMBResult<&[u8]> {
    let (remaining, size) = u16::smb_from_bytes(input)?;
    if size != expected {
        return Err(SMBError::parse_error(format!("Invalid structure size {} (expected {})", size, expected)));
    }
    Ok(remaining)
}

/// Offset from the start of the header of a buffer that directly follows
/// `fixed_len` bytes of body.
pub(crate) const fn buffer_offset(fixed_len: usize) -> usize {
    SMB2_HEADER_SIZE + fixed_len
}

/// Slices a variable-length buffer out of `body`. `offset` is measured from the
/// start of the SMB2 header as it is on the wire.
pub(crate) fn read_buffer(body: &[u8], offset: usize, length: usize) -> SMBResult<&[u8]> {
    if length == 0 {
        return Ok(&[]);
    }
    let start = offset
        .checked_sub(SMB2_HEADER_SIZE)
        .ok_or_else(|| SMBError::parse_error(format!("Buffer offset {} points into the header", offset)))?;
    let end = start + length;
    if end > body.len() {
        return Err(SMBError::payload_too_small(end, body.len()));
    }
    Ok(&body[start..end])
}

/// What follows a body of `fixed_len` bytes whose buffer ends at
/// `offset + length` (header-relative).
pub(crate) fn remaining_after(body: &[u8], fixed_len: usize, offset: usize, length: usize) -> &[u8] {
    let buffer_end = if length == 0 { 0 } else { offset.saturating_sub(SMB2_HEADER_SIZE) + length };
    let consumed = fixed_len.max(buffer_end).min(body.len());
    &body[consumed..]
}
