use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::{SMBByteSize, SMBFromBytes, SMBParseResult, SMBToBytes};
use crate::error::SMBError;

/// NTSTATUS values [MS-ERREF 2.3] the client interprets.
#[repr(u32)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TryFromPrimitive, Copy)]
pub enum NTStatus {
    StatusSuccess = 0x0,
    Pending = 0x00000103,
    BufferOverflow = 0x80000005,
    NoMoreFiles = 0x80000006,
    NotImplemented = 0xC0000002,
    InvalidHandle = 0xC0000008,
    InvalidParameter = 0xC000000D,
    NoSuchFile = 0xC000000F,
    InvalidDeviceRequest = 0xC0000010,
    EndOfFile = 0xC0000011,
    MoreProcessingRequired = 0xC0000016,
    AccessDenied = 0xC0000022,
    BufferTooSmall = 0xC0000023,
    ObjectNameInvalid = 0xC0000033,
    ObjectNameNotFound = 0xC0000034,
    ObjectNameCollision = 0xC0000035,
    ObjectPathNotFound = 0xC000003A,
    SharingViolation = 0xC0000043,
    DeletePending = 0xC0000056,
    PrivilegeNotHeld = 0xC0000061,
    StatusLogonFailure = 0xC000006D,
    AccountRestriction = 0xC000006E,
    PasswordExpired = 0xC0000071,
    AccountDisabled = 0xC0000072,
    DiskFull = 0xC000007F,
    InsufficientResources = 0xC000009A,
    FileIsADirectory = 0xC00000BA,
    StatusNotSupported = 0xC00000BB,
    BadNetworkPath = 0xC00000BE,
    NetworkNameDeleted = 0xC00000C9,
    BadNetworkName = 0xC00000CC,
    RequestNotAccepted = 0xC00000D0,
    DirectoryNotEmpty = 0xC0000101,
    NotADirectory = 0xC0000103,
    Cancelled = 0xC0000120,
    CannotDelete = 0xC0000121,
    FileClosed = 0xC0000128,
    UserSessionDeleted = 0xC0000203,
    NotFound = 0xC0000225,
    NetworkSessionExpired = 0xC000035C,
    UnknownError = 0xFFFFFFFF,
}

impl NTStatus {
    /// Interprets a raw status code. Codes outside the table collapse to
    /// [`NTStatus::UnknownError`]; callers that need the exact code keep the raw value.
    pub fn from_code(code: u32) -> Self {
        Self::try_from_primitive(code).unwrap_or(Self::UnknownError)
    }

    /// True for the error severity (top two bits set).
    pub fn is_error(code: u32) -> bool {
        code >> 30 == 0b11
    }
}

impl SMBByteSize for NTStatus {
    fn smb_byte_size(&self) -> usize {
        std::mem::size_of_val(&(*self as u32))
    }
}

impl SMBFromBytes for NTStatus {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let (remaining, underlying) = u32::smb_from_bytes(input)?;
        let res = Self::try_from_primitive(underlying)
            .map_err(|e| SMBError::parse_error(e.to_string()))?;
        Ok((remaining, res))
    }
}

impl SMBToBytes for NTStatus {
    fn smb_to_bytes(&self) -> Vec<u8> {
        (*self as u32).smb_to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_collapse() {
        assert_eq!(NTStatus::from_code(0xC0000034), NTStatus::ObjectNameNotFound);
        assert_eq!(NTStatus::from_code(0xC0DEC0DE), NTStatus::UnknownError);
        assert!(NTStatus::smb_from_bytes(&0xC0DEC0DE_u32.to_le_bytes()).is_err());
    }

    #[test]
    fn severity() {
        assert!(NTStatus::is_error(NTStatus::AccessDenied as u32));
        assert!(!NTStatus::is_error(NTStatus::NoMoreFiles as u32));
        assert!(!NTStatus::is_error(NTStatus::StatusSuccess as u32));
    }

    #[test]
    fn status_round_trip() {
        let bytes = NTStatus::MoreProcessingRequired.smb_to_bytes();
        assert_eq!(bytes, [0x16, 0x00, 0x00, 0xC0]);
        let (_, parsed) = NTStatus::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, NTStatus::MoreProcessingRequired);
    }
}
