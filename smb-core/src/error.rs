use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io;

use crate::nt_status::NTStatus;

#[derive(Debug)]
pub enum SMBError {
    ConnectionError(SMBIOError),
    ConnectionLost(SMBIOError),
    IOError(SMBIOError),
    Timeout(String),
    ParseError(SMBParseError),
    PayloadTooSmall(SMBPayloadTooSmallError),
    CryptoError(SMBCryptoError),
    NegotiationFailed(String),
    AuthenticationFailed(String),
    ShareConnectError(SMBShareError),
    NotConnected(String),
    NotFound(String),
    AccessDenied(String),
    DirectoryNotEmpty(String),
    AlreadyExists(String),
    WriteError(SMBWriteError),
    ResponseError(NTStatus),
    ProtocolError(String),
}

impl SMBError {
    pub fn connection_error<T: Into<SMBIOError>>(error: T) -> Self {
        Self::ConnectionError(error.into())
    }

    pub fn connection_lost<T: Into<SMBIOError>>(error: T) -> Self {
        Self::ConnectionLost(error.into())
    }

    pub fn io_error<T: Into<SMBIOError>>(error: T) -> Self {
        Self::IOError(error.into())
    }

    pub fn timeout<T: Into<String>>(message: T) -> Self {
        Self::Timeout(message.into())
    }

    pub fn parse_error<T: Into<SMBParseError>>(error: T) -> Self {
        Self::ParseError(error.into())
    }

    pub fn payload_too_small<T: Into<usize>, U: Into<usize>>(expected: T, actual: U) -> Self {
        Self::PayloadTooSmall((expected, actual).into())
    }

    pub fn crypto_error<T: Into<SMBCryptoError>>(error: T) -> Self {
        Self::CryptoError(error.into())
    }

    pub fn negotiation_failed<T: Into<String>>(message: T) -> Self {
        Self::NegotiationFailed(message.into())
    }

    pub fn authentication_failed<T: Into<String>>(message: T) -> Self {
        Self::AuthenticationFailed(message.into())
    }

    pub fn share_connect_error<T: Into<String>>(share: T, status: NTStatus) -> Self {
        Self::ShareConnectError(SMBShareError { share: share.into(), status })
    }

    pub fn not_connected<T: Into<String>>(message: T) -> Self {
        Self::NotConnected(message.into())
    }

    pub fn write_error(offset: u64, cause: SMBError) -> Self {
        Self::WriteError(SMBWriteError { offset, cause: Box::new(cause) })
    }

    pub fn protocol_error<T: Into<String>>(message: T) -> Self {
        Self::ProtocolError(message.into())
    }

    /// Maps a failing server status for an operation on `path` onto the error
    /// kind a caller can act on.
    pub fn from_status<T: Into<String>>(status: NTStatus, path: T) -> Self {
        match status {
            NTStatus::ObjectNameNotFound
            | NTStatus::ObjectPathNotFound
            | NTStatus::NoSuchFile
            | NTStatus::NotFound
            | NTStatus::BadNetworkPath => Self::NotFound(path.into()),
            NTStatus::AccessDenied
            | NTStatus::CannotDelete
            | NTStatus::SharingViolation
            | NTStatus::DeletePending
            | NTStatus::FileIsADirectory
            | NTStatus::NotADirectory => Self::AccessDenied(path.into()),
            NTStatus::DirectoryNotEmpty => Self::DirectoryNotEmpty(path.into()),
            NTStatus::ObjectNameCollision => Self::AlreadyExists(path.into()),
            _ => Self::ResponseError(status),
        }
    }

    /// Whether the error leaves the connection in an unknown state. Sessions
    /// close themselves when an exchange fails with one of these.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionLost(_)
                | Self::Timeout(_)
                | Self::ParseError(_)
                | Self::PayloadTooSmall(_)
                | Self::ProtocolError(_)
        )
    }
}

impl Display for SMBError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Connection failed: {}", e),
            Self::ConnectionLost(e) => write!(f, "Connection lost: {}", e),
            Self::IOError(e) => write!(f, "{}", e),
            Self::Timeout(message) => write!(f, "Timed out waiting for {}", message),
            Self::ParseError(e) => write!(f, "Malformed message: {}", e),
            Self::PayloadTooSmall(e) => write!(f, "Malformed message: {}", e),
            Self::CryptoError(e) => write!(f, "{}", e),
            Self::NegotiationFailed(message) => write!(f, "Dialect negotiation failed: {}", message),
            Self::AuthenticationFailed(message) => write!(f, "Authentication failed: {}", message),
            Self::ShareConnectError(e) => write!(f, "{}", e),
            Self::NotConnected(message) => write!(f, "Not connected: {}", message),
            Self::NotFound(path) => write!(f, "No such file or directory: {}", path),
            Self::AccessDenied(path) => write!(f, "Access denied: {}", path),
            Self::DirectoryNotEmpty(path) => write!(f, "Directory not empty: {}", path),
            Self::AlreadyExists(path) => write!(f, "File already exists: {}", path),
            Self::WriteError(e) => write!(f, "{}", e),
            Self::ResponseError(status) => write!(f, "Server returned {:?} (0x{:08X})", status, *status as u32),
            Self::ProtocolError(message) => write!(f, "Protocol error: {}", message),
        }
    }
}

impl Error for SMBError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ConnectionError(e) | Self::ConnectionLost(e) | Self::IOError(e) => Some(&e.error),
            Self::WriteError(e) => Some(e.cause.as_ref()),
            _ => None,
        }
    }
}

impl<I: Debug> From<nom::Err<nom::error::Error<I>>> for SMBError {
    fn from(value: nom::Err<nom::error::Error<I>>) -> Self {
        match value {
            nom::Err::Incomplete(nom::Needed::Size(size)) => Self::payload_too_small(size.get(), 0_usize),
            nom::Err::Incomplete(nom::Needed::Unknown) => Self::parse_error("Incomplete input"),
            nom::Err::Error(e) | nom::Err::Failure(e) => Self::parse_error(format!("{:?} while parsing", e.code)),
        }
    }
}

#[derive(Debug)]
pub struct SMBParseError {
    error: Box<dyn Error + Send + Sync>,
}

impl<T: Into<Box<dyn Error + Send + Sync>>> From<T> for SMBParseError {
    fn from(value: T) -> Self {
        Self {
            error: value.into()
        }
    }
}

impl Display for SMBParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse failed with error: {}", self.error)
    }
}

#[derive(Debug)]
pub struct SMBCryptoError {
    message: String,
}

impl<T: Into<String>> From<T> for SMBCryptoError {
    fn from(value: T) -> Self {
        Self {
            message: value.into()
        }
    }
}

impl Display for SMBCryptoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Crypto operation failed with error: {}", self.message)
    }
}

#[derive(Debug)]
pub struct SMBIOError {
    error: io::Error,
}

impl SMBIOError {
    pub fn kind(&self) -> io::ErrorKind {
        self.error.kind()
    }
}

impl<T: Into<io::Error>> From<T> for SMBIOError {
    fn from(value: T) -> Self {
        Self {
            error: value.into()
        }
    }
}

impl Display for SMBIOError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMB I/O operation failed with error: {}", self.error)
    }
}

#[derive(Debug)]
pub struct SMBPayloadTooSmallError {
    expected: usize,
    actual: usize,
}

impl<T: Into<usize>, U: Into<usize>> From<(T, U)> for SMBPayloadTooSmallError {
    fn from(value: (T, U)) -> Self {
        Self {
            expected: value.0.into(),
            actual: value.1.into(),
        }
    }
}

impl Display for SMBPayloadTooSmallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Expected {} bytes, was actually {} bytes", self.expected, self.actual)
    }
}

#[derive(Debug)]
pub struct SMBShareError {
    share: String,
    status: NTStatus,
}

impl SMBShareError {
    pub fn share(&self) -> &str {
        &self.share
    }

    pub fn status(&self) -> NTStatus {
        self.status
    }
}

impl Display for SMBShareError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Could not connect to share {}: {:?}", self.share, self.status)
    }
}

#[derive(Debug)]
pub struct SMBWriteError {
    offset: u64,
    cause: Box<SMBError>,
}

impl SMBWriteError {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn cause(&self) -> &SMBError {
        &self.cause
    }
}

impl Display for SMBWriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Write failed at offset {}: {}", self.offset, self.cause)
    }
}
