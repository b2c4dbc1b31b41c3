mod command_code;
mod flags;
mod header;

pub type SMBCommandCode = command_code::SMBCommandCode;
pub type SMBHeader = header::SMBHeader;
pub type SMBFlags = flags::SMBFlags;

pub use header::{SMB1_PROTOCOL_ID, SMB2_HEADER_SIZE, SMB2_PROTOCOL_ID};

/// Which side of the connection produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SMBSender {
    Client,
    Server,
}
