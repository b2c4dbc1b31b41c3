use serde::{Deserialize, Serialize};

use smb_core::{SMBByteSize, SMBFromBytes, SMBParseResult, SMBToBytes};
use smb_core::error::SMBError;
use smb_core::nt_status::NTStatus;

use crate::protocol::header::{SMBCommandCode, SMBFlags, SMBSender};

pub const SMB2_PROTOCOL_ID: [u8; 4] = [0xFE, b'S', b'M', b'B'];
pub const SMB1_PROTOCOL_ID: [u8; 4] = [0xFF, b'S', b'M', b'B'];
pub const SMB2_HEADER_SIZE: usize = 64;

/// The 64-byte SMB2 packet header [MS-SMB2 2.2.1]. The async form is decoded
/// into the same type: `async_id` is set and `tree_id` is zero.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct SMBHeader {
    pub credit_charge: u16,
    /// Raw NTSTATUS on responses, channel sequence on requests.
    pub status: u32,
    pub command: SMBCommandCode,
    pub credits: u16,
    pub flags: SMBFlags,
    pub next_command: u32,
    pub message_id: u64,
    pub async_id: Option<u64>,
    pub tree_id: u32,
    pub session_id: u64,
    pub signature: [u8; 16],
}

impl SMBHeader {
    pub fn request(command: SMBCommandCode, message_id: u64, tree_id: u32, session_id: u64) -> Self {
        Self {
            credit_charge: 0,
            status: 0,
            command,
            credits: 1,
            flags: SMBFlags::empty(),
            next_command: 0,
            message_id,
            async_id: None,
            tree_id,
            session_id,
            signature: [0; 16],
        }
    }

    pub fn response(command: SMBCommandCode, status: NTStatus, message_id: u64, tree_id: u32, session_id: u64) -> Self {
        Self {
            status: status as u32,
            flags: SMBFlags::SERVER_TO_REDIR,
            ..Self::request(command, message_id, tree_id, session_id)
        }
    }

    pub fn nt_status(&self) -> NTStatus {
        NTStatus::from_code(self.status)
    }

    pub fn sender(&self) -> SMBSender {
        if self.flags.contains(SMBFlags::SERVER_TO_REDIR) {
            SMBSender::Server
        } else {
            SMBSender::Client
        }
    }

    /// An interim response telling the client the real one will follow later.
    pub fn is_interim(&self) -> bool {
        self.flags.contains(SMBFlags::ASYNC_COMMAND) && self.status == NTStatus::Pending as u32
    }
}

impl SMBByteSize for SMBHeader {
    fn smb_byte_size(&self) -> usize {
        SMB2_HEADER_SIZE
    }
}

impl SMBFromBytes for SMBHeader {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        if input.len() < SMB2_HEADER_SIZE {
            return Err(SMBError::payload_too_small(SMB2_HEADER_SIZE, input.len()));
        }
        let (remaining, protocol_id) = <[u8; 4]>::smb_from_bytes(input)?;
        if protocol_id == SMB1_PROTOCOL_ID {
            return Err(SMBError::parse_error("SMB1 message where SMB2 was expected"));
        }
        if protocol_id != SMB2_PROTOCOL_ID {
            return Err(SMBError::parse_error("Invalid SMB2 protocol id"));
        }
        let (remaining, structure_size) = u16::smb_from_bytes(remaining)?;
        if structure_size as usize != SMB2_HEADER_SIZE {
            return Err(SMBError::parse_error(format!("Invalid header structure size {}", structure_size)));
        }
        let (remaining, credit_charge) = u16::smb_from_bytes(remaining)?;
        let (remaining, status) = u32::smb_from_bytes(remaining)?;
        let (remaining, command) = SMBCommandCode::smb_from_bytes(remaining)?;
        let (remaining, credits) = u16::smb_from_bytes(remaining)?;
        let (remaining, flags) = SMBFlags::smb_from_bytes(remaining)?;
        let (remaining, next_command) = u32::smb_from_bytes(remaining)?;
        let (remaining, message_id) = u64::smb_from_bytes(remaining)?;
        let (remaining, async_id, tree_id) = if flags.contains(SMBFlags::ASYNC_COMMAND) {
            let (remaining, async_id) = u64::smb_from_bytes(remaining)?;
            (remaining, Some(async_id), 0)
        } else {
            let (remaining, _reserved) = u32::smb_from_bytes(remaining)?;
            let (remaining, tree_id) = u32::smb_from_bytes(remaining)?;
            (remaining, None, tree_id)
        };
        let (remaining, session_id) = u64::smb_from_bytes(remaining)?;
        let (remaining, signature) = <[u8; 16]>::smb_from_bytes(remaining)?;
        Ok((remaining, Self {
            credit_charge,
            status,
            command,
            credits,
            flags,
            next_command,
            message_id,
            async_id,
            tree_id,
            session_id,
            signature,
        }))
    }
}

impl SMBToBytes for SMBHeader {
    fn smb_to_bytes(&self) -> Vec<u8> {
        let id_bytes = match self.async_id {
            Some(async_id) => async_id.smb_to_bytes(),
            None => [0_u32.smb_to_bytes(), self.tree_id.smb_to_bytes()].concat(),
        };
        [
            SMB2_PROTOCOL_ID.to_vec(),
            (SMB2_HEADER_SIZE as u16).smb_to_bytes(),
            self.credit_charge.smb_to_bytes(),
            self.status.smb_to_bytes(),
            self.command.smb_to_bytes(),
            self.credits.smb_to_bytes(),
            self.flags.smb_to_bytes(),
            self.next_command.smb_to_bytes(),
            self.message_id.smb_to_bytes(),
            id_bytes,
            self.session_id.smb_to_bytes(),
            self.signature.to_vec(),
        ].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_connect_response_bytes() -> Vec<u8> {
        let mut bytes = vec![
            0xFE, b'S', b'M', b'B', // protocol id
            0x40, 0x00, // structure size
            0x01, 0x00, // credit charge
            0x00, 0x00, 0x00, 0x00, // status
            0x03, 0x00, // tree connect
            0x01, 0x00, // credits granted
            0x01, 0x00, 0x00, 0x00, // flags: server to redir
            0x00, 0x00, 0x00, 0x00, // next command
            0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // message id
            0xFF, 0xFE, 0x00, 0x00, // reserved
            0x05, 0x00, 0x00, 0x00, // tree id
            0x11, 0x22, 0x33, 0x44, 0x00, 0x00, 0x00, 0x00, // session id
        ];
        bytes.extend_from_slice(&[0; 16]);
        bytes
    }

    /// MS-SMB2 2.2.1.2: SMB2 Packet Header - SYNC
    #[test]
    fn parses_sync_response_header() {
        let bytes = tree_connect_response_bytes();
        let (remaining, header) = SMBHeader::smb_from_bytes(&bytes).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(header.command, SMBCommandCode::TreeConnect);
        assert_eq!(header.message_id, 4);
        assert_eq!(header.tree_id, 5);
        assert_eq!(header.session_id, 0x44332211);
        assert_eq!(header.async_id, None);
        assert!(matches!(header.sender(), SMBSender::Server));
        assert_eq!(header.nt_status(), NTStatus::StatusSuccess);
    }

    /// MS-SMB2 2.2.1.1: SMB2 Packet Header - ASYNC
    #[test]
    fn parses_async_interim_header() {
        let mut bytes = tree_connect_response_bytes();
        bytes[8..12].copy_from_slice(&(NTStatus::Pending as u32).to_le_bytes());
        bytes[16] = 0x03;
        bytes[32..40].copy_from_slice(&0x99_u64.to_le_bytes());
        let (_, header) = SMBHeader::smb_from_bytes(&bytes).unwrap();
        assert_eq!(header.async_id, Some(0x99));
        assert_eq!(header.tree_id, 0);
        assert!(header.is_interim());
        assert_eq!(header.smb_to_bytes(), bytes);
    }

    #[test]
    fn request_header_layout() {
        let header = SMBHeader::request(SMBCommandCode::Create, 7, 3, 0xABCD);
        let bytes = header.smb_to_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[0..4], &SMB2_PROTOCOL_ID);
        assert_eq!(&bytes[12..14], &[0x05, 0x00]);
        assert_eq!(&bytes[24..32], &7_u64.to_le_bytes());
        assert_eq!(&bytes[36..40], &3_u32.to_le_bytes());
        assert_eq!(&bytes[40..48], &0xABCD_u64.to_le_bytes());
        let (_, parsed) = SMBHeader::smb_from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn rejects_bad_magic_and_size() {
        let mut bytes = tree_connect_response_bytes();
        bytes[0] = 0xFF;
        assert!(matches!(SMBHeader::smb_from_bytes(&bytes), Err(SMBError::ParseError(_))));
        let mut bytes = tree_connect_response_bytes();
        bytes[4] = 0x41;
        assert!(SMBHeader::smb_from_bytes(&bytes).is_err());
        assert!(matches!(SMBHeader::smb_from_bytes(&bytes[..40]), Err(SMBError::PayloadTooSmall(_))));
    }
}
