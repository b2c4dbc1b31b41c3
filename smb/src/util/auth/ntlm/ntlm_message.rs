use bitflags::bitflags;
use nom::bytes::complete::{tag, take};
use nom::Err::Error;
use nom::error::ErrorKind;
use nom::IResult;
use nom::number::complete::{le_u16, le_u32};
use serde::{Deserialize, Serialize};

use smb_core::{SMBResult, SMBToBytes, SMBVecFromBytes};
use smb_core::error::SMBError;

use crate::util::auth::ntlm::{NTLMAuthenticateMessageBody, NTLMChallengeMessageBody, NTLMNegotiateMessageBody};

pub const NTLM_SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

/// Windows 7 SP1, NTLM revision 15.
pub(crate) const NTLM_VERSION: [u8; 8] = [6, 1, 0xb1, 0x1d, 0, 0, 0, 15];

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub enum NTLMMessage {
    Negotiate(NTLMNegotiateMessageBody),
    Challenge(NTLMChallengeMessageBody),
    Authenticate(NTLMAuthenticateMessageBody),
}

impl NTLMMessage {
    pub fn parse(bytes: &[u8]) -> SMBResult<Self> {
        let (_, msg_type) = Self::parse_message_type(bytes)?;
        match msg_type {
            0x01 => Ok(NTLMMessage::Negotiate(NTLMNegotiateMessageBody::parse(bytes)?)),
            0x02 => Ok(NTLMMessage::Challenge(NTLMChallengeMessageBody::parse(bytes)?)),
            0x03 => Ok(NTLMMessage::Authenticate(NTLMAuthenticateMessageBody::parse(bytes)?)),
            _ => Err(SMBError::parse_error(format!("Unknown NTLM message type {}", msg_type))),
        }
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            NTLMMessage::Negotiate(msg) => msg.as_bytes(),
            NTLMMessage::Challenge(msg) => msg.as_bytes(),
            NTLMMessage::Authenticate(msg) => msg.as_bytes(),
        }
    }

    fn parse_message_type(bytes: &[u8]) -> IResult<&[u8], u32> {
        let (remaining, _) = tag(&NTLM_SIGNATURE[..])(bytes)?;
        le_u32(remaining)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
    pub struct NTLMNegotiateFlags: u32 {
        const UNICODE_ENCODING = 0x01;
        const OEM_ENCODING = 0x02;
        const REQUEST_TARGET = 0x04;
        const SIGN = 0x10;
        const SEAL = 0x20;
        const DATAGRAM = 0x40;
        const LAN_MANAGER_SESSION_KEY = 0x80;
        const NTLM_SESSION_SECURITY = 0x200;
        const ANONYMOUS = 0x800;
        const DOMAIN_NAME_SUPPLIED = 0x1000;
        const WORKSTATION_NAME_SUPPLIED = 0x2000;
        const ALWAYS_SIGN = 0x8000;
        const TARGET_TYPE_DOMAIN = 0x10000;
        const TARGET_TYPE_SERVER = 0x20000;
        const EXTENDED_SESSION_SECURITY = 0x80000;
        const IDENTIFY = 0x100000;
        const REQUEST_LM_SESSION_KEY = 0x400000;
        const TARGET_INFO = 0x800000;
        const VERSION = 0x2000000;
        const USE_128_BIT_ENCRYPTION = 0x20000000;
        const KEY_EXCHANGE = 0x40000000;
        const USE_56_BIT_ENCRYPTION = 0x80000000;
    }
}

/// Reads a `(Len, MaxLen, BufferOffset)` field triple, returning length and offset.
pub(crate) fn parse_ntlm_buffer_fields(bytes: &[u8]) -> IResult<&[u8], (u16, u32)> {
    let (remaining, length) = le_u16(bytes)?;
    let (remaining, _max_length) = le_u16(remaining)?;
    let (remaining, buffer_offset) = le_u32(remaining)?;
    Ok((remaining, (length, buffer_offset)))
}

/// Slices the payload a buffer field triple describes out of the whole message.
pub(crate) fn ntlm_buffer(message: &[u8], (length, offset): (u16, u32)) -> IResult<&[u8], &[u8]> {
    if length == 0 {
        return Ok((message, &[]));
    }
    let (remaining, _) = take(offset as usize)(message)?;
    take(length as usize)(remaining)
}

pub(crate) fn ntlm_string(message: &[u8], fields: (u16, u32)) -> SMBResult<String> {
    let (_, bytes) = ntlm_buffer(message, fields)?;
    let (_, string) = String::smb_from_bytes_vec(bytes, bytes.len())?;
    Ok(string)
}

pub(crate) fn fail<T>(input: &[u8]) -> IResult<&[u8], T> {
    Err(Error(nom::error::Error::new(input, ErrorKind::Fail)))
}

/// Lays out the variable-length fields of an NTLM message. `push` stores the
/// data in the payload that follows the fixed header and returns the field
/// triple describing it.
pub(crate) struct NTLMPayloadWriter {
    header_len: usize,
    payload: Vec<u8>,
}

impl NTLMPayloadWriter {
    pub(crate) fn new(header_len: usize) -> Self {
        Self {
            header_len,
            payload: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, data: &[u8]) -> Vec<u8> {
        let offset = if data.is_empty() { 0 } else { self.header_len + self.payload.len() };
        self.payload.extend_from_slice(data);
        [
            (data.len() as u16).smb_to_bytes(),
            (data.len() as u16).smb_to_bytes(),
            (offset as u32).smb_to_bytes(),
        ].concat()
    }

    pub(crate) fn push_string(&mut self, data: &str) -> Vec<u8> {
        self.push(&data.to_string().smb_to_bytes())
    }

    pub(crate) fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_fields_point_into_payload() {
        let mut writer = NTLMPayloadWriter::new(40);
        let first = writer.push(b"abc");
        let second = writer.push(b"");
        let third = writer.push_string("u");
        assert_eq!(first, vec![3, 0, 3, 0, 40, 0, 0, 0]);
        assert_eq!(second, vec![0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(third, vec![2, 0, 2, 0, 43, 0, 0, 0]);
        assert_eq!(writer.into_payload(), b"abcu\0".to_vec());
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let bytes = [&NTLM_SIGNATURE[..], &[9, 0, 0, 0]].concat();
        assert!(NTLMMessage::parse(&bytes).is_err());
        assert!(NTLMMessage::parse(b"NOTNTLM\0\x01\0\0\0").is_err());
    }
}
