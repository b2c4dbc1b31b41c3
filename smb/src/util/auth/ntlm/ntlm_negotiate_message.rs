use nom::bytes::complete::tag;
use nom::number::complete::le_u32;
use serde::{Deserialize, Serialize};

use smb_core::{SMBResult, SMBToBytes};

use crate::util::auth::ntlm::ntlm_message::{NTLM_SIGNATURE, NTLM_VERSION, NTLMNegotiateFlags, parse_ntlm_buffer_fields};

const NEGOTIATE_HEADER_LEN: u32 = 40;

/// NTLM NEGOTIATE_MESSAGE [MS-NLMP 2.2.1.1]. The client never supplies a
/// domain or workstation here so both fields stay empty.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct NTLMNegotiateMessageBody {
    negotiate_flags: NTLMNegotiateFlags,
}

impl NTLMNegotiateMessageBody {
    pub fn new(negotiate_flags: NTLMNegotiateFlags) -> Self {
        Self { negotiate_flags }
    }

    pub fn negotiate_flags(&self) -> NTLMNegotiateFlags {
        self.negotiate_flags
    }

    pub fn parse(bytes: &[u8]) -> SMBResult<Self> {
        let (remaining, _) = tag(&NTLM_SIGNATURE[..])(bytes)?;
        let (remaining, _message_type) = le_u32(remaining)?;
        let (remaining, flags) = le_u32(remaining)?;
        let (remaining, _domain) = parse_ntlm_buffer_fields(remaining)?;
        let (_, _workstation) = parse_ntlm_buffer_fields(remaining)?;
        Ok(Self {
            negotiate_flags: NTLMNegotiateFlags::from_bits_truncate(flags),
        })
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let empty_field = [0_u16.smb_to_bytes(), 0_u16.smb_to_bytes(), NEGOTIATE_HEADER_LEN.smb_to_bytes()].concat();
        [
            NTLM_SIGNATURE.to_vec(),
            1_u32.smb_to_bytes(),
            self.negotiate_flags.bits().smb_to_bytes(),
            empty_field.clone(),
            empty_field,
            NTLM_VERSION.to_vec(),
        ].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiate_layout() {
        let flags = NTLMNegotiateFlags::UNICODE_ENCODING | NTLMNegotiateFlags::NTLM_SESSION_SECURITY;
        let bytes = NTLMNegotiateMessageBody::new(flags).as_bytes();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[0..8], b"NTLMSSP\0");
        assert_eq!(&bytes[8..12], &[1, 0, 0, 0]);
        assert_eq!(&bytes[12..16], &[0x01, 0x02, 0, 0]);
        assert_eq!(&bytes[20..24], &[40, 0, 0, 0]);
        assert_eq!(NTLMNegotiateMessageBody::parse(&bytes).unwrap().negotiate_flags(), flags);
    }
}
