use nom::bytes::complete::{tag, take};
use nom::number::complete::le_u32;
use serde::{Deserialize, Serialize};

use smb_core::{SMBResult, SMBToBytes};
use smb_core::error::SMBError;

use crate::util::auth::ntlm::ntlm_message::{
    ntlm_buffer, ntlm_string, NTLM_SIGNATURE, NTLM_VERSION, NTLMNegotiateFlags, NTLMPayloadWriter,
    parse_ntlm_buffer_fields,
};

const CHALLENGE_HEADER_LEN: usize = 56;

/// AV pair id of `MsvAvTimestamp`.
const MSV_AV_TIMESTAMP: u16 = 7;
const MSV_AV_EOL: u16 = 0;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct NTLMChallengeMessageBody {
    target_name: String,
    negotiate_flags: NTLMNegotiateFlags,
    server_challenge: [u8; 8],
    target_info: Vec<u8>,
}

impl NTLMChallengeMessageBody {
    pub fn new(target_name: String, negotiate_flags: NTLMNegotiateFlags, server_challenge: [u8; 8], target_info: Vec<u8>) -> Self {
        Self {
            target_name,
            negotiate_flags,
            server_challenge,
            target_info,
        }
    }

    pub fn parse(bytes: &[u8]) -> SMBResult<Self> {
        let (remaining, _) = tag(&NTLM_SIGNATURE[..])(bytes)?;
        let (remaining, message_type) = le_u32(remaining)?;
        if message_type != 2 {
            return Err(SMBError::parse_error("Expected an NTLM CHALLENGE message"));
        }
        let (remaining, target_name_fields) = parse_ntlm_buffer_fields(remaining)?;
        let (remaining, flags) = le_u32(remaining)?;
        let (remaining, challenge) = take(8_usize)(remaining)?;
        let (remaining, _reserved) = take(8_usize)(remaining)?;
        let (_, target_info_fields) = parse_ntlm_buffer_fields(remaining)?;

        let mut server_challenge = [0; 8];
        server_challenge.copy_from_slice(challenge);
        let (_, target_info) = ntlm_buffer(bytes, target_info_fields)?;
        Ok(Self {
            target_name: ntlm_string(bytes, target_name_fields)?,
            negotiate_flags: NTLMNegotiateFlags::from_bits_truncate(flags),
            server_challenge,
            target_info: target_info.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut writer = NTLMPayloadWriter::new(CHALLENGE_HEADER_LEN);
        let target_name = writer.push_string(&self.target_name);
        let target_info = writer.push(&self.target_info);
        [
            NTLM_SIGNATURE.to_vec(),
            2_u32.smb_to_bytes(),
            target_name,
            self.negotiate_flags.bits().smb_to_bytes(),
            self.server_challenge.to_vec(),
            vec![0; 8],
            target_info,
            NTLM_VERSION.to_vec(),
            writer.into_payload(),
        ].concat()
    }

    /// The `MsvAvTimestamp` value from the target info, when the server sent one.
    pub fn timestamp(&self) -> Option<u64> {
        let mut remaining = self.target_info.as_slice();
        while remaining.len() >= 4 {
            let id = u16::from_le_bytes([remaining[0], remaining[1]]);
            let len = u16::from_le_bytes([remaining[2], remaining[3]]) as usize;
            if id == MSV_AV_EOL || remaining.len() < 4 + len {
                return None;
            }
            if id == MSV_AV_TIMESTAMP && len == 8 {
                let mut value = [0; 8];
                value.copy_from_slice(&remaining[4..12]);
                return Some(u64::from_le_bytes(value));
            }
            remaining = &remaining[4 + len..];
        }
        None
    }
}

impl NTLMChallengeMessageBody {
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn negotiate_flags(&self) -> NTLMNegotiateFlags {
        self.negotiate_flags
    }

    pub fn server_challenge(&self) -> &[u8; 8] {
        &self.server_challenge
    }

    pub fn target_info(&self) -> &[u8] {
        &self.target_info
    }
}
