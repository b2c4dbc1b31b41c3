use nom::bytes::complete::tag;
use nom::number::complete::le_u32;
use serde::{Deserialize, Serialize};

use smb_core::{SMBResult, SMBToBytes};
use smb_core::error::SMBError;

use crate::util::auth::ntlm::ntlm_message::{
    ntlm_buffer, ntlm_string, NTLM_SIGNATURE, NTLM_VERSION, NTLMNegotiateFlags, NTLMPayloadWriter,
    parse_ntlm_buffer_fields,
};

const AUTHENTICATE_HEADER_LEN: usize = 72;

/// NTLM AUTHENTICATE_MESSAGE [MS-NLMP 2.2.1.3], sent without a MIC.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone)]
pub struct NTLMAuthenticateMessageBody {
    pub lm_challenge_response: Vec<u8>,
    pub nt_challenge_response: Vec<u8>,
    pub domain_name: String,
    pub user_name: String,
    pub workstation: String,
    pub encrypted_random_session_key: Vec<u8>,
    pub negotiate_flags: NTLMNegotiateFlags,
}

impl NTLMAuthenticateMessageBody {
    pub fn parse(bytes: &[u8]) -> SMBResult<Self> {
        let (remaining, _) = tag(&NTLM_SIGNATURE[..])(bytes)?;
        let (remaining, message_type) = le_u32(remaining)?;
        if message_type != 3 {
            return Err(SMBError::parse_error("Expected an NTLM AUTHENTICATE message"));
        }
        let (remaining, lm_fields) = parse_ntlm_buffer_fields(remaining)?;
        let (remaining, nt_fields) = parse_ntlm_buffer_fields(remaining)?;
        let (remaining, domain_fields) = parse_ntlm_buffer_fields(remaining)?;
        let (remaining, user_fields) = parse_ntlm_buffer_fields(remaining)?;
        let (remaining, workstation_fields) = parse_ntlm_buffer_fields(remaining)?;
        let (remaining, session_key_fields) = parse_ntlm_buffer_fields(remaining)?;
        let (_, flags) = le_u32(remaining)?;

        let (_, lm_challenge_response) = ntlm_buffer(bytes, lm_fields)?;
        let (_, nt_challenge_response) = ntlm_buffer(bytes, nt_fields)?;
        let (_, encrypted_random_session_key) = ntlm_buffer(bytes, session_key_fields)?;
        Ok(Self {
            lm_challenge_response: lm_challenge_response.to_vec(),
            nt_challenge_response: nt_challenge_response.to_vec(),
            domain_name: ntlm_string(bytes, domain_fields)?,
            user_name: ntlm_string(bytes, user_fields)?,
            workstation: ntlm_string(bytes, workstation_fields)?,
            encrypted_random_session_key: encrypted_random_session_key.to_vec(),
            negotiate_flags: NTLMNegotiateFlags::from_bits_truncate(flags),
        })
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut writer = NTLMPayloadWriter::new(AUTHENTICATE_HEADER_LEN);
        let domain = writer.push_string(&self.domain_name);
        let user = writer.push_string(&self.user_name);
        let workstation = writer.push_string(&self.workstation);
        let lm = writer.push(&self.lm_challenge_response);
        let nt = writer.push(&self.nt_challenge_response);
        let session_key = writer.push(&self.encrypted_random_session_key);
        [
            NTLM_SIGNATURE.to_vec(),
            3_u32.smb_to_bytes(),
            lm,
            nt,
            domain,
            user,
            workstation,
            session_key,
            self.negotiate_flags.bits().smb_to_bytes(),
            NTLM_VERSION.to_vec(),
            writer.into_payload(),
        ].concat()
    }

    pub fn is_anonymous(&self) -> bool {
        self.negotiate_flags.contains(NTLMNegotiateFlags::ANONYMOUS)
            || (self.user_name.is_empty() && self.nt_challenge_response.is_empty())
    }
}
