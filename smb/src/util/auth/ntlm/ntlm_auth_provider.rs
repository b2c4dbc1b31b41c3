use rand::RngCore;
use rand::rngs::ThreadRng;

use smb_core::logging::debug;
use smb_core::SMBResult;
use smb_core::error::SMBError;

use crate::protocol::body::FileTime;
use crate::util::auth::{AuthProvider, User};
use crate::util::auth::ntlm::{NTLMAuthenticateMessageBody, NTLMChallengeMessageBody, NTLMNegotiateFlags, NTLMNegotiateMessageBody};
use crate::util::crypto::ntlm_v2;

/// NTLMv2 client with extended session security, 128-bit keys and key exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NTLMAuthProvider {
    domain: String,
    workstation: String,
    negotiate_flags: NTLMNegotiateFlags,
    session_key: Option<Vec<u8>>,
}

impl NTLMAuthProvider {
    pub fn new<T: Into<String>, U: Into<String>>(domain: T, workstation: U) -> Self {
        Self {
            domain: domain.into(),
            workstation: workstation.into(),
            negotiate_flags: Self::client_flags(),
            session_key: None,
        }
    }

    fn client_flags() -> NTLMNegotiateFlags {
        NTLMNegotiateFlags::UNICODE_ENCODING
            | NTLMNegotiateFlags::REQUEST_TARGET
            | NTLMNegotiateFlags::SIGN
            | NTLMNegotiateFlags::NTLM_SESSION_SECURITY
            | NTLMNegotiateFlags::ALWAYS_SIGN
            | NTLMNegotiateFlags::EXTENDED_SESSION_SECURITY
            | NTLMNegotiateFlags::VERSION
            | NTLMNegotiateFlags::USE_128_BIT_ENCRYPTION
            | NTLMNegotiateFlags::KEY_EXCHANGE
            | NTLMNegotiateFlags::USE_56_BIT_ENCRYPTION
    }

    fn anonymous_authenticate(&mut self, flags: NTLMNegotiateFlags) -> NTLMAuthenticateMessageBody {
        self.session_key = None;
        NTLMAuthenticateMessageBody {
            lm_challenge_response: vec![0],
            nt_challenge_response: Vec::new(),
            domain_name: String::new(),
            user_name: String::new(),
            workstation: self.workstation.clone(),
            encrypted_random_session_key: Vec::new(),
            negotiate_flags: (flags | NTLMNegotiateFlags::ANONYMOUS) - NTLMNegotiateFlags::KEY_EXCHANGE,
        }
    }

    fn authenticate(&mut self, challenge: &NTLMChallengeMessageBody, flags: NTLMNegotiateFlags, user: &User) -> SMBResult<NTLMAuthenticateMessageBody> {
        let mut rng = ThreadRng::default();
        let mut client_challenge = [0; 8];
        rng.fill_bytes(&mut client_challenge);
        let time = challenge.timestamp().unwrap_or_else(|| FileTime::now().intervals());

        let response_key = ntlm_v2::ntowf_v2(&user.password, &user.username, &self.domain)?;
        let response = ntlm_v2::compute_response(
            &response_key,
            challenge.server_challenge(),
            &client_challenge,
            time,
            challenge.target_info(),
        )?;

        let key_exchange_key = response.session_base_key;
        let (session_key, encrypted_random_session_key) = if flags.contains(NTLMNegotiateFlags::KEY_EXCHANGE) {
            let mut exported = vec![0; 16];
            rng.fill_bytes(&mut exported);
            let encrypted = ntlm_v2::encrypt_session_key(&key_exchange_key, &exported)?;
            (exported, encrypted)
        } else {
            (key_exchange_key, Vec::new())
        };
        self.session_key = Some(session_key);

        Ok(NTLMAuthenticateMessageBody {
            lm_challenge_response: response.lm_challenge_response,
            nt_challenge_response: response.nt_challenge_response,
            domain_name: self.domain.clone(),
            user_name: user.username.clone(),
            workstation: self.workstation.clone(),
            encrypted_random_session_key,
            negotiate_flags: flags,
        })
    }
}

impl AuthProvider for NTLMAuthProvider {
    fn get_oid() -> Vec<u8> {
        vec![0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x02, 0x0a]
    }

    fn initial_token(&mut self, _user: &User) -> SMBResult<Vec<u8>> {
        self.session_key = None;
        Ok(NTLMNegotiateMessageBody::new(self.negotiate_flags).as_bytes())
    }

    fn response_token(&mut self, challenge: &[u8], user: &User) -> SMBResult<Vec<u8>> {
        let challenge = NTLMChallengeMessageBody::parse(challenge)?;
        let server_flags = challenge.negotiate_flags();
        if !server_flags.contains(NTLMNegotiateFlags::UNICODE_ENCODING) {
            return Err(SMBError::authentication_failed("Server does not support Unicode NTLM"));
        }
        let flags = (self.negotiate_flags & server_flags) | NTLMNegotiateFlags::UNICODE_ENCODING;
        debug!(target_name = challenge.target_name(), flags = flags.bits(), "received NTLM challenge");

        let message = if user.is_anonymous() {
            self.anonymous_authenticate(flags)
        } else {
            self.authenticate(&challenge, flags, user)?
        };
        Ok(message.as_bytes())
    }

    fn session_key(&self) -> Option<Vec<u8>> {
        self.session_key.clone()
    }
}
