use smb_core::logging::debug;
use smb_core::SMBResult;
use smb_core::error::SMBError;

use crate::util::auth::{AuthProvider, User};
use crate::util::auth::spnego::{NegotiateState, SPNEGO_ID, SPNEGOToken, SPNEGOTokenInitBody, SPNEGOTokenResponseBody};

/// Wraps the tokens of an inner mechanism in SPNEGO, the form SESSION_SETUP
/// security buffers take.
#[derive(Debug, Clone)]
pub struct SPNEGOAuthProvider<A: AuthProvider> {
    inner: A,
}

impl<A: AuthProvider> SPNEGOAuthProvider<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: AuthProvider> AuthProvider for SPNEGOAuthProvider<A> {
    fn get_oid() -> Vec<u8> {
        SPNEGO_ID.to_vec()
    }

    fn initial_token(&mut self, user: &User) -> SMBResult<Vec<u8>> {
        let mech_token = self.inner.initial_token(user)?;
        let token = SPNEGOToken::Init(SPNEGOTokenInitBody::new(A::get_oid(), mech_token));
        Ok(token.as_bytes(true))
    }

    fn response_token(&mut self, challenge: &[u8], user: &User) -> SMBResult<Vec<u8>> {
        let (_, token) = SPNEGOToken::parse(challenge)?;
        let SPNEGOToken::Response(response) = token else {
            return Err(SMBError::authentication_failed("Expected a SPNEGO response token"));
        };
        debug!(state = ?response.state, "received SPNEGO response");
        if response.state == Some(NegotiateState::Reject) {
            return Err(SMBError::authentication_failed("Server rejected the security mechanism"));
        }
        if let Some(mech) = &response.supported_mech {
            if *mech != A::get_oid() {
                return Err(SMBError::authentication_failed("Server selected an unsupported security mechanism"));
            }
        }
        let mech_challenge = response.response_token
            .ok_or_else(|| SMBError::authentication_failed("SPNEGO response carried no challenge"))?;
        let mech_response = self.inner.response_token(&mech_challenge, user)?;
        Ok(SPNEGOToken::Response(SPNEGOTokenResponseBody::new(mech_response)).as_bytes(false))
    }

    fn session_key(&self) -> Option<Vec<u8>> {
        self.inner.session_key()
    }
}
