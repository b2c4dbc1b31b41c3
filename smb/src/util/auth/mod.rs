pub use user::*;

use smb_core::SMBResult;

pub mod ntlm;
pub mod spnego;
mod user;

/// A client-side security mechanism driving the SESSION_SETUP token exchange.
///
/// `initial_token` produces the first token sent to the server.
/// `response_token` answers a server challenge and is called at most once per
/// session setup. Once the exchange succeeds `session_key` returns the key the
/// session signs with, if the mechanism exported one.
pub trait AuthProvider: Send {
    fn get_oid() -> Vec<u8> where Self: Sized;

    fn initial_token(&mut self, user: &User) -> SMBResult<Vec<u8>>;

    fn response_token(&mut self, challenge: &[u8], user: &User) -> SMBResult<Vec<u8>>;

    fn session_key(&self) -> Option<Vec<u8>>;
}
