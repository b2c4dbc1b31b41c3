mod der;
mod spnego_auth_provider;
mod spnego_token;
mod spnego_token_init;
mod spnego_token_response;

pub use der::SPNEGO_ID;

pub type SPNEGOAuthProvider<A> = spnego_auth_provider::SPNEGOAuthProvider<A>;
pub type SPNEGOToken = spnego_token::SPNEGOToken;
pub type SPNEGOTokenInitBody = spnego_token_init::SPNEGOTokenInitBody;
pub type SPNEGOTokenResponseBody = spnego_token_response::SPNEGOTokenResponseBody;
pub type NegotiateState = spnego_token_response::NegotiateState;
