mod ntlm_auth_provider;
mod ntlm_message;
mod ntlm_negotiate_message;
mod ntlm_challenge_message;
mod ntlm_authenticate_message;

pub use ntlm_message::NTLM_SIGNATURE;

pub type NTLMAuthProvider = ntlm_auth_provider::NTLMAuthProvider;
pub type NTLMMessage = ntlm_message::NTLMMessage;
pub type NTLMNegotiateFlags = ntlm_message::NTLMNegotiateFlags;
pub type NTLMNegotiateMessageBody = ntlm_negotiate_message::NTLMNegotiateMessageBody;
pub type NTLMChallengeMessageBody = ntlm_challenge_message::NTLMChallengeMessageBody;
pub type NTLMAuthenticateMessageBody = ntlm_authenticate_message::NTLMAuthenticateMessageBody;
