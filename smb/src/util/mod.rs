/// Credential providers: NTLMv2 and its SPNEGO wrapping.
pub mod auth;
/// Key derivation, NTLMv2 and message signing primitives.
pub mod crypto;
pub(crate) mod flags_helper;
