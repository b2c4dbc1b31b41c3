pub mod ntlm_v2;
pub mod smb2;
pub mod sp800_108;
