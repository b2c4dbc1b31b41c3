mod flags;
mod session_setup;

pub type SMBSessionSetupRequest = session_setup::SMBSessionSetupRequest;
pub type SMBSessionSetupResponse = session_setup::SMBSessionSetupResponse;
pub type SMBSessionSetupFlags = flags::SMBSessionSetupFlags;
pub type SMBSessionFlags = flags::SMBSessionFlags;
pub type SessionSetupSecurityMode = flags::SessionSetupSecurityMode;
