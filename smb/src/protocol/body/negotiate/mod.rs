mod negotiate;
mod security_mode;

pub type SMBNegotiateRequest = negotiate::SMBNegotiateRequest;
pub type SMBNegotiateResponse = negotiate::SMBNegotiateResponse;
pub type NegotiateSecurityMode = security_mode::NegotiateSecurityMode;
