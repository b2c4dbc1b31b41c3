mod action;
mod create;
mod disposition;
mod file_attributes;
mod file_id;
mod impersonation_level;
mod oplock;
mod options;
mod share_access;

pub type SMBCreateAction = action::SMBCreateAction;
pub type SMBCreateDisposition = disposition::SMBCreateDisposition;
pub type SMBCreateOptions = options::SMBCreateOptions;
pub type SMBCreateRequest = create::SMBCreateRequest;
pub type SMBCreateResponse = create::SMBCreateResponse;
pub type SMBFileAttributes = file_attributes::SMBFileAttributes;
pub type SMBFileId = file_id::SMBFileId;
pub type SMBImpersonationLevel = impersonation_level::SMBImpersonationLevel;
pub type SMBOplockLevel = oplock::SMBOplockLevel;
pub type SMBShareAccess = share_access::SMBShareAccess;
