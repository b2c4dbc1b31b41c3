use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::protocol::body::{Capabilities, SMBDialect};
use crate::protocol::body::negotiate::NegotiateSecurityMode;

/// A snapshot of what a client negotiated, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub server: String,
    pub dialect: SMBDialect,
    pub server_guid: Uuid,
    pub security_mode: NegotiateSecurityMode,
    pub capabilities: Capabilities,
    pub max_transact_size: u32,
    pub max_read_size: u32,
    pub max_write_size: u32,
    pub signing: bool,
    pub session_id: u64,
    pub tree_id: Option<u32>,
    pub share: Option<String>,
}

impl Display for ConnectionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "server:        {}", self.server)?;
        writeln!(f, "dialect:       {:?}", self.dialect)?;
        writeln!(f, "server guid:   {}", self.server_guid)?;
        writeln!(f, "security mode: {:?}", self.security_mode)?;
        writeln!(f, "capabilities:  {:?}", self.capabilities)?;
        writeln!(f, "max sizes:     transact {} read {} write {}", self.max_transact_size, self.max_read_size, self.max_write_size)?;
        writeln!(f, "signing:       {}", if self.signing { "on" } else { "off" })?;
        writeln!(f, "session id:    0x{:016x}", self.session_id)?;
        match (&self.share, self.tree_id) {
            (Some(share), Some(tree_id)) => write!(f, "share:         {} (tree 0x{:08x})", share, tree_id),
            _ => write!(f, "share:         none"),
        }
    }
}
