use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::protocol::body::SMBDialect;
use crate::socket::netbios::is_netbios_name;

pub const DEFAULT_PORT: u16 = 139;
pub const DEFAULT_SHARE: &str = "microSD";
pub const DEFAULT_CLIENT_NAME: &str = "3DSCLIENT";
pub const DEFAULT_SERVER_NAME: &str = "*SMBSERVER";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_CHUNK_SIZE: u32 = 65536;
/// Largest READ or WRITE a single credit pays for. Requests are sent with a
/// credit charge of 1, so chunks never exceed this.
pub const MAX_CREDIT_CHUNK_SIZE: u32 = 65536;

/// Connection settings for [`SMBClient`](crate::client::SMBClient).
///
/// ```
/// use smb_client::client::SMBClientConfig;
///
/// let config = SMBClientConfig::builder()
///     .host("192.168.1.20")
///     .share("microSD")
///     .build()
///     .unwrap();
/// assert_eq!(config.port, 139);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SMBClientConfig {
    pub host: String,
    pub port: u16,
    pub share: String,
    /// NetBIOS name the client calls itself, also sent as the NTLM workstation.
    pub client_name: String,
    /// NetBIOS name of the server for the session request. Empty means the
    /// host when it is a NetBIOS name, `*SMBSERVER` otherwise.
    pub server_name: String,
    /// Resolve a host that is a bare NetBIOS name with a broadcast name
    /// query before falling back to DNS.
    pub name_query: bool,
    /// Open a NetBIOS session before negotiating, as port 139 requires.
    pub netbios_session: bool,
    pub timeout: Duration,
    pub dialects: Vec<SMBDialect>,
    pub require_signing: bool,
    /// Upper bound on the bytes moved by one READ or WRITE, at most
    /// [`MAX_CREDIT_CHUNK_SIZE`].
    pub max_chunk_size: u32,
    pub domain: String,
}

impl Default for SMBClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            share: DEFAULT_SHARE.into(),
            client_name: DEFAULT_CLIENT_NAME.into(),
            server_name: String::new(),
            name_query: true,
            netbios_session: true,
            timeout: DEFAULT_TIMEOUT,
            dialects: SMBDialect::SUPPORTED.to_vec(),
            require_signing: false,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            domain: String::new(),
        }
    }
}

impl SMBClientConfig {
    pub fn builder() -> SMBClientConfigBuilder {
        SMBClientConfigBuilder::default()
    }

    /// The name called in the NetBIOS session request.
    pub fn called_name(&self) -> &str {
        if !self.server_name.is_empty() {
            &self.server_name
        } else if is_netbios_name(&self.host) {
            &self.host
        } else {
            DEFAULT_SERVER_NAME
        }
    }
}

impl SMBClientConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.host.as_ref().map_or(true, String::is_empty) {
            return Err("host must be set".into());
        }
        if self.dialects.as_ref().map_or(false, Vec::is_empty) {
            return Err("at least one dialect must be offered".into());
        }
        match self.max_chunk_size {
            Some(0) => return Err("max_chunk_size must be positive".into()),
            Some(size) if size > MAX_CREDIT_CHUNK_SIZE => {
                return Err(format!("max_chunk_size {} exceeds the {} bytes one credit covers", size, MAX_CREDIT_CHUNK_SIZE));
            }
            _ => {}
        }
        Ok(())
    }
}
