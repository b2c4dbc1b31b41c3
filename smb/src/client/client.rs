use std::net::TcpStream;

use uuid::Uuid;

use smb_core::error::SMBError;
use smb_core::logging::{debug, error, info, trace, warn};
use smb_core::nt_status::NTStatus;
use smb_core::{SMBFromBytes, SMBResult};

use crate::client::config::{MAX_CREDIT_CHUNK_SIZE, SMBClientConfig};
use crate::client::connection_info::ConnectionInfo;
use crate::client::path::unc_path;
use crate::client::request::{SMBRequestTracker, UNSOLICITED_MESSAGE_ID};
use crate::client::session::{SMBServerParameters, SMBSession, SMBSessionState};
use crate::client::tree_connect::SMBTreeConnect;
use crate::protocol::body::negotiate::{NegotiateSecurityMode, SMBNegotiateRequest};
use crate::protocol::body::session_setup::{SessionSetupSecurityMode, SMBSessionFlags, SMBSessionSetupRequest};
use crate::protocol::body::tree_connect::{SMBShareFlags, SMBShareType, SMBTreeConnectRequest};
use crate::protocol::body::{SMBBody, SMBEmpty};
use crate::protocol::header::{SMBCommandCode, SMBFlags, SMBHeader, SMBSender};
use crate::protocol::message::{is_legacy_message, verify_signature, SMBMessage};
use crate::socket::netbios::{self, is_netbios_name, NetBIOSName};
use crate::socket::{SMBSocketConnection, SMBTransport};
use crate::util::auth::ntlm::NTLMAuthProvider;
use crate::util::auth::spnego::SPNEGOAuthProvider;
use crate::util::auth::{AuthProvider, User};
use crate::util::crypto::smb2::SMBSigningKey;

/// SESSION_SETUP exchanges allowed before authentication is abandoned.
pub const MAX_AUTH_ROUNDS: usize = 2;

const CREDITS_REQUESTED: u16 = 8;

/// An SMB2 client session: one connection, one authenticated user and at
/// most one connected share.
///
/// Every operation is a method on the client and runs to completion before
/// returning. Lazy results such as directory listings borrow the client
/// mutably, so nothing else can be issued while one is alive.
///
/// ```no_run
/// use smb_client::client::{SMBClient, SMBClientConfig};
/// use smb_client::util::auth::User;
///
/// # fn main() -> smb_core::SMBResult<()> {
/// let config = SMBClientConfig::builder()
///     .host("192.168.1.20")
///     .build()
///     .map_err(|e| smb_core::error::SMBError::protocol_error(e.to_string()))?;
/// let mut client = SMBClient::connect(config, User::new("guest", ""))?;
/// for entry in client.list_directory("/")? {
///     println!("{}", entry?.name);
/// }
/// client.disconnect();
/// # Ok(())
/// # }
/// ```
pub struct SMBClient<T: SMBTransport = SMBSocketConnection<TcpStream, TcpStream>> {
    config: SMBClientConfig,
    user: User,
    transport: T,
    auth_provider: Box<dyn AuthProvider>,
    state: SMBSessionState,
    requests: SMBRequestTracker,
    client_guid: Uuid,
    server: Option<SMBServerParameters>,
    session: SMBSession,
    tree: Option<SMBTreeConnect>,
}

impl SMBClient {
    /// Opens a TCP connection to the configured server, runs the NetBIOS
    /// session handshake when configured, then negotiates, authenticates and
    /// connects to the configured share.
    pub fn connect(config: SMBClientConfig, user: User) -> SMBResult<Self> {
        info!(host = config.host.as_str(), port = config.port, "connecting");
        let address = resolve_host(&config);
        let mut connection = SMBSocketConnection::connect(&address, config.port, config.timeout)?;
        if config.netbios_session {
            let called = NetBIOSName::server(config.called_name());
            let calling = NetBIOSName::workstation(config.client_name.as_str());
            connection.request_session(&called, &calling)?;
        }
        Self::connect_with_transport(config, user, connection)
    }
}

/// The address to open a connection to: a NetBIOS name answered by a
/// name query, otherwise the host as configured for DNS.
fn resolve_host(config: &SMBClientConfig) -> String {
    if !config.name_query || !is_netbios_name(&config.host) {
        return config.host.clone();
    }
    match netbios::resolve_name(&config.host, config.timeout) {
        Ok(address) => address.to_string(),
        Err(e) => {
            debug!(host = config.host.as_str(), error = %e, "name query failed, trying DNS");
            config.host.clone()
        }
    }
}

impl<T: SMBTransport> SMBClient<T> {
    /// A client over `transport` that has not sent anything yet. The
    /// credential provider is NTLMv2 inside SPNEGO.
    pub fn new(config: SMBClientConfig, user: User, transport: T) -> Self {
        let provider = SPNEGOAuthProvider::new(NTLMAuthProvider::new(config.domain.as_str(), config.client_name.as_str()));
        Self::with_auth_provider(config, user, transport, Box::new(provider))
    }

    pub fn with_auth_provider(config: SMBClientConfig, user: User, transport: T, auth_provider: Box<dyn AuthProvider>) -> Self {
        Self {
            config,
            user,
            transport,
            auth_provider,
            state: SMBSessionState::Disconnected,
            requests: SMBRequestTracker::new(),
            client_guid: Uuid::new_v4(),
            server: None,
            session: SMBSession::new(0),
            tree: None,
        }
    }

    /// Runs the whole setup sequence over an already connected transport.
    pub fn connect_with_transport(config: SMBClientConfig, user: User, transport: T) -> SMBResult<Self> {
        let mut client = Self::new(config, user, transport);
        client.start_session()?;
        let share = client.config.share.clone();
        client.tree_connect(&share)?;
        Ok(client)
    }

    /// [`Self::connect_with_transport`] with a caller-supplied credential provider.
    pub fn connect_with_provider(config: SMBClientConfig, user: User, transport: T, auth_provider: Box<dyn AuthProvider>) -> SMBResult<Self> {
        let mut client = Self::with_auth_provider(config, user, transport, auth_provider);
        client.start_session()?;
        let share = client.config.share.clone();
        client.tree_connect(&share)?;
        Ok(client)
    }

    /// Negotiates and authenticates, leaving the session `Authenticated`.
    pub fn start_session(&mut self) -> SMBResult<()> {
        self.negotiate()?;
        self.authenticate()
    }

    pub fn state(&self) -> SMBSessionState {
        self.state
    }

    pub fn config(&self) -> &SMBClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SMBSession {
        &self.session
    }

    pub fn server_parameters(&self) -> Option<&SMBServerParameters> {
        self.server.as_ref()
    }

    pub fn tree(&self) -> Option<&SMBTreeConnect> {
        self.tree.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends NEGOTIATE with the configured dialects and records what the
    /// server picked.
    pub fn negotiate(&mut self) -> SMBResult<()> {
        if self.state != SMBSessionState::Disconnected {
            return Err(SMBError::negotiation_failed(format!("session is already {:?}", self.state)));
        }
        self.state = SMBSessionState::Negotiating;
        match self.negotiate_dialect() {
            Ok(server) => {
                info!(dialect = ?server.dialect, signing_required = server.signing_required(), "negotiated dialect");
                self.server = Some(server);
                Ok(())
            }
            Err(e) => {
                let e = match e {
                    e @ (SMBError::ConnectionLost(_) | SMBError::Timeout(_) | SMBError::NegotiationFailed(_)) => e,
                    other => SMBError::negotiation_failed(other.to_string()),
                };
                error!(error = %e, "negotiation failed");
                self.close_transport();
                Err(e)
            }
        }
    }

    fn negotiate_dialect(&mut self) -> SMBResult<SMBServerParameters> {
        let mut security_mode = NegotiateSecurityMode::NEGOTIATE_SIGNING_ENABLED;
        if self.config.require_signing {
            security_mode |= NegotiateSecurityMode::NEGOTIATE_SIGNING_REQUIRED;
        }
        let request = SMBNegotiateRequest::new(security_mode, self.client_guid, self.config.dialects.clone());
        let response = self.exchange(SMBCommandCode::Negotiate, SMBBody::NegotiateRequest(request))?;
        let status = response.header.nt_status();
        match response.body {
            SMBBody::NegotiateResponse(body) if response.header.status == NTStatus::StatusSuccess as u32 => {
                if !self.config.dialects.contains(&body.dialect) {
                    return Err(SMBError::negotiation_failed(format!("server chose {:?}, which was not offered", body.dialect)));
                }
                Ok(SMBServerParameters::from(&body))
            }
            _ => Err(SMBError::negotiation_failed(format!("server returned {:?}", status))),
        }
    }

    /// Runs SESSION_SETUP until the server accepts or rejects the
    /// credentials, at most [`MAX_AUTH_ROUNDS`] times.
    pub fn authenticate(&mut self) -> SMBResult<()> {
        if self.state != SMBSessionState::Negotiating || self.server.is_none() {
            return Err(SMBError::not_connected(format!("cannot authenticate a session that is {:?}", self.state)));
        }
        self.state = SMBSessionState::Authenticating;
        match self.session_setup() {
            Ok(()) => {
                info!(session_id = self.session.session_id(), signed = self.session.signing_key().is_some(), "authenticated");
                self.state = SMBSessionState::Authenticated;
                Ok(())
            }
            Err(e) => {
                let e = match e {
                    e @ (SMBError::ConnectionLost(_) | SMBError::Timeout(_) | SMBError::AuthenticationFailed(_)) => e,
                    other => SMBError::authentication_failed(other.to_string()),
                };
                error!(error = %e, "authentication failed");
                self.close_transport();
                Err(e)
            }
        }
    }

    fn session_setup(&mut self) -> SMBResult<()> {
        let mut security_mode = SessionSetupSecurityMode::SIGNING_ENABLED;
        if self.config.require_signing {
            security_mode |= SessionSetupSecurityMode::SIGNING_REQUIRED;
        }
        let mut token = self.auth_provider.initial_token(&self.user)?;
        for round in 1..=MAX_AUTH_ROUNDS {
            let request = SMBSessionSetupRequest::new(security_mode, token);
            let response = self.exchange(SMBCommandCode::SessionSetup, SMBBody::SessionSetupRequest(request))?;
            let status = response.header.nt_status();
            debug!(round, status = ?status, "session setup response");
            match (status, response.body) {
                (NTStatus::StatusSuccess, SMBBody::SessionSetupResponse(body)) => {
                    return self.complete_session(response.header.session_id, body.session_flags);
                }
                (NTStatus::MoreProcessingRequired, SMBBody::SessionSetupResponse(body)) => {
                    if round == MAX_AUTH_ROUNDS {
                        break;
                    }
                    self.session.challenge_issued(response.header.session_id);
                    token = self.auth_provider.response_token(&body.buffer, &self.user)?;
                }
                (status, _) => {
                    return Err(SMBError::authentication_failed(format!("server returned {:?} (0x{:08X})", status, response.header.status)));
                }
            }
        }
        Err(SMBError::authentication_failed(format!("no result after {} rounds", MAX_AUTH_ROUNDS)))
    }

    fn complete_session(&mut self, session_id: u64, flags: SMBSessionFlags) -> SMBResult<()> {
        if flags.contains(SMBSessionFlags::ENCRYPT_DATA) {
            return Err(SMBError::authentication_failed("server requires encryption"));
        }
        let server = self.server.as_ref()
            .ok_or_else(|| SMBError::not_connected("no negotiated dialect"))?;
        let session_key = self.auth_provider.session_key();
        let is_guest = flags.intersects(SMBSessionFlags::IS_GUEST | SMBSessionFlags::IS_NULL);
        let wants_signing = self.config.require_signing || server.signing_required();
        let signing_key = match &session_key {
            Some(key) if wants_signing && !is_guest => Some(SMBSigningKey::derive(key, server.dialect)?),
            _ if self.config.require_signing => {
                return Err(SMBError::authentication_failed("signing required but the session has no key"));
            }
            _ => None,
        };
        self.session.authenticated(session_id, flags, session_key, signing_key);
        Ok(())
    }

    /// Connects to `share` on the configured host. A failure leaves the
    /// session `Authenticated` so another share can be tried.
    pub fn tree_connect(&mut self, share: &str) -> SMBResult<()> {
        if self.state == SMBSessionState::TreeConnected {
            self.tree_disconnect()?;
        }
        if self.state != SMBSessionState::Authenticated {
            return Err(SMBError::not_connected(format!("cannot connect to a share while {:?}", self.state)));
        }
        let path = unc_path(&self.config.host, share);
        let request = SMBTreeConnectRequest::new(path.as_str());
        let response = self.exchange(SMBCommandCode::TreeConnect, SMBBody::TreeConnectRequest(request))?;
        let status = response.header.nt_status();
        let tree_id = response.header.tree_id;
        let body = match response.body {
            SMBBody::TreeConnectResponse(body) if status == NTStatus::StatusSuccess => body,
            _ => return Err(SMBError::share_connect_error(share, status)),
        };
        if body.share_type != SMBShareType::Disk || body.share_flags.contains(SMBShareFlags::ENCRYPT_DATA) {
            warn!(share, share_type = ?body.share_type, "share is not a plain disk share");
            if let Err(e) = self.exchange_on_tree(SMBCommandCode::TreeDisconnect, SMBBody::TreeDisconnectRequest(SMBEmpty), tree_id) {
                warn!(error = %e, "failed to disconnect rejected share");
            }
            return Err(SMBError::share_connect_error(share, NTStatus::StatusNotSupported));
        }
        info!(share, tree_id, "connected to share");
        self.tree = Some(SMBTreeConnect::init(share.to_string(), path, tree_id, &body));
        self.state = SMBSessionState::TreeConnected;
        Ok(())
    }

    /// Leaves the connected share. Does nothing when none is connected.
    pub fn tree_disconnect(&mut self) -> SMBResult<()> {
        let Some(tree) = self.tree.as_ref() else {
            return Ok(());
        };
        let tree_id = tree.tree_id();
        let result = self.exchange_on_tree(SMBCommandCode::TreeDisconnect, SMBBody::TreeDisconnectRequest(SMBEmpty), tree_id);
        self.tree = None;
        if self.state == SMBSessionState::TreeConnected {
            self.state = SMBSessionState::Authenticated;
        }
        let response = result?;
        expect_success(&response)?;
        debug!(tree_id, "disconnected from share");
        Ok(())
    }

    fn logoff(&mut self) -> SMBResult<()> {
        let response = self.exchange(SMBCommandCode::LogOff, SMBBody::LogoffRequest(SMBEmpty))?;
        expect_success(&response)
    }

    /// Leaves the share, logs off and closes the transport. Failures along
    /// the way are logged and the session still ends `Closed`.
    pub fn disconnect(&mut self) {
        if self.state == SMBSessionState::Closed {
            return;
        }
        if self.tree.is_some() {
            if let Err(e) = self.tree_disconnect() {
                warn!(error = %e, "tree disconnect failed during teardown");
            }
        }
        if self.state.is_authenticated() {
            if let Err(e) = self.logoff() {
                warn!(error = %e, "logoff failed during teardown");
            }
        }
        self.close_transport();
        info!("disconnected");
    }

    /// ECHO round trip, usable as a liveness check.
    pub fn echo(&mut self) -> SMBResult<()> {
        let response = self.exchange(SMBCommandCode::Echo, SMBBody::EchoRequest(SMBEmpty))?;
        expect_success(&response)
    }

    /// `None` until a dialect has been negotiated.
    pub fn connection_info(&self) -> Option<ConnectionInfo> {
        let server = self.server.as_ref()?;
        Some(ConnectionInfo {
            server: format!("{}:{}", self.config.host, self.config.port),
            dialect: server.dialect,
            server_guid: server.guid,
            security_mode: server.security_mode,
            capabilities: server.capabilities,
            max_transact_size: server.max_transact_size,
            max_read_size: server.max_read_size,
            max_write_size: server.max_write_size,
            signing: self.session.signing_key().is_some(),
            session_id: self.session.session_id(),
            tree_id: self.tree.as_ref().map(SMBTreeConnect::tree_id),
            share: self.tree.as_ref().map(|tree| tree.share().to_string()),
        })
    }

    /// Fails with `NotConnected` unless a share is connected.
    pub(crate) fn require_tree(&self) -> SMBResult<()> {
        if self.state == SMBSessionState::TreeConnected {
            Ok(())
        } else {
            Err(SMBError::not_connected(format!("no share connected (session is {:?})", self.state)))
        }
    }

    /// Bytes moved by one READ: the server's limit capped by the configured
    /// chunk size.
    pub(crate) fn read_chunk_size(&self) -> u32 {
        let server_max = self.server.as_ref().map_or(self.config.max_chunk_size, |server| server.max_read_size);
        self.credit_chunk_size(server_max)
    }

    pub(crate) fn write_chunk_size(&self) -> u32 {
        let server_max = self.server.as_ref().map_or(self.config.max_chunk_size, |server| server.max_write_size);
        self.credit_chunk_size(server_max)
    }

    /// Never more than one credit covers, even for configs built without validation.
    fn credit_chunk_size(&self, server_max: u32) -> u32 {
        server_max.min(self.config.max_chunk_size).min(MAX_CREDIT_CHUNK_SIZE).max(1)
    }

    pub(crate) fn query_buffer_size(&self) -> u32 {
        let server_max = self.server.as_ref().map_or(self.config.max_chunk_size, |server| server.max_transact_size);
        server_max.min(self.config.max_chunk_size).max(1)
    }

    /// Sends one request and waits for its response. Error statuses come
    /// back as responses; only transport, codec and correlation failures
    /// are errors here.
    pub(crate) fn exchange(&mut self, command: SMBCommandCode, body: SMBBody) -> SMBResult<SMBMessage> {
        let tree_id = self.tree.as_ref().map_or(0, SMBTreeConnect::tree_id);
        self.exchange_on_tree(command, body, tree_id)
    }

    fn exchange_on_tree(&mut self, command: SMBCommandCode, body: SMBBody, tree_id: u32) -> SMBResult<SMBMessage> {
        let message_id = self.send_request(command, body, tree_id)?;
        let response = self.receive_response(message_id, command)?;
        let status = response.header.nt_status();
        if matches!(status, NTStatus::NetworkSessionExpired | NTStatus::UserSessionDeleted) {
            error!(status = ?status, "session ended by server");
            self.session.expire();
            self.close_transport();
            return Err(SMBError::authentication_failed(format!("session ended by server with {:?}", status)));
        }
        Ok(response)
    }

    fn send_request(&mut self, command: SMBCommandCode, body: SMBBody, tree_id: u32) -> SMBResult<u64> {
        if !self.state.is_live() {
            return Err(SMBError::not_connected(format!("session is {:?}", self.state)));
        }
        let message_id = self.requests.allocate();
        let mut header = SMBHeader::request(command, message_id, tree_id, self.session.session_id());
        header.credit_charge = self.credit_charge();
        header.credits = CREDITS_REQUESTED;
        let message = SMBMessage::new(header, body);
        let bytes = match self.session.signing_key() {
            Some(key) => message.as_signed_bytes(key),
            None => Ok(message.as_bytes()),
        };
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => {
                self.requests.complete(message_id);
                return Err(e);
            }
        };
        trace!(message_id, command = ?command, length = bytes.len(), "sending request");
        if let Err(e) = self.transport.send(&bytes) {
            self.requests.complete(message_id);
            return Err(self.fail(e));
        }
        Ok(message_id)
    }

    fn credit_charge(&self) -> u16 {
        match &self.server {
            Some(server) if server.dialect.supports_multi_credit() => 1,
            _ => 0,
        }
    }

    fn receive_response(&mut self, message_id: u64, command: SMBCommandCode) -> SMBResult<SMBMessage> {
        let result = self.await_response(message_id, command);
        result.map_err(|e| self.fail(e))
    }

    fn await_response(&mut self, message_id: u64, command: SMBCommandCode) -> SMBResult<SMBMessage> {
        if let Some(message) = self.requests.take_parked(message_id) {
            return check_command(message, command);
        }
        loop {
            let bytes = self.transport.receive()?;
            if is_legacy_message(&bytes) {
                return Err(match self.state {
                    SMBSessionState::Negotiating => SMBError::negotiation_failed("server only speaks SMB1"),
                    _ => SMBError::protocol_error("unexpected SMB1 message"),
                });
            }
            let (body, header) = SMBHeader::smb_from_bytes(&bytes)?;
            let id = header.message_id;
            if header.sender() != SMBSender::Server {
                return Err(SMBError::protocol_error(format!("received a request with message id {}", id)));
            }
            if id == UNSOLICITED_MESSAGE_ID {
                warn!(command = ?header.command, "ignoring unsolicited message");
                continue;
            }
            if header.is_interim() {
                trace!(message_id = id, "interim response");
                continue;
            }
            if !self.requests.is_pending(id) {
                return Err(SMBError::protocol_error(format!("response for unknown message id {}", id)));
            }
            self.check_signature(&bytes, &header)?;
            let (_, body) = SMBBody::parse(body, &header)?;
            let message = SMBMessage::new(header, body);
            trace!(message_id = id, status = message.header.status, "received response");
            if id != message_id {
                self.requests.park(message);
                continue;
            }
            self.requests.complete(id);
            return check_command(message, command);
        }
    }

    fn check_signature(&self, bytes: &[u8], header: &SMBHeader) -> SMBResult<()> {
        let Some(key) = self.session.signing_key() else {
            return Ok(());
        };
        if header.flags.contains(SMBFlags::SIGNED) {
            verify_signature(bytes, key)
        } else if header.status == NTStatus::StatusSuccess as u32 {
            Err(SMBError::protocol_error(format!("unsigned response to message {}", header.message_id)))
        } else {
            Ok(())
        }
    }

    /// Closes the session when `error` leaves the connection unusable.
    pub(crate) fn fail(&mut self, error: SMBError) -> SMBError {
        if error.is_fatal() && self.state != SMBSessionState::Closed {
            error!(error = %error, "closing session");
            self.close_transport();
        }
        error
    }

    fn close_transport(&mut self) {
        self.requests.clear();
        self.tree = None;
        if let Err(e) = self.transport.close() {
            warn!(error = %e, "failed to close transport");
        }
        self.state = SMBSessionState::Closed;
    }
}

impl<T: SMBTransport> Drop for SMBClient<T> {
    fn drop(&mut self) {
        if self.state != SMBSessionState::Closed {
            self.disconnect();
        }
    }
}

impl<T: SMBTransport> std::fmt::Debug for SMBClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SMBClient")
            .field("host", &self.config.host)
            .field("user", &self.user)
            .field("state", &self.state)
            .field("session_id", &self.session.session_id())
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

fn check_command(message: SMBMessage, command: SMBCommandCode) -> SMBResult<SMBMessage> {
    if message.header.command != command {
        return Err(SMBError::protocol_error(format!(
            "expected a {:?} response, got {:?}",
            command, message.header.command
        )));
    }
    Ok(message)
}

/// Turns a non-success status into the matching error.
pub(crate) fn expect_success(message: &SMBMessage) -> SMBResult<()> {
    match message.header.status {
        0 => Ok(()),
        _ => Err(SMBError::ResponseError(message.header.nt_status())),
    }
}

/// For file operations: maps a failing status onto the error kind for `path`.
pub(crate) fn expect_success_for(message: &SMBMessage, path: &str) -> SMBResult<()> {
    match message.header.status {
        0 => Ok(()),
        _ => Err(SMBError::from_status(message.header.nt_status(), display_path(path))),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "\\".to_string()
    } else {
        path.to_string()
    }
}
