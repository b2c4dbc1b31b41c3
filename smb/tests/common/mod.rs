//! An in-memory SMB2 server for the client integration tests.
//!
//! [`FakeServer`] holds a small volume of files and directories and answers
//! requests the way a Windows or Samba share would for the commands the
//! client sends. The client talks to it through [`FakeTransport`], which
//! implements the transport seam. Every request is recorded so tests can
//! assert on what went over the wire. [`ServerOptions`] turns on the
//! misbehaviours the error paths need.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use smb_client::client::{SMBClient, SMBClientConfig};
use smb_client::protocol::body::close::{SMBCloseFlags, SMBCloseResponse};
use smb_client::protocol::body::create::{SMBCreateAction, SMBCreateDisposition, SMBCreateOptions, SMBCreateRequest, SMBCreateResponse, SMBFileAttributes, SMBFileId, SMBOplockLevel};
use smb_client::protocol::body::error::SMBErrorResponse;
use smb_client::protocol::body::file_info::{SMBDirectoryInformation, SMBFileDispositionInformation, SMBFileInformationClass, SMBFileRenameInformation};
use smb_client::protocol::body::negotiate::{NegotiateSecurityMode, SMBNegotiateRequest, SMBNegotiateResponse};
use smb_client::protocol::body::query_directory::{SMBQueryDirectoryFlags, SMBQueryDirectoryRequest, SMBQueryDirectoryResponse};
use smb_client::protocol::body::read::{SMBReadRequest, SMBReadResponse};
use smb_client::protocol::body::session_setup::{SessionSetupSecurityMode, SMBSessionFlags, SMBSessionSetupRequest, SMBSessionSetupResponse};
use smb_client::protocol::body::set_info::{SMBSetInfoRequest, SMBSetInfoResponse};
use smb_client::protocol::body::tree_connect::{SMBAccessMask, SMBShareFlags, SMBShareType, SMBTreeCapabilities, SMBTreeConnectRequest, SMBTreeConnectResponse};
use smb_client::protocol::body::write::{SMBWriteRequest, SMBWriteResponse};
use smb_client::protocol::body::{Capabilities, FileTime, SMBBody, SMBDialect, SMBEmpty};
use smb_client::protocol::header::{SMBCommandCode, SMBFlags, SMBHeader};
use smb_client::protocol::message::SMBMessage;
use smb_client::socket::SMBTransport;
use smb_client::util::auth::ntlm::{NTLMChallengeMessageBody, NTLMMessage, NTLMNegotiateFlags};
use smb_client::util::auth::spnego::{NegotiateState, SPNEGOToken, SPNEGOTokenResponseBody};
use smb_client::util::auth::{AuthProvider, User};
use smb_client::util::crypto::smb2::SMBSigningKey;
use smb_core::error::SMBError;
use smb_core::nt_status::NTStatus;
use smb_core::{SMBFromBytes, SMBResult};

pub const SESSION_ID: u64 = 0x0000_0400_0000_0011;
pub const TREE_ID: u32 = 7;
pub const SESSION_KEY: [u8; 16] = [0x5A; 16];
pub const SERVER_GUID: Uuid = Uuid::from_u128(0x6ba7b810_9dad_11d1_80b4_00c04fd430c8);

const NTLM_OID: [u8; 10] = [0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x02, 0x02, 0x0a];
const FAKE_CHALLENGE: &[u8] = b"CHALLENGE";
const MODIFIED: u64 = 1_700_000_000;

/// How the fake server behaves. The defaults describe a well-behaved SMB 2.1
/// server exporting `microSD`.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub dialect: SMBDialect,
    /// Answer NEGOTIATE with `dialect` even when the client did not offer it.
    pub ignore_offered_dialects: bool,
    /// Answer NEGOTIATE with an SMB1 message.
    pub smb1_only: bool,
    pub max_read_size: u32,
    pub max_write_size: u32,
    pub max_transact_size: u32,
    /// Entries per QUERY_DIRECTORY page, `.` and `..` included.
    pub page_size: usize,
    pub signing_required: bool,
    /// Key shared with [`FixedKeyAuthProvider`]. Responses are signed with
    /// it once a session wants signing.
    pub session_key: Option<Vec<u8>>,
    pub reject_logon: bool,
    /// Keep asking for more SESSION_SETUP rounds.
    pub endless_auth: bool,
    pub guest: bool,
    pub share: String,
    pub share_type: SMBShareType,
    /// Precede each CREATE response with a STATUS_PENDING interim response.
    pub interim_responses: bool,
    /// Precede each READ response with an unsolicited oplock break.
    pub unsolicited_breaks: bool,
    /// Answer this command with a message id nobody asked for.
    pub bogus_message_id_on: Option<SMBCommandCode>,
    /// Answer this command with STATUS_NETWORK_SESSION_EXPIRED.
    pub expire_session_on: Option<SMBCommandCode>,
    /// Answer this command with a broken signature.
    pub corrupt_signature_on: Option<SMBCommandCode>,
    /// Never answer this command.
    pub silent_on: Option<SMBCommandCode>,
    /// Fail the WRITE at this offset with STATUS_DISK_FULL.
    pub fail_write_at: Option<u64>,
    /// Accept fewer bytes than asked for on every WRITE.
    pub short_writes: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            dialect: SMBDialect::V2_1_0,
            ignore_offered_dialects: false,
            smb1_only: false,
            max_read_size: 65536,
            max_write_size: 65536,
            max_transact_size: 65536,
            page_size: 4,
            signing_required: false,
            session_key: None,
            reject_logon: false,
            endless_auth: false,
            guest: false,
            share: "microSD".into(),
            share_type: SMBShareType::Disk,
            interim_responses: false,
            unsolicited_breaks: false,
            bogus_message_id_on: None,
            expire_session_on: None,
            corrupt_signature_on: None,
            silent_on: None,
            fail_write_at: None,
            short_writes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(Vec<u8>),
    Directory,
}

#[derive(Debug)]
struct Open {
    path: String,
    delete_pending: bool,
    listing: Option<VecDeque<SMBDirectoryInformation>>,
}

#[derive(Debug)]
struct ServerState {
    options: ServerOptions,
    volume: BTreeMap<String, Node>,
    opens: HashMap<u64, Open>,
    next_file_id: u64,
    requests: Vec<SMBMessage>,
    bytes_received: usize,
    bad_signatures: usize,
    auth_rounds: usize,
    signing_key: Option<SMBSigningKey>,
    authenticated_user: Option<String>,
    tree_connected: bool,
    closed: bool,
    outbox: VecDeque<Vec<u8>>,
}

/// Shared handle on the fake server. Clones see the same volume and log.
#[derive(Debug, Clone)]
pub struct FakeServer {
    state: Arc<Mutex<ServerState>>,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new(ServerOptions::default())
    }
}

impl FakeServer {
    pub fn new(options: ServerOptions) -> Self {
        let mut volume = BTreeMap::new();
        volume.insert(String::new(), Node::Directory);
        let state = ServerState {
            options,
            volume,
            opens: HashMap::new(),
            next_file_id: 1,
            requests: Vec::new(),
            bytes_received: 0,
            bad_signatures: 0,
            auth_rounds: 0,
            signing_key: None,
            authenticated_user: None,
            tree_connected: false,
            closed: false,
            outbox: VecDeque::new(),
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A new connection. Session state left by an earlier one is dropped;
    /// the volume and the request log are kept.
    pub fn transport(&self) -> FakeTransport {
        let mut state = self.lock();
        state.closed = false;
        state.outbox.clear();
        state.opens.clear();
        state.auth_rounds = 0;
        state.signing_key = None;
        state.tree_connected = false;
        drop(state);
        FakeTransport { state: Arc::clone(&self.state) }
    }

    /// Client settings pointing at this server.
    pub fn config(&self) -> SMBClientConfig {
        SMBClientConfig {
            host: "fake".into(),
            share: self.lock().options.share.clone(),
            netbios_session: false,
            ..Default::default()
        }
    }

    /// A client that has not sent anything yet, using the fixed-key provider.
    pub fn client(&self) -> SMBClient<FakeTransport> {
        self.client_with(self.config())
    }

    pub fn client_with(&self, config: SMBClientConfig) -> SMBClient<FakeTransport> {
        let provider = FixedKeyAuthProvider::new(self.lock().options.session_key.clone());
        SMBClient::with_auth_provider(config, User::new("alice", "wonderland"), self.transport(), Box::new(provider))
    }

    /// Negotiates, authenticates and connects to the share.
    pub fn connect(&self) -> SMBResult<SMBClient<FakeTransport>> {
        self.connect_with(self.config())
    }

    pub fn connect_with(&self, config: SMBClientConfig) -> SMBResult<SMBClient<FakeTransport>> {
        let provider = FixedKeyAuthProvider::new(self.lock().options.session_key.clone());
        SMBClient::connect_with_provider(config, User::new("alice", "wonderland"), self.transport(), Box::new(provider))
    }

    pub fn update(&self, change: impl FnOnce(&mut ServerOptions)) {
        change(&mut self.lock().options);
    }

    pub fn add_file(&self, path: &str, content: &[u8]) {
        self.lock().volume.insert(path.to_string(), Node::File(content.to_vec()));
    }

    pub fn add_directory(&self, path: &str) {
        self.lock().volume.insert(path.to_string(), Node::Directory);
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.lock().volume.get(path) {
            Some(Node::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn node(&self, path: &str) -> Option<Node> {
        self.lock().volume.get(path).cloned()
    }

    pub fn requests(&self) -> Vec<SMBMessage> {
        self.lock().requests.clone()
    }

    pub fn commands(&self) -> Vec<SMBCommandCode> {
        self.lock().requests.iter().map(|request| request.header.command).collect()
    }

    pub fn count(&self, command: SMBCommandCode) -> usize {
        self.lock().requests.iter().filter(|request| request.header.command == command).count()
    }

    pub fn clear_log(&self) {
        let mut state = self.lock();
        state.requests.clear();
        state.bytes_received = 0;
    }

    pub fn bytes_received(&self) -> usize {
        self.lock().bytes_received
    }

    pub fn open_handles(&self) -> usize {
        self.lock().opens.len()
    }

    /// Signed requests whose signature did not verify.
    pub fn bad_signatures(&self) -> usize {
        self.lock().bad_signatures
    }

    pub fn signing_active(&self) -> bool {
        self.lock().signing_key.is_some()
    }

    pub fn authenticated_user(&self) -> Option<String> {
        self.lock().authenticated_user.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// The client end of a connection to a [`FakeServer`]. A request that gets
/// no answer makes `receive` time out the way a read timeout would.
#[derive(Debug)]
pub struct FakeTransport {
    state: Arc<Mutex<ServerState>>,
}

impl FakeTransport {
    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SMBTransport for FakeTransport {
    fn send(&mut self, message: &[u8]) -> SMBResult<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(SMBError::connection_lost(io::Error::from(io::ErrorKind::NotConnected)));
        }
        state.handle(message)
    }

    fn receive(&mut self) -> SMBResult<Vec<u8>> {
        let mut state = self.lock();
        if state.closed {
            return Err(SMBError::connection_lost(io::Error::from(io::ErrorKind::UnexpectedEof)));
        }
        state.outbox.pop_front().ok_or_else(|| SMBError::timeout("server response"))
    }

    fn close(&mut self) -> SMBResult<()> {
        let mut state = self.lock();
        state.closed = true;
        state.outbox.clear();
        Ok(())
    }
}

/// Stand-in credential provider: fixed tokens and a session key both ends know.
#[derive(Debug, Clone)]
pub struct FixedKeyAuthProvider {
    key: Option<Vec<u8>>,
    answered: bool,
}

impl FixedKeyAuthProvider {
    pub fn new(key: Option<Vec<u8>>) -> Self {
        Self { key, answered: false }
    }
}

impl AuthProvider for FixedKeyAuthProvider {
    fn get_oid() -> Vec<u8> {
        NTLM_OID.to_vec()
    }

    fn initial_token(&mut self, user: &User) -> SMBResult<Vec<u8>> {
        self.answered = false;
        Ok(format!("HELLO {}", user.username).into_bytes())
    }

    fn response_token(&mut self, challenge: &[u8], user: &User) -> SMBResult<Vec<u8>> {
        if challenge != FAKE_CHALLENGE {
            return Err(SMBError::authentication_failed("unexpected challenge"));
        }
        self.answered = true;
        Ok(format!("AUTH {}", user.username).into_bytes())
    }

    fn session_key(&self) -> Option<Vec<u8>> {
        self.key.clone().filter(|_| self.answered)
    }
}

fn parent(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rfind('\\').map_or("", |idx| &path[..idx]))
}

fn base_name(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}

fn descends_from(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() && path.starts_with(ancestor) && path.as_bytes()[ancestor.len()] == b'\\'
}

fn modified() -> FileTime {
    FileTime::from_unix(MODIFIED)
}

fn attributes(node: &Node) -> SMBFileAttributes {
    match node {
        Node::File(_) => SMBFileAttributes::ARCHIVE,
        Node::Directory => SMBFileAttributes::DIRECTORY,
    }
}

fn size(node: &Node) -> u64 {
    match node {
        Node::File(content) => content.len() as u64,
        Node::Directory => 0,
    }
}

fn directory_entry(name: &str, node: &Node, index: u32) -> SMBDirectoryInformation {
    let end_of_file = size(node);
    SMBDirectoryInformation {
        file_index: index,
        creation_time: modified(),
        last_access_time: modified(),
        last_write_time: modified(),
        change_time: modified(),
        end_of_file,
        allocation_size: end_of_file.div_ceil(4096) * 4096,
        file_attributes: attributes(node),
        file_name: name.to_string(),
    }
}

type Reply = Result<SMBBody, NTStatus>;

impl ServerState {
    fn handle(&mut self, bytes: &[u8]) -> SMBResult<()> {
        self.bytes_received += bytes.len();
        let (_, request) = SMBMessage::parse(bytes)?;
        if request.is_signed() {
            let verified = self.signing_key.as_ref().map_or(Ok(false), |key| key.verify(bytes))?;
            if !verified {
                self.bad_signatures += 1;
            }
        }
        self.requests.push(request.clone());
        let header = &request.header;
        let command = header.command;
        if self.options.silent_on == Some(command) {
            return Ok(());
        }
        if command == SMBCommandCode::Negotiate && self.options.smb1_only {
            self.outbox.push_back(vec![0xFF, b'S', b'M', b'B', 0x72, 0, 0, 0, 0, 0x98, 0x01, 0x28]);
            return Ok(());
        }
        let mut message_id = header.message_id;
        if self.options.bogus_message_id_on == Some(command) {
            message_id += 1000;
        }
        let mut tree_id = header.tree_id;
        let session_id = header.session_id;
        let reply = if self.options.expire_session_on == Some(command) {
            Err(NTStatus::NetworkSessionExpired)
        } else {
            match request.body {
                SMBBody::NegotiateRequest(body) => self.negotiate(&body),
                SMBBody::SessionSetupRequest(body) => return self.session_setup(message_id, &body),
                SMBBody::TreeConnectRequest(body) => {
                    tree_id = TREE_ID;
                    self.tree_connect(&body)
                }
                SMBBody::TreeDisconnectRequest(_) => {
                    self.tree_connected = false;
                    Ok(SMBBody::TreeDisconnectResponse(SMBEmpty))
                }
                SMBBody::LogoffRequest(_) => {
                    self.signing_key = None;
                    Ok(SMBBody::LogoffResponse(SMBEmpty))
                }
                SMBBody::EchoRequest(_) => Ok(SMBBody::EchoResponse(SMBEmpty)),
                _ if !self.tree_connected => Err(NTStatus::NetworkNameDeleted),
                SMBBody::CreateRequest(body) => {
                    if self.options.interim_responses {
                        self.push_interim(command, message_id, tree_id, session_id);
                    }
                    self.create(&body)
                }
                SMBBody::CloseRequest(body) => self.close(body.file_id, body.flags),
                SMBBody::ReadRequest(body) => {
                    if self.options.unsolicited_breaks {
                        self.push_oplock_break();
                    }
                    self.read(&body)
                }
                SMBBody::WriteRequest(body) => self.write(&body),
                SMBBody::QueryDirectoryRequest(body) => self.query_directory(&body),
                SMBBody::SetInfoRequest(body) => self.set_info(&body),
                _ => Err(NTStatus::StatusNotSupported),
            }
        };
        self.respond(command, reply, message_id, tree_id, session_id)
    }

    fn respond(&mut self, command: SMBCommandCode, reply: Reply, message_id: u64, tree_id: u32, session_id: u64) -> SMBResult<()> {
        let (status, body) = match reply {
            Ok(body) => (NTStatus::StatusSuccess, body),
            Err(status) => (status, SMBBody::ErrorResponse(SMBErrorResponse::new())),
        };
        let mut header = SMBHeader::response(command, status, message_id, tree_id, session_id);
        header.credits = 8;
        let message = SMBMessage::new(header, body);
        let mut bytes = match &self.signing_key {
            Some(key) => message.as_signed_bytes(key)?,
            None => message.as_bytes(),
        };
        if self.options.corrupt_signature_on == Some(command) {
            bytes[50] ^= 0xFF;
        }
        self.outbox.push_back(bytes);
        Ok(())
    }

    fn push_interim(&mut self, command: SMBCommandCode, message_id: u64, tree_id: u32, session_id: u64) {
        let mut header = SMBHeader::response(command, NTStatus::Pending, message_id, tree_id, session_id);
        header.flags |= SMBFlags::ASYNC_COMMAND;
        header.async_id = Some(0x42);
        let message = SMBMessage::new(header, SMBBody::ErrorResponse(SMBErrorResponse::new()));
        self.outbox.push_back(message.as_bytes());
    }

    fn push_oplock_break(&mut self) {
        let header = SMBHeader::response(SMBCommandCode::OplockBreak, NTStatus::StatusSuccess, u64::MAX, 0, 0);
        let message = SMBMessage::new(header, SMBBody::EchoResponse(SMBEmpty));
        let mut bytes = message.as_bytes();
        bytes.truncate(64);
        // OPLOCK_BREAK notification: structure size 24, level II, file id
        bytes.extend_from_slice(&[24, 0, 1, 0, 0, 0, 0, 0]);
        bytes.extend_from_slice(&[0x11; 16]);
        self.outbox.push_back(bytes);
    }

    fn negotiate(&mut self, request: &SMBNegotiateRequest) -> Reply {
        let dialect = self.options.dialect;
        if !self.options.ignore_offered_dialects && !request.dialects.contains(&dialect) {
            return Err(NTStatus::StatusNotSupported);
        }
        let mut security_mode = NegotiateSecurityMode::NEGOTIATE_SIGNING_ENABLED;
        if self.options.signing_required {
            security_mode |= NegotiateSecurityMode::NEGOTIATE_SIGNING_REQUIRED;
        }
        Ok(SMBBody::NegotiateResponse(SMBNegotiateResponse {
            security_mode,
            dialect,
            guid: SERVER_GUID,
            capabilities: Capabilities::LARGE_MTU,
            max_transact_size: self.options.max_transact_size,
            max_read_size: self.options.max_read_size,
            max_write_size: self.options.max_write_size,
            system_time: FileTime::now(),
            server_start_time: modified(),
            buffer: Vec::new(),
        }))
    }

    fn session_setup(&mut self, message_id: u64, request: &SMBSessionSetupRequest) -> SMBResult<()> {
        self.auth_rounds += 1;
        let spnego = request.buffer.first() == Some(&0x60) || request.buffer.first() == Some(&0xA1);
        let command = SMBCommandCode::SessionSetup;
        if self.auth_rounds == 1 || self.options.endless_auth {
            let challenge = if spnego { spnego_challenge() } else { FAKE_CHALLENGE.to_vec() };
            let body = SMBBody::SessionSetupResponse(SMBSessionSetupResponse::new(SMBSessionFlags::empty(), challenge));
            let mut header = SMBHeader::response(command, NTStatus::MoreProcessingRequired, message_id, 0, SESSION_ID);
            header.credits = 8;
            self.outbox.push_back(SMBMessage::new(header, body).as_bytes());
            return Ok(());
        }
        if self.options.reject_logon {
            return self.respond(command, Err(NTStatus::StatusLogonFailure), message_id, 0, SESSION_ID);
        }
        self.authenticated_user = Some(authenticating_user(&request.buffer, spnego));
        let flags = if self.options.guest { SMBSessionFlags::IS_GUEST } else { SMBSessionFlags::empty() };
        let client_requires = request.security_mode.contains(SessionSetupSecurityMode::SIGNING_REQUIRED);
        let wants_signing = self.options.signing_required || client_requires;
        if let Some(key) = self.options.session_key.as_ref().filter(|_| wants_signing && !self.options.guest && !spnego) {
            self.signing_key = Some(SMBSigningKey::derive(key, self.options.dialect)?);
        }
        let body = SMBBody::SessionSetupResponse(SMBSessionSetupResponse::new(flags, Vec::new()));
        self.respond(command, Ok(body), message_id, 0, SESSION_ID)
    }

    fn tree_connect(&mut self, request: &SMBTreeConnectRequest) -> Reply {
        let share = base_name(&request.path);
        if !share.eq_ignore_ascii_case(&self.options.share) {
            return Err(NTStatus::BadNetworkName);
        }
        self.tree_connected = self.options.share_type == SMBShareType::Disk;
        Ok(SMBBody::TreeConnectResponse(SMBTreeConnectResponse {
            share_type: self.options.share_type,
            share_flags: SMBShareFlags::empty(),
            capabilities: SMBTreeCapabilities::empty(),
            maximal_access: SMBAccessMask::all(),
        }))
    }

    fn create(&mut self, request: &SMBCreateRequest) -> Reply {
        let path = request.file_name.clone();
        let wants_directory = request.create_options.contains(SMBCreateOptions::DIRECTORY_FILE);
        let wants_file = request.create_options.contains(SMBCreateOptions::NON_DIRECTORY_FILE);
        let action = match self.volume.get_mut(&path) {
            Some(node) => {
                if request.create_disposition == SMBCreateDisposition::Create {
                    return Err(NTStatus::ObjectNameCollision);
                }
                match node {
                    Node::File(_) if wants_directory => return Err(NTStatus::NotADirectory),
                    Node::Directory if wants_file => return Err(NTStatus::FileIsADirectory),
                    Node::File(content) => match request.create_disposition {
                        SMBCreateDisposition::Overwrite | SMBCreateDisposition::OverwriteIf | SMBCreateDisposition::Supersede => {
                            content.clear();
                            SMBCreateAction::Overwritten
                        }
                        _ => SMBCreateAction::Opened,
                    },
                    Node::Directory => SMBCreateAction::Opened,
                }
            }
            None => {
                match parent(&path).map(|parent| self.volume.get(parent)) {
                    Some(Some(Node::Directory)) => {}
                    _ => return Err(NTStatus::ObjectPathNotFound),
                }
                match request.create_disposition {
                    SMBCreateDisposition::Open | SMBCreateDisposition::Overwrite => return Err(NTStatus::ObjectNameNotFound),
                    _ => {}
                }
                let node = if wants_directory { Node::Directory } else { Node::File(Vec::new()) };
                self.volume.insert(path.clone(), node);
                SMBCreateAction::Created
            }
        };
        let node = self.volume.get(&path).cloned().ok_or(NTStatus::ObjectNameNotFound)?;
        let id = self.next_file_id;
        self.next_file_id += 1;
        self.opens.insert(id, Open { path, delete_pending: false, listing: None });
        let end_of_file = size(&node);
        Ok(SMBBody::CreateResponse(SMBCreateResponse {
            oplock_level: SMBOplockLevel::None,
            flags: 0,
            create_action: action,
            creation_time: modified(),
            last_access_time: modified(),
            last_write_time: modified(),
            change_time: modified(),
            allocation_size: end_of_file.div_ceil(4096) * 4096,
            end_of_file,
            file_attributes: attributes(&node),
            file_id: SMBFileId::new(id, !id),
        }))
    }

    fn close(&mut self, file_id: SMBFileId, flags: SMBCloseFlags) -> Reply {
        let open = self.opens.remove(&file_id.persistent).ok_or(NTStatus::FileClosed)?;
        let node = self.volume.get(&open.path).cloned();
        if open.delete_pending {
            let doomed: Vec<String> = self.volume.keys()
                .filter(|key| **key == open.path || descends_from(key, &open.path))
                .cloned()
                .collect();
            for key in doomed {
                self.volume.remove(&key);
            }
        }
        let mut response = SMBCloseResponse::default();
        if let (true, Some(node)) = (flags.contains(SMBCloseFlags::POSTQUERY_ATTRIB), node) {
            let end_of_file = size(&node);
            response = SMBCloseResponse {
                flags: SMBCloseFlags::POSTQUERY_ATTRIB.bits(),
                creation_time: modified(),
                last_access_time: modified(),
                last_write_time: modified(),
                change_time: modified(),
                allocation_size: end_of_file.div_ceil(4096) * 4096,
                end_of_file,
                file_attributes: attributes(&node),
            };
        }
        Ok(SMBBody::CloseResponse(response))
    }

    fn open_path(&self, file_id: SMBFileId) -> Result<String, NTStatus> {
        self.opens.get(&file_id.persistent)
            .map(|open| open.path.clone())
            .ok_or(NTStatus::FileClosed)
    }

    fn read(&mut self, request: &SMBReadRequest) -> Reply {
        let path = self.open_path(request.file_id)?;
        let Some(Node::File(content)) = self.volume.get(&path) else {
            return Err(NTStatus::InvalidDeviceRequest);
        };
        if request.length > self.options.max_read_size {
            return Err(NTStatus::InvalidParameter);
        }
        let offset = request.offset as usize;
        if offset >= content.len() {
            return Err(NTStatus::EndOfFile);
        }
        let end = content.len().min(offset + request.length as usize);
        Ok(SMBBody::ReadResponse(SMBReadResponse::new(content[offset..end].to_vec())))
    }

    fn write(&mut self, request: &SMBWriteRequest) -> Reply {
        if self.options.fail_write_at == Some(request.offset) {
            return Err(NTStatus::DiskFull);
        }
        if request.data.len() > self.options.max_write_size as usize {
            return Err(NTStatus::InvalidParameter);
        }
        let path = self.open_path(request.file_id)?;
        let Some(Node::File(content)) = self.volume.get_mut(&path) else {
            return Err(NTStatus::InvalidDeviceRequest);
        };
        let offset = request.offset as usize;
        let mut data = request.data.as_slice();
        if self.options.short_writes && data.len() > 1 {
            data = &data[..data.len() / 2];
        }
        if content.len() < offset + data.len() {
            content.resize(offset + data.len(), 0);
        }
        content[offset..offset + data.len()].copy_from_slice(data);
        Ok(SMBBody::WriteResponse(SMBWriteResponse::new(data.len() as u32)))
    }

    fn query_directory(&mut self, request: &SMBQueryDirectoryRequest) -> Reply {
        let path = self.open_path(request.file_id)?;
        if self.volume.get(&path) != Some(&Node::Directory) {
            return Err(NTStatus::InvalidParameter);
        }
        let listing = self.listing(&path);
        let page_size = self.options.page_size.max(1);
        let open = self.opens.get_mut(&request.file_id.persistent).ok_or(NTStatus::FileClosed)?;
        if request.flags.contains(SMBQueryDirectoryFlags::RESTART_SCANS) || open.listing.is_none() {
            open.listing = Some(listing);
        }
        let remaining = open.listing.get_or_insert_with(VecDeque::new);
        let mut page = Vec::new();
        while page.len() < page_size {
            let Some(entry) = remaining.front() else {
                break;
            };
            let mut candidate = page.clone();
            candidate.push(entry.clone());
            if SMBDirectoryInformation::encode_list(&candidate).len() > request.output_buffer_length as usize {
                break;
            }
            page = candidate;
            remaining.pop_front();
        }
        if page.is_empty() {
            return Err(NTStatus::NoMoreFiles);
        }
        Ok(SMBBody::QueryDirectoryResponse(SMBQueryDirectoryResponse::new(SMBDirectoryInformation::encode_list(&page))))
    }

    fn listing(&self, path: &str) -> VecDeque<SMBDirectoryInformation> {
        let mut entries = VecDeque::new();
        entries.push_back(directory_entry(".", &Node::Directory, 0));
        entries.push_back(directory_entry("..", &Node::Directory, 0));
        let children = self.volume.iter().filter(|(key, _)| parent(key) == Some(path));
        for (idx, (key, node)) in children.enumerate() {
            entries.push_back(directory_entry(base_name(key), node, idx as u32 + 1));
        }
        entries
    }

    fn set_info(&mut self, request: &SMBSetInfoRequest) -> Reply {
        let path = self.open_path(request.file_id)?;
        match request.file_info_class {
            SMBFileInformationClass::FileDispositionInformation => {
                let (_, info) = SMBFileDispositionInformation::smb_from_bytes(&request.buffer)
                    .map_err(|_| NTStatus::InvalidParameter)?;
                let has_children = self.volume.keys().any(|key| descends_from(key, &path));
                if info.delete_pending && has_children {
                    return Err(NTStatus::DirectoryNotEmpty);
                }
                if let Some(open) = self.opens.get_mut(&request.file_id.persistent) {
                    open.delete_pending = info.delete_pending;
                }
            }
            SMBFileInformationClass::FileRenameInformation => {
                let (_, info) = SMBFileRenameInformation::smb_from_bytes(&request.buffer)
                    .map_err(|_| NTStatus::InvalidParameter)?;
                let target = info.file_name.trim_start_matches('\\').to_string();
                if self.volume.contains_key(&target) && !info.replace_if_exists {
                    return Err(NTStatus::ObjectNameCollision);
                }
                match parent(&target).map(|parent| self.volume.get(parent)) {
                    Some(Some(Node::Directory)) => {}
                    _ => return Err(NTStatus::ObjectPathNotFound),
                }
                let moved: Vec<String> = self.volume.keys()
                    .filter(|key| **key == path || descends_from(key, &path))
                    .cloned()
                    .collect();
                for key in moved {
                    if let Some(node) = self.volume.remove(&key) {
                        let renamed = format!("{}{}", target, &key[path.len()..]);
                        self.volume.insert(renamed, node);
                    }
                }
                if let Some(open) = self.opens.get_mut(&request.file_id.persistent) {
                    open.path = target;
                }
            }
            _ => return Err(NTStatus::StatusNotSupported),
        }
        Ok(SMBBody::SetInfoResponse(SMBSetInfoResponse))
    }
}

fn spnego_challenge() -> Vec<u8> {
    let flags = NTLMNegotiateFlags::UNICODE_ENCODING
        | NTLMNegotiateFlags::EXTENDED_SESSION_SECURITY
        | NTLMNegotiateFlags::USE_128_BIT_ENCRYPTION
        | NTLMNegotiateFlags::KEY_EXCHANGE;
    let challenge = NTLMChallengeMessageBody::new("FAKE".into(), flags, [0x11; 8], vec![0, 0, 0, 0]);
    SPNEGOToken::Response(SPNEGOTokenResponseBody {
        state: Some(NegotiateState::AcceptIncomplete),
        supported_mech: Some(NTLM_OID.to_vec()),
        response_token: Some(challenge.as_bytes()),
        mech_list_mic: None,
    }).as_bytes(false)
}

/// The user name carried by the final SESSION_SETUP token.
fn authenticating_user(token: &[u8], spnego: bool) -> String {
    if !spnego {
        let token = String::from_utf8_lossy(token);
        return token.trim_start_matches("AUTH ").to_string();
    }
    let Ok((_, SPNEGOToken::Response(response))) = SPNEGOToken::parse(token) else {
        return String::new();
    };
    match response.response_token.as_deref().map(NTLMMessage::parse) {
        Some(Ok(NTLMMessage::Authenticate(auth))) => auth.user_name,
        _ => String::new(),
    }
}
