use serde::{Deserialize, Serialize};

use smb_core::{SMBByteSize, SMBFromBytes, SMBParseResult, SMBToBytes};
use smb_core::error::SMBError;
use smb_core::nt_status::NTStatus;

use crate::protocol::body::close::{SMBCloseRequest, SMBCloseResponse};
use crate::protocol::body::create::{SMBCreateRequest, SMBCreateResponse};
use crate::protocol::body::error::SMBErrorResponse;
use crate::protocol::body::negotiate::{SMBNegotiateRequest, SMBNegotiateResponse};
use crate::protocol::body::query_directory::{SMBQueryDirectoryRequest, SMBQueryDirectoryResponse};
use crate::protocol::body::read::{SMBReadRequest, SMBReadResponse};
use crate::protocol::body::session_setup::{SMBSessionSetupRequest, SMBSessionSetupResponse};
use crate::protocol::body::set_info::{SMBSetInfoRequest, SMBSetInfoResponse};
use crate::protocol::body::SMBEmpty;
use crate::protocol::body::tree_connect::{SMBTreeConnectRequest, SMBTreeConnectResponse};
use crate::protocol::body::write::{SMBWriteRequest, SMBWriteResponse};
use crate::protocol::header::{SMBCommandCode, SMBHeader, SMBSender};

const ERROR_STRUCTURE_SIZE: u16 = 9;

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub enum SMBBody {
    NegotiateRequest(SMBNegotiateRequest),
    NegotiateResponse(SMBNegotiateResponse),
    SessionSetupRequest(SMBSessionSetupRequest),
    SessionSetupResponse(SMBSessionSetupResponse),
    LogoffRequest(SMBEmpty),
    LogoffResponse(SMBEmpty),
    TreeConnectRequest(SMBTreeConnectRequest),
    TreeConnectResponse(SMBTreeConnectResponse),
    TreeDisconnectRequest(SMBEmpty),
    TreeDisconnectResponse(SMBEmpty),
    CreateRequest(SMBCreateRequest),
    CreateResponse(SMBCreateResponse),
    CloseRequest(SMBCloseRequest),
    CloseResponse(SMBCloseResponse),
    ReadRequest(SMBReadRequest),
    ReadResponse(SMBReadResponse),
    WriteRequest(SMBWriteRequest),
    WriteResponse(SMBWriteResponse),
    EchoRequest(SMBEmpty),
    EchoResponse(SMBEmpty),
    QueryDirectoryRequest(SMBQueryDirectoryRequest),
    QueryDirectoryResponse(SMBQueryDirectoryResponse),
    SetInfoRequest(SMBSetInfoRequest),
    SetInfoResponse(SMBSetInfoResponse),
    ErrorResponse(SMBErrorResponse),
}

type BodyDecoder = fn(&[u8]) -> SMBParseResult<&[u8], SMBBody>;

macro_rules! body_decoder {
    ($($name:ident => $variant:ident($t:ty)),* $(,)?) => {
        $(
            fn $name(input: &[u8]) -> SMBParseResult<&[u8], SMBBody> {
                let (remaining, body) = <$t>::smb_from_bytes(input)?;
                Ok((remaining, SMBBody::$variant(body)))
            }
        )*
    };
}

body_decoder! {
    negotiate_request => NegotiateRequest(SMBNegotiateRequest),
    negotiate_response => NegotiateResponse(SMBNegotiateResponse),
    session_setup_request => SessionSetupRequest(SMBSessionSetupRequest),
    session_setup_response => SessionSetupResponse(SMBSessionSetupResponse),
    logoff_request => LogoffRequest(SMBEmpty),
    logoff_response => LogoffResponse(SMBEmpty),
    tree_connect_request => TreeConnectRequest(SMBTreeConnectRequest),
    tree_connect_response => TreeConnectResponse(SMBTreeConnectResponse),
    tree_disconnect_request => TreeDisconnectRequest(SMBEmpty),
    tree_disconnect_response => TreeDisconnectResponse(SMBEmpty),
    create_request => CreateRequest(SMBCreateRequest),
    create_response => CreateResponse(SMBCreateResponse),
    close_request => CloseRequest(SMBCloseRequest),
    close_response => CloseResponse(SMBCloseResponse),
    read_request => ReadRequest(SMBReadRequest),
    read_response => ReadResponse(SMBReadResponse),
    write_request => WriteRequest(SMBWriteRequest),
    write_response => WriteResponse(SMBWriteResponse),
    echo_request => EchoRequest(SMBEmpty),
    echo_response => EchoResponse(SMBEmpty),
    query_directory_request => QueryDirectoryRequest(SMBQueryDirectoryRequest),
    query_directory_response => QueryDirectoryResponse(SMBQueryDirectoryResponse),
    set_info_request => SetInfoRequest(SMBSetInfoRequest),
    set_info_response => SetInfoResponse(SMBSetInfoResponse),
    error_response => ErrorResponse(SMBErrorResponse),
}

static DECODERS: &[(SMBCommandCode, SMBSender, BodyDecoder)] = &[
    (SMBCommandCode::Negotiate, SMBSender::Client, negotiate_request),
    (SMBCommandCode::Negotiate, SMBSender::Server, negotiate_response),
    (SMBCommandCode::SessionSetup, SMBSender::Client, session_setup_request),
    (SMBCommandCode::SessionSetup, SMBSender::Server, session_setup_response),
    (SMBCommandCode::LogOff, SMBSender::Client, logoff_request),
    (SMBCommandCode::LogOff, SMBSender::Server, logoff_response),
    (SMBCommandCode::TreeConnect, SMBSender::Client, tree_connect_request),
    (SMBCommandCode::TreeConnect, SMBSender::Server, tree_connect_response),
    (SMBCommandCode::TreeDisconnect, SMBSender::Client, tree_disconnect_request),
    (SMBCommandCode::TreeDisconnect, SMBSender::Server, tree_disconnect_response),
    (SMBCommandCode::Create, SMBSender::Client, create_request),
    (SMBCommandCode::Create, SMBSender::Server, create_response),
    (SMBCommandCode::Close, SMBSender::Client, close_request),
    (SMBCommandCode::Close, SMBSender::Server, close_response),
    (SMBCommandCode::Read, SMBSender::Client, read_request),
    (SMBCommandCode::Read, SMBSender::Server, read_response),
    (SMBCommandCode::Write, SMBSender::Client, write_request),
    (SMBCommandCode::Write, SMBSender::Server, write_response),
    (SMBCommandCode::Echo, SMBSender::Client, echo_request),
    (SMBCommandCode::Echo, SMBSender::Server, echo_response),
    (SMBCommandCode::QueryDirectory, SMBSender::Client, query_directory_request),
    (SMBCommandCode::QueryDirectory, SMBSender::Server, query_directory_response),
    (SMBCommandCode::SetInfo, SMBSender::Client, set_info_request),
    (SMBCommandCode::SetInfo, SMBSender::Server, set_info_response),
];

impl SMBBody {
    /// Decodes the body that follows `header`. Failing responses carry the
    /// ERROR body in place of the command's own layout.
    pub fn parse<'a>(input: &'a [u8], header: &SMBHeader) -> SMBParseResult<&'a [u8], Self> {
        let sender = header.sender();
        if sender == SMBSender::Server && carries_error_body(header, input) {
            return error_response(input);
        }
        let (_, _, decoder) = DECODERS.iter()
            .find(|(command, from, _)| *command == header.command && *from == sender)
            .ok_or_else(|| SMBError::parse_error(format!("Unsupported command {:?}", header.command)))?;
        decoder(input)
    }

    /// The command this body belongs to, `None` for the ERROR body which is
    /// shared by every command.
    pub fn command(&self) -> Option<SMBCommandCode> {
        let command = match self {
            Self::NegotiateRequest(_) | Self::NegotiateResponse(_) => SMBCommandCode::Negotiate,
            Self::SessionSetupRequest(_) | Self::SessionSetupResponse(_) => SMBCommandCode::SessionSetup,
            Self::LogoffRequest(_) | Self::LogoffResponse(_) => SMBCommandCode::LogOff,
            Self::TreeConnectRequest(_) | Self::TreeConnectResponse(_) => SMBCommandCode::TreeConnect,
            Self::TreeDisconnectRequest(_) | Self::TreeDisconnectResponse(_) => SMBCommandCode::TreeDisconnect,
            Self::CreateRequest(_) | Self::CreateResponse(_) => SMBCommandCode::Create,
            Self::CloseRequest(_) | Self::CloseResponse(_) => SMBCommandCode::Close,
            Self::ReadRequest(_) | Self::ReadResponse(_) => SMBCommandCode::Read,
            Self::WriteRequest(_) | Self::WriteResponse(_) => SMBCommandCode::Write,
            Self::EchoRequest(_) | Self::EchoResponse(_) => SMBCommandCode::Echo,
            Self::QueryDirectoryRequest(_) | Self::QueryDirectoryResponse(_) => SMBCommandCode::QueryDirectory,
            Self::SetInfoRequest(_) | Self::SetInfoResponse(_) => SMBCommandCode::SetInfo,
            Self::ErrorResponse(_) => return None,
        };
        Some(command)
    }
}

fn carries_error_body(header: &SMBHeader, input: &[u8]) -> bool {
    let status = header.status;
    let in_progress = header.command == SMBCommandCode::SessionSetup
        && status == NTStatus::MoreProcessingRequired as u32;
    let failing = NTStatus::is_error(status)
        || status == NTStatus::NoMoreFiles as u32
        || status == NTStatus::Pending as u32;
    let structure_size = u16::smb_from_bytes(input).map(|(_, size)| size).ok();
    failing && !in_progress && structure_size == Some(ERROR_STRUCTURE_SIZE)
}

impl SMBByteSize for SMBBody {
    fn smb_byte_size(&self) -> usize {
        match self {
            Self::NegotiateRequest(x) => x.smb_byte_size(),
            Self::NegotiateResponse(x) => x.smb_byte_size(),
            Self::SessionSetupRequest(x) => x.smb_byte_size(),
            Self::SessionSetupResponse(x) => x.smb_byte_size(),
            Self::LogoffRequest(x) | Self::LogoffResponse(x) => x.smb_byte_size(),
            Self::TreeConnectRequest(x) => x.smb_byte_size(),
            Self::TreeConnectResponse(x) => x.smb_byte_size(),
            Self::TreeDisconnectRequest(x) | Self::TreeDisconnectResponse(x) => x.smb_byte_size(),
            Self::CreateRequest(x) => x.smb_byte_size(),
            Self::CreateResponse(x) => x.smb_byte_size(),
            Self::CloseRequest(x) => x.smb_byte_size(),
            Self::CloseResponse(x) => x.smb_byte_size(),
            Self::ReadRequest(x) => x.smb_byte_size(),
            Self::ReadResponse(x) => x.smb_byte_size(),
            Self::WriteRequest(x) => x.smb_byte_size(),
            Self::WriteResponse(x) => x.smb_byte_size(),
            Self::EchoRequest(x) | Self::EchoResponse(x) => x.smb_byte_size(),
            Self::QueryDirectoryRequest(x) => x.smb_byte_size(),
            Self::QueryDirectoryResponse(x) => x.smb_byte_size(),
            Self::SetInfoRequest(x) => x.smb_byte_size(),
            Self::SetInfoResponse(x) => x.smb_byte_size(),
            Self::ErrorResponse(x) => x.smb_byte_size(),
        }
    }
}

impl SMBToBytes for SMBBody {
    fn smb_to_bytes(&self) -> Vec<u8> {
        match self {
            Self::NegotiateRequest(x) => x.smb_to_bytes(),
            Self::NegotiateResponse(x) => x.smb_to_bytes(),
            Self::SessionSetupRequest(x) => x.smb_to_bytes(),
            Self::SessionSetupResponse(x) => x.smb_to_bytes(),
            Self::LogoffRequest(x) | Self::LogoffResponse(x) => x.smb_to_bytes(),
            Self::TreeConnectRequest(x) => x.smb_to_bytes(),
            Self::TreeConnectResponse(x) => x.smb_to_bytes(),
            Self::TreeDisconnectRequest(x) | Self::TreeDisconnectResponse(x) => x.smb_to_bytes(),
            Self::CreateRequest(x) => x.smb_to_bytes(),
            Self::CreateResponse(x) => x.smb_to_bytes(),
            Self::CloseRequest(x) => x.smb_to_bytes(),
            Self::CloseResponse(x) => x.smb_to_bytes(),
            Self::ReadRequest(x) => x.smb_to_bytes(),
            Self::ReadResponse(x) => x.smb_to_bytes(),
            Self::WriteRequest(x) => x.smb_to_bytes(),
            Self::WriteResponse(x) => x.smb_to_bytes(),
            Self::EchoRequest(x) | Self::EchoResponse(x) => x.smb_to_bytes(),
            Self::QueryDirectoryRequest(x) => x.smb_to_bytes(),
            Self::QueryDirectoryResponse(x) => x.smb_to_bytes(),
            Self::SetInfoRequest(x) => x.smb_to_bytes(),
            Self::SetInfoResponse(x) => x.smb_to_bytes(),
            Self::ErrorResponse(x) => x.smb_to_bytes(),
        }
    }
}
