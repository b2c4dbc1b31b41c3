use smb_core::error::SMBError;
use smb_core::logging::{debug, trace, warn};
use smb_core::SMBResult;

use crate::client::client::{expect_success_for, SMBClient};
use crate::protocol::body::close::{SMBCloseFlags, SMBCloseRequest, SMBCloseResponse};
use crate::protocol::body::create::{SMBCreateDisposition, SMBCreateOptions, SMBCreateRequest, SMBCreateResponse, SMBFileAttributes, SMBFileId};
use crate::protocol::body::tree_connect::SMBAccessMask;
use crate::protocol::body::SMBBody;
use crate::protocol::header::SMBCommandCode;
use crate::socket::SMBTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SMBHandleKind {
    File,
    Directory,
}

/// An open on the server. Not `Clone`: closing takes the handle by value,
/// so a handle is closed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct SMBFileHandle {
    file_id: SMBFileId,
    kind: SMBHandleKind,
    path: String,
    end_of_file: u64,
    cursor: u64,
}

impl SMBFileHandle {
    pub fn init(path: String, response: &SMBCreateResponse) -> Self {
        let kind = if response.file_attributes.contains(SMBFileAttributes::DIRECTORY) {
            SMBHandleKind::Directory
        } else {
            SMBHandleKind::File
        };
        Self {
            file_id: response.file_id,
            kind,
            path,
            end_of_file: response.end_of_file,
            cursor: 0,
        }
    }

    pub fn file_id(&self) -> SMBFileId {
        self.file_id
    }

    pub fn kind(&self) -> SMBHandleKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File size reported when the handle was opened.
    pub fn end_of_file(&self) -> u64 {
        self.end_of_file
    }

    /// Offset of the next read or write.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub(crate) fn advance(&mut self, count: u64) {
        self.cursor += count;
    }
}

impl<T: SMBTransport> SMBClient<T> {
    /// CREATE on a normalized path. A failing status maps onto the file
    /// error for `path` and leaves nothing to close.
    pub(crate) fn open(
        &mut self,
        path: &str,
        access: SMBAccessMask,
        disposition: SMBCreateDisposition,
        options: SMBCreateOptions,
    ) -> SMBResult<(SMBFileHandle, SMBCreateResponse)> {
        let mut request = SMBCreateRequest::new(path, access | SMBAccessMask::SYNCHRONIZE, disposition, options);
        if options.contains(SMBCreateOptions::DIRECTORY_FILE) {
            request = request.with_attributes(SMBFileAttributes::DIRECTORY);
        }
        let response = self.exchange(SMBCommandCode::Create, SMBBody::CreateRequest(request))?;
        expect_success_for(&response, path)?;
        match response.body {
            SMBBody::CreateResponse(body) => {
                let handle = SMBFileHandle::init(path.to_string(), &body);
                trace!(path, file_id = %handle.file_id(), "opened");
                Ok((handle, body))
            }
            _ => Err(self.fail(SMBError::protocol_error("CREATE succeeded without a CREATE response"))),
        }
    }

    pub(crate) fn close_handle(&mut self, handle: SMBFileHandle, flags: SMBCloseFlags) -> SMBResult<SMBCloseResponse> {
        let mut request = SMBCloseRequest::new(handle.file_id());
        request.flags = flags;
        let response = self.exchange(SMBCommandCode::Close, SMBBody::CloseRequest(request))?;
        expect_success_for(&response, handle.path())?;
        trace!(path = handle.path(), "closed");
        match response.body {
            SMBBody::CloseResponse(body) => Ok(body),
            _ => Err(self.fail(SMBError::protocol_error("CLOSE succeeded without a CLOSE response"))),
        }
    }

    /// Closes `handle` on an error or cancellation path. Failures are
    /// logged, never returned.
    pub(crate) fn close_quietly(&mut self, handle: SMBFileHandle) {
        if !self.state().is_live() {
            debug!(path = handle.path(), "session gone, handle released with it");
            return;
        }
        let path = handle.path().to_string();
        if let Err(e) = self.close_handle(handle, SMBCloseFlags::empty()) {
            warn!(path = path.as_str(), error = %e, "failed to close handle");
        }
    }
}
