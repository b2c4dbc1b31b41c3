use std::io::{self, Read};

use smb_core::error::SMBError;
use smb_core::logging::{debug, trace};
use smb_core::nt_status::NTStatus;
use smb_core::SMBResult;

use crate::client::client::{expect_success_for, SMBClient};
use crate::client::open::SMBFileHandle;
use crate::client::path::normalize_path;
use crate::protocol::body::close::SMBCloseFlags;
use crate::protocol::body::create::{SMBCreateDisposition, SMBCreateOptions};
use crate::protocol::body::file_info::{SMBFileDispositionInformation, SMBFileRenameInformation};
use crate::protocol::body::read::SMBReadRequest;
use crate::protocol::body::set_info::SMBSetInfoRequest;
use crate::protocol::body::tree_connect::SMBAccessMask;
use crate::protocol::body::write::SMBWriteRequest;
use crate::protocol::body::SMBBody;
use crate::protocol::header::SMBCommandCode;
use crate::socket::SMBTransport;

/// The content of one remote file, read a chunk at a time.
///
/// Chunks come back in file order and are never empty. The handle is closed
/// at end of file, on the first error, or when the reader is dropped. The
/// reader also implements [`Read`] for callers that want a byte stream.
pub struct FileReader<'a, T: SMBTransport> {
    client: &'a mut SMBClient<T>,
    handle: Option<SMBFileHandle>,
    chunk_size: u32,
    buffer: Vec<u8>,
    position: usize,
}

impl<'a, T: SMBTransport> FileReader<'a, T> {
    fn new(client: &'a mut SMBClient<T>, handle: SMBFileHandle) -> Self {
        let chunk_size = client.read_chunk_size();
        Self {
            client,
            handle: Some(handle),
            chunk_size,
            buffer: Vec::new(),
            position: 0,
        }
    }

    /// File size reported when the file was opened.
    pub fn len(&self) -> Option<u64> {
        self.handle.as_ref().map(SMBFileHandle::end_of_file)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    fn read_chunk(&mut self) -> SMBResult<Option<Vec<u8>>> {
        let Some(handle) = self.handle.as_ref() else {
            return Ok(None);
        };
        let offset = handle.cursor();
        let path = handle.path().to_string();
        let request = SMBReadRequest::new(handle.file_id(), offset, self.chunk_size);
        let response = self.client.exchange(SMBCommandCode::Read, SMBBody::ReadRequest(request))?;
        let data = match (response.header.nt_status(), response.body) {
            (NTStatus::EndOfFile, _) => return Ok(None),
            (NTStatus::StatusSuccess, SMBBody::ReadResponse(body)) => body.data,
            (NTStatus::StatusSuccess, _) => {
                return Err(self.client.fail(SMBError::protocol_error("READ succeeded without data")));
            }
            (status, _) => return Err(SMBError::from_status(status, path)),
        };
        if data.len() > self.chunk_size as usize {
            return Err(self.client.fail(SMBError::protocol_error(format!(
                "READ returned {} bytes, {} were asked for",
                data.len(),
                self.chunk_size
            ))));
        }
        trace!(path = path.as_str(), offset, length = data.len(), "read chunk");
        if data.is_empty() {
            return Ok(None);
        }
        let short = data.len() < self.chunk_size as usize;
        if let Some(handle) = self.handle.as_mut() {
            handle.advance(data.len() as u64);
        }
        if short {
            self.finish();
        }
        Ok(Some(data))
    }

    fn finish(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.client.close_quietly(handle);
        }
    }
}

impl<T: SMBTransport> Iterator for FileReader<'_, T> {
    type Item = SMBResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                self.finish();
                Some(Err(e))
            }
        }
    }
}

impl<T: SMBTransport> Read for FileReader<'_, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.position >= self.buffer.len() {
            match self.next() {
                Some(Ok(chunk)) => {
                    self.buffer = chunk;
                    self.position = 0;
                }
                Some(Err(e)) => return Err(io::Error::other(e)),
                None => return Ok(0),
            }
        }
        let count = buf.len().min(self.buffer.len() - self.position);
        buf[..count].copy_from_slice(&self.buffer[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

impl<T: SMBTransport> Drop for FileReader<'_, T> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl<T: SMBTransport> SMBClient<T> {
    /// Reads `path` lazily, one chunk per READ.
    pub fn read_file(&mut self, path: &str) -> SMBResult<FileReader<'_, T>> {
        self.require_tree()?;
        let path = normalize_path(path);
        let (handle, _) = self.open(
            &path,
            SMBAccessMask::FILE_READ_DATA | SMBAccessMask::FILE_READ_ATTRIBUTES,
            SMBCreateDisposition::Open,
            SMBCreateOptions::NON_DIRECTORY_FILE,
        )?;
        debug!(path = path.as_str(), size = handle.end_of_file(), "reading file");
        Ok(FileReader::new(self, handle))
    }

    /// Reads the whole of `path` into memory.
    pub fn read_all(&mut self, path: &str) -> SMBResult<Vec<u8>> {
        let mut content = Vec::new();
        for chunk in self.read_file(path)? {
            content.extend_from_slice(&chunk?);
        }
        Ok(content)
    }

    /// Creates or truncates `path` and fills it from `source`, one WRITE per
    /// chunk at explicit offsets. Returns the number of bytes written.
    ///
    /// A failed WRITE, a short write or a failing `source` ends with
    /// [`SMBError::WriteError`] carrying the offset of the chunk. What was
    /// written before stays on the server.
    pub fn write_file<R: Read>(&mut self, path: &str, mut source: R) -> SMBResult<u64> {
        self.require_tree()?;
        let path = normalize_path(path);
        let (mut handle, _) = self.open(
            &path,
            SMBAccessMask::FILE_WRITE_DATA | SMBAccessMask::FILE_WRITE_ATTRIBUTES,
            SMBCreateDisposition::OverwriteIf,
            SMBCreateOptions::NON_DIRECTORY_FILE,
        )?;
        let chunk_size = self.write_chunk_size() as usize;
        let mut chunk = vec![0; chunk_size];
        loop {
            let offset = handle.cursor();
            let length = match fill_chunk(&mut source, &mut chunk) {
                Ok(length) => length,
                Err(e) => {
                    self.close_quietly(handle);
                    return Err(SMBError::write_error(offset, SMBError::io_error(e)));
                }
            };
            if length == 0 {
                break;
            }
            if let Err(e) = self.write_chunk(&handle, offset, chunk[..length].to_vec()) {
                self.close_quietly(handle);
                return Err(SMBError::write_error(offset, e));
            }
            handle.advance(length as u64);
            if length < chunk_size {
                break;
            }
        }
        let written = handle.cursor();
        self.close_handle(handle, SMBCloseFlags::empty())
            .map_err(|e| SMBError::write_error(written, e))?;
        debug!(path = path.as_str(), written, "wrote file");
        Ok(written)
    }

    pub fn write_all(&mut self, path: &str, content: &[u8]) -> SMBResult<u64> {
        self.write_file(path, content)
    }

    fn write_chunk(&mut self, handle: &SMBFileHandle, offset: u64, data: Vec<u8>) -> SMBResult<()> {
        let length = data.len();
        let request = SMBWriteRequest::new(handle.file_id(), offset, data);
        let response = self.exchange(SMBCommandCode::Write, SMBBody::WriteRequest(request))?;
        expect_success_for(&response, handle.path())?;
        trace!(path = handle.path(), offset, length, "wrote chunk");
        match response.body {
            SMBBody::WriteResponse(body) if body.count as usize == length => Ok(()),
            SMBBody::WriteResponse(body) => Err(SMBError::io_error(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("server accepted {} of {} bytes", body.count, length),
            ))),
            _ => Err(self.fail(SMBError::protocol_error("WRITE succeeded without a WRITE response"))),
        }
    }

    /// Deletes the file `path`.
    pub fn delete_file(&mut self, path: &str) -> SMBResult<()> {
        self.delete_path(path, SMBCreateOptions::NON_DIRECTORY_FILE)
    }

    /// Opens `path` for deletion, marks it delete-pending and closes it. No
    /// CLOSE is sent when the open itself fails.
    pub(crate) fn delete_path(&mut self, path: &str, options: SMBCreateOptions) -> SMBResult<()> {
        self.require_tree()?;
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(SMBError::AccessDenied("\\".into()));
        }
        let (handle, _) = self.open(&path, SMBAccessMask::DELETE, SMBCreateDisposition::Open, options)?;
        let request = SMBSetInfoRequest::disposition(handle.file_id(), SMBFileDispositionInformation { delete_pending: true });
        self.set_info_then_close(handle, request)?;
        debug!(path = path.as_str(), "deleted");
        Ok(())
    }

    /// Renames `path` to `new_path`, both relative to the share root. An
    /// existing `new_path` is never replaced.
    pub fn rename(&mut self, path: &str, new_path: &str) -> SMBResult<()> {
        self.require_tree()?;
        let path = normalize_path(path);
        let new_path = normalize_path(new_path);
        if path.is_empty() || new_path.is_empty() {
            return Err(SMBError::AccessDenied("\\".into()));
        }
        let (handle, _) = self.open(&path, SMBAccessMask::DELETE, SMBCreateDisposition::Open, SMBCreateOptions::empty())?;
        let request = SMBSetInfoRequest::rename(handle.file_id(), &SMBFileRenameInformation::new(new_path.as_str(), false));
        self.set_info_then_close(handle, request)
            .map_err(|e| match e {
                SMBError::AlreadyExists(_) => SMBError::AlreadyExists(new_path.clone()),
                other => other,
            })?;
        debug!(from = path.as_str(), to = new_path.as_str(), "renamed");
        Ok(())
    }

    fn set_info_then_close(&mut self, handle: SMBFileHandle, request: SMBSetInfoRequest) -> SMBResult<()> {
        let result = self.exchange(SMBCommandCode::SetInfo, SMBBody::SetInfoRequest(request))
            .and_then(|response| expect_success_for(&response, handle.path()));
        match result {
            Ok(()) => {
                self.close_handle(handle, SMBCloseFlags::empty())?;
                Ok(())
            }
            Err(e) => {
                self.close_quietly(handle);
                Err(e)
            }
        }
    }
}

/// Reads until `chunk` is full or `source` is exhausted.
fn fill_chunk<R: Read>(source: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < chunk.len() {
        match source.read(&mut chunk[filled..]) {
            Ok(0) => break,
            Ok(count) => filled += count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
