use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use smb_core::logging::trace;
use smb_core::SMBResult;
use smb_core::error::SMBError;

use crate::socket::message_stream::{MAX_FRAME_SIZE, SMBReadStream, SMBWriteStream, stream_error};

const FRAME_HEADER_SIZE: usize = 4;

impl<Reader> SMBReadStream for Reader where Reader: Read + Send {
    fn read_packet(&mut self) -> SMBResult<(u8, Vec<u8>)> {
        let mut header = [0_u8; FRAME_HEADER_SIZE];
        self.read_exact(&mut header).map_err(stream_error)?;
        let packet_type = header[0];
        let length = u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize;
        trace!(packet_type, length, "read frame header");
        let mut payload = vec![0_u8; length];
        self.read_exact(&mut payload).map_err(stream_error)?;
        Ok((packet_type, payload))
    }
}

impl<Writer> SMBWriteStream for Writer where Writer: Write + Send {
    fn write_packet(&mut self, packet_type: u8, payload: &[u8]) -> SMBResult<usize> {
        if payload.len() > MAX_FRAME_SIZE {
            return Err(SMBError::parse_error(format!("Frame of {} bytes exceeds the session service limit", payload.len())));
        }
        let mut frame = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
        frame.put_u8(packet_type);
        frame.put_uint(payload.len() as u64, 3);
        frame.put_slice(payload);
        self.write_all(&frame).map_err(stream_error)?;
        self.flush().map_err(stream_error)?;
        Ok(frame.len())
    }
}
