use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use smb_core::logging::{debug, trace};
use smb_core::SMBResult;
use smb_core::error::SMBError;

use crate::socket::netbios::{NetBIOSName, NetBIOSSessionPacket};

mod stream_sync;

/// Largest message a frame length can describe.
pub const MAX_FRAME_SIZE: usize = 0x00FF_FFFF;

pub const SESSION_MESSAGE: u8 = 0x00;
pub const SESSION_KEEP_ALIVE: u8 = 0x85;

/// Moves whole SMB2 messages between the client and a server.
pub trait SMBTransport: Send {
    /// Writes one message as a single frame.
    fn send(&mut self, message: &[u8]) -> SMBResult<()>;

    /// Blocks until the next message frame has been read in full.
    fn receive(&mut self) -> SMBResult<Vec<u8>>;

    /// Shuts the connection down. Calling it again does nothing.
    fn close(&mut self) -> SMBResult<()>;
}

pub trait SMBReadStream: Send {
    /// Reads one session-service packet of any type.
    fn read_packet(&mut self) -> SMBResult<(u8, Vec<u8>)>;

    /// Reads the next session message, skipping keep-alives.
    fn read_frame(&mut self) -> SMBResult<Vec<u8>> {
        loop {
            match self.read_packet()? {
                (SESSION_MESSAGE, message) => return Ok(message),
                (SESSION_KEEP_ALIVE, _) => trace!("skipping session keep-alive"),
                (packet_type, _) => {
                    return Err(SMBError::protocol_error(format!("Unexpected session packet type 0x{:02x}", packet_type)));
                }
            }
        }
    }
}

pub trait SMBWriteStream: Send {
    fn write_packet(&mut self, packet_type: u8, payload: &[u8]) -> SMBResult<usize>;

    fn write_frame(&mut self, message: &[u8]) -> SMBResult<usize> {
        self.write_packet(SESSION_MESSAGE, message)
    }
}

/// A connection to one server over a read half and a write half.
#[derive(Debug)]
pub struct SMBSocketConnection<R: SMBReadStream, W: SMBWriteStream> {
    name: String,
    streams: Option<(R, W)>,
}

impl<R: SMBReadStream, W: SMBWriteStream> SMBSocketConnection<R, W> {
    pub fn new(name: String, read_stream: R, write_stream: W) -> Self {
        Self {
            name,
            streams: Some((read_stream, write_stream)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.streams.is_none()
    }

    pub fn streams(&mut self) -> SMBResult<(&mut R, &mut W)> {
        match &mut self.streams {
            Some((read, write)) => Ok((read, write)),
            None => Err(SMBError::connection_lost(io::Error::new(io::ErrorKind::NotConnected, "connection closed"))),
        }
    }

    pub fn into_streams(self) -> Option<(R, W)> {
        self.streams
    }

    /// Opens a NetBIOS session [RFC 1002 4.3.2] before any SMB traffic.
    /// Port 139 servers refuse messages until this succeeds.
    pub fn request_session(&mut self, called: &NetBIOSName, calling: &NetBIOSName) -> SMBResult<()> {
        let request = NetBIOSSessionPacket::Request { called: called.clone(), calling: calling.clone() };
        let (read, write) = self.streams()?;
        write.write_packet(request.packet_type(), &request.payload())?;
        let (packet_type, payload) = read.read_packet()?;
        match NetBIOSSessionPacket::parse(packet_type, &payload)? {
            NetBIOSSessionPacket::PositiveResponse => {
                debug!(called = %called, "NetBIOS session established");
                Ok(())
            }
            NetBIOSSessionPacket::NegativeResponse(code) => Err(SMBError::connection_error(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("NetBIOS session refused with error 0x{:02x}", code),
            ))),
            other => Err(SMBError::connection_error(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("Unexpected NetBIOS session reply {:?}", other),
            ))),
        }
    }
}

impl SMBSocketConnection<TcpStream, TcpStream> {
    /// Connects to the first reachable address of `host:port`. `timeout`
    /// bounds the connect and becomes the read and write timeout.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> SMBResult<Self> {
        let addrs = (host, port).to_socket_addrs().map_err(SMBError::connection_error)?;
        let mut last_error = io::Error::new(io::ErrorKind::NotFound, format!("no addresses for {}", host));
        for addr in addrs {
            trace!(%addr, "connecting");
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout)).map_err(SMBError::connection_error)?;
                    stream.set_write_timeout(Some(timeout)).map_err(SMBError::connection_error)?;
                    stream.set_nodelay(true).map_err(SMBError::connection_error)?;
                    let write = stream.try_clone().map_err(SMBError::connection_error)?;
                    return Ok(SMBSocketConnection::new(addr.to_string(), stream, write));
                }
                Err(e) => last_error = e,
            }
        }
        Err(SMBError::connection_error(last_error))
    }
}

impl<R: SMBReadStream, W: SMBWriteStream> SMBTransport for SMBSocketConnection<R, W> {
    fn send(&mut self, message: &[u8]) -> SMBResult<()> {
        let (_, write) = self.streams()?;
        write.write_frame(message)?;
        Ok(())
    }

    fn receive(&mut self) -> SMBResult<Vec<u8>> {
        let (read, _) = self.streams()?;
        read.read_frame()
    }

    fn close(&mut self) -> SMBResult<()> {
        if self.streams.take().is_some() {
            debug!(name = self.name.as_str(), "connection closed");
        }
        Ok(())
    }
}

/// Maps a stream failure onto the session error it represents.
pub(crate) fn stream_error(error: io::Error) -> SMBError {
    match error.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SMBError::timeout("server response"),
        _ => SMBError::connection_lost(error),
    }
}
