use std::fmt::{Display, Formatter};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use smb_core::SMBResult;
use smb_core::error::SMBError;
use smb_core::logging::{debug, trace};

const SESSION_REQUEST: u8 = 0x81;
const POSITIVE_SESSION_RESPONSE: u8 = 0x82;
const NEGATIVE_SESSION_RESPONSE: u8 = 0x83;
const RETARGET_SESSION_RESPONSE: u8 = 0x84;

const NAME_LENGTH: usize = 15;
const ENCODED_NAME_LENGTH: usize = 34;

pub const NAME_SERVICE_PORT: u16 = 137;

const RECURSION_DESIRED: u16 = 0x0100;
const BROADCAST: u16 = 0x0010;
const RESPONSE: u16 = 0x8000;
const RCODE_MASK: u16 = 0x000F;
const RR_TYPE_NB: u16 = 0x0020;
const RR_CLASS_IN: u16 = 0x0001;
const NAME_SERVICE_HEADER_LENGTH: usize = 12;
const ADDRESS_ENTRY_LENGTH: usize = 6;
const MAX_DATAGRAM_LENGTH: usize = 576;

/// A 16-byte NetBIOS name: up to 15 characters and a service suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetBIOSName {
    name: String,
    suffix: u8,
}

impl NetBIOSName {
    /// The file server service (`<20>`).
    pub fn server<T: Into<String>>(name: T) -> Self {
        Self { name: name.into(), suffix: 0x20 }
    }

    /// The workstation service (`<00>`).
    pub fn workstation<T: Into<String>>(name: T) -> Self {
        Self { name: name.into(), suffix: 0x00 }
    }

    /// First-level encoding [RFC 1001 14.1]: each nibble of the padded name
    /// becomes a letter from 'A', wrapped as a length-prefixed label.
    pub fn encode(&self) -> Vec<u8> {
        let mut raw: Vec<u8> = self.name.to_uppercase().bytes().take(NAME_LENGTH).collect();
        raw.resize(NAME_LENGTH, b' ');
        raw.push(self.suffix);

        let mut encoded = Vec::with_capacity(ENCODED_NAME_LENGTH);
        encoded.push(32);
        for byte in raw {
            encoded.push(b'A' + (byte >> 4));
            encoded.push(b'A' + (byte & 0x0F));
        }
        encoded.push(0);
        encoded
    }

    pub fn decode(bytes: &[u8]) -> SMBResult<Self> {
        if bytes.len() < ENCODED_NAME_LENGTH || bytes[0] != 32 || bytes[33] != 0 {
            return Err(SMBError::parse_error("Invalid NetBIOS name"));
        }
        let raw = bytes[1..33]
            .chunks(2)
            .map(|pair| {
                let high = pair[0].checked_sub(b'A').filter(|n| *n < 16);
                let low = pair[1].checked_sub(b'A').filter(|n| *n < 16);
                match (high, low) {
                    (Some(high), Some(low)) => Ok((high << 4) | low),
                    _ => Err(SMBError::parse_error("Invalid NetBIOS name encoding")),
                }
            })
            .collect::<SMBResult<Vec<u8>>>()?;
        let name = String::from_utf8_lossy(&raw[..NAME_LENGTH]).trim_end().to_string();
        Ok(Self { name, suffix: raw[NAME_LENGTH] })
    }
}

/// Whether `host` is a bare NetBIOS name rather than an address or a DNS name.
pub fn is_netbios_name(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= NAME_LENGTH
        && !host.contains('.')
        && !host.eq_ignore_ascii_case("localhost")
        && host.parse::<IpAddr>().is_err()
}

impl Display for NetBIOSName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<{:02x}>", self.name, self.suffix)
    }
}

/// NetBIOS session service packets exchanged before SMB traffic starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetBIOSSessionPacket {
    Request { called: NetBIOSName, calling: NetBIOSName },
    PositiveResponse,
    NegativeResponse(u8),
    RetargetResponse(Ipv4Addr, u16),
}

impl NetBIOSSessionPacket {
    pub fn packet_type(&self) -> u8 {
        match self {
            Self::Request { .. } => SESSION_REQUEST,
            Self::PositiveResponse => POSITIVE_SESSION_RESPONSE,
            Self::NegativeResponse(_) => NEGATIVE_SESSION_RESPONSE,
            Self::RetargetResponse(..) => RETARGET_SESSION_RESPONSE,
        }
    }

    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::Request { called, calling } => [called.encode(), calling.encode()].concat(),
            Self::PositiveResponse => Vec::new(),
            Self::NegativeResponse(code) => vec![*code],
            Self::RetargetResponse(ip, port) => [ip.octets().to_vec(), port.to_be_bytes().to_vec()].concat(),
        }
    }

    pub fn parse(packet_type: u8, payload: &[u8]) -> SMBResult<Self> {
        match packet_type {
            SESSION_REQUEST => {
                if payload.len() < 2 * ENCODED_NAME_LENGTH {
                    return Err(SMBError::payload_too_small(2 * ENCODED_NAME_LENGTH, payload.len()));
                }
                Ok(Self::Request {
                    called: NetBIOSName::decode(&payload[..ENCODED_NAME_LENGTH])?,
                    calling: NetBIOSName::decode(&payload[ENCODED_NAME_LENGTH..])?,
                })
            }
            POSITIVE_SESSION_RESPONSE => Ok(Self::PositiveResponse),
            NEGATIVE_SESSION_RESPONSE => payload.first()
                .map(|code| Self::NegativeResponse(*code))
                .ok_or_else(|| SMBError::payload_too_small(1_usize, 0_usize)),
            RETARGET_SESSION_RESPONSE => match payload {
                [a, b, c, d, high, low, ..] => Ok(Self::RetargetResponse(Ipv4Addr::new(*a, *b, *c, *d), u16::from_be_bytes([*high, *low]))),
                _ => Err(SMBError::payload_too_small(6_usize, payload.len())),
            },
            _ => Err(SMBError::parse_error(format!("Unknown NetBIOS session packet 0x{:02x}", packet_type))),
        }
    }
}

/// NAME QUERY REQUEST [RFC 1002 4.2.12].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetBIOSNameQuery {
    pub transaction_id: u16,
    pub name: NetBIOSName,
    pub broadcast: bool,
}

/// What a NAME QUERY RESPONSE [RFC 1002 4.2.13] says about the queried name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetBIOSNameQueryAnswer {
    Positive(Vec<Ipv4Addr>),
    Negative(u16),
}

impl NetBIOSNameQuery {
    pub fn new(name: NetBIOSName, broadcast: bool) -> Self {
        Self { transaction_id: rand::random(), name, broadcast }
    }

    pub fn encode(&self) -> Vec<u8> {
        let flags = if self.broadcast { RECURSION_DESIRED | BROADCAST } else { RECURSION_DESIRED };
        [
            self.transaction_id.to_be_bytes().to_vec(),
            flags.to_be_bytes().to_vec(),
            // QDCOUNT 1, no answer, authority or additional records.
            vec![0, 1, 0, 0, 0, 0, 0, 0],
            self.name.encode(),
            RR_TYPE_NB.to_be_bytes().to_vec(),
            RR_CLASS_IN.to_be_bytes().to_vec(),
        ].concat()
    }

    /// `None` when `packet` is not a response to this query.
    pub fn parse_response(&self, packet: &[u8]) -> SMBResult<Option<NetBIOSNameQueryAnswer>> {
        if packet.len() < NAME_SERVICE_HEADER_LENGTH {
            return Err(SMBError::payload_too_small(NAME_SERVICE_HEADER_LENGTH, packet.len()));
        }
        let transaction_id = u16::from_be_bytes([packet[0], packet[1]]);
        let flags = u16::from_be_bytes([packet[2], packet[3]]);
        if transaction_id != self.transaction_id || flags & RESPONSE == 0 {
            return Ok(None);
        }
        let rcode = flags & RCODE_MASK;
        if rcode != 0 {
            return Ok(Some(NetBIOSNameQueryAnswer::Negative(rcode)));
        }
        let answers = u16::from_be_bytes([packet[6], packet[7]]);
        let record = &packet[NAME_SERVICE_HEADER_LENGTH..];
        if answers == 0 {
            return Ok(Some(NetBIOSNameQueryAnswer::Positive(Vec::new())));
        }
        // RR_NAME is either the full encoded name or a 2-byte pointer to it.
        let name_length = match record.first() {
            Some(byte) if byte & 0xC0 == 0xC0 => 2,
            _ => ENCODED_NAME_LENGTH,
        };
        // RR_TYPE, RR_CLASS, TTL and RDLENGTH follow the name.
        let rdata_start = name_length + 10;
        if record.len() < rdata_start {
            return Err(SMBError::payload_too_small(rdata_start, record.len()));
        }
        let rdata_length = u16::from_be_bytes([record[rdata_start - 2], record[rdata_start - 1]]) as usize;
        let rdata = record.get(rdata_start..rdata_start + rdata_length)
            .ok_or_else(|| SMBError::payload_too_small(rdata_start + rdata_length, record.len()))?;
        let addresses = rdata.chunks_exact(ADDRESS_ENTRY_LENGTH)
            .map(|entry| Ipv4Addr::new(entry[2], entry[3], entry[4], entry[5]))
            .collect();
        Ok(Some(NetBIOSNameQueryAnswer::Positive(addresses)))
    }
}

/// Datagram socket the name service talks through.
pub trait NameServiceSocket {
    fn send_to(&mut self, packet: &[u8], target: SocketAddr) -> io::Result<()>;

    /// Waits at most `timeout` for the next datagram.
    fn recv(&mut self, buffer: &mut [u8], timeout: Duration) -> io::Result<usize>;
}

impl NameServiceSocket for UdpSocket {
    fn send_to(&mut self, packet: &[u8], target: SocketAddr) -> io::Result<()> {
        UdpSocket::send_to(self, packet, target).map(|_| ())
    }

    fn recv(&mut self, buffer: &mut [u8], timeout: Duration) -> io::Result<usize> {
        self.set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        self.recv_from(buffer).map(|(length, _)| length)
    }
}

/// Sends `query` to `target` and returns the first answer to it. Unrelated
/// or malformed datagrams are skipped.
pub fn query_name<S: NameServiceSocket>(socket: &mut S, query: &NetBIOSNameQuery, target: SocketAddr, timeout: Duration) -> SMBResult<Vec<Ipv4Addr>> {
    trace!(name = %query.name, %target, "sending name query");
    socket.send_to(&query.encode(), target).map_err(SMBError::connection_error)?;
    let deadline = Instant::now() + timeout;
    let mut buffer = [0_u8; MAX_DATAGRAM_LENGTH];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(SMBError::timeout(format!("no name query answer for {}", query.name)));
        }
        let length = match socket.recv(&mut buffer, remaining) {
            Ok(length) => length,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(SMBError::timeout(format!("no name query answer for {}", query.name)));
            }
            Err(e) => return Err(SMBError::connection_error(e)),
        };
        match query.parse_response(&buffer[..length]) {
            Ok(Some(NetBIOSNameQueryAnswer::Positive(addresses))) => return Ok(addresses),
            Ok(Some(NetBIOSNameQueryAnswer::Negative(rcode))) => {
                return Err(SMBError::connection_error(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} is not registered (rcode {})", query.name, rcode),
                )));
            }
            Ok(None) => trace!("skipping unrelated name service packet"),
            Err(e) => trace!(error = %e, "skipping malformed name service packet"),
        }
    }
}

/// Runs `query` through `socket`. Exactly one address must answer.
pub fn resolve_name_with<S: NameServiceSocket>(socket: &mut S, query: &NetBIOSNameQuery, target: SocketAddr, timeout: Duration) -> SMBResult<Ipv4Addr> {
    let addresses = query_name(socket, query, target, timeout)?;
    match addresses.as_slice() {
        [address] => {
            debug!(name = %query.name, %address, "resolved NetBIOS name");
            Ok(*address)
        }
        [] => Err(SMBError::connection_error(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address registered for {}", query.name),
        ))),
        _ => Err(SMBError::connection_error(io::Error::other(
            format!("{} resolves to {} addresses", query.name, addresses.len()),
        ))),
    }
}

/// Broadcasts a name query for the file server `name` on the local network.
pub fn resolve_name(name: &str, timeout: Duration) -> SMBResult<Ipv4Addr> {
    let mut socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(SMBError::connection_error)?;
    socket.set_broadcast(true).map_err(SMBError::connection_error)?;
    let target = SocketAddr::from((Ipv4Addr::BROADCAST, NAME_SERVICE_PORT));
    let query = NetBIOSNameQuery::new(NetBIOSName::server(name), true);
    resolve_name_with(&mut socket, &query, target, timeout)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use super::*;
    use crate::socket::message_stream::{SMBSocketConnection, SMBWriteStream};

    #[test]
    fn first_level_encoding() {
        // RFC 1001 14.1 example name "FRED"
        let encoded = NetBIOSName::workstation("Fred").encode();
        assert_eq!(encoded.len(), 34);
        assert_eq!(&encoded[1..9], b"EGFCEFEE");
        assert_eq!(&encoded[9..31], b"CACACACACACACACACACACA");
        assert_eq!(&encoded[31..34], b"AA\0");
        assert_eq!(NetBIOSName::decode(&encoded).unwrap(), NetBIOSName::workstation("FRED"));
    }

    #[test]
    fn server_suffix_and_truncation() {
        let name = NetBIOSName::server("*SMBSERVER");
        let encoded = name.encode();
        assert_eq!(&encoded[1..3], b"CK");
        assert_eq!(&encoded[31..33], b"CA");
        let long = NetBIOSName::server("ABCDEFGHIJKLMNOPQ").encode();
        assert_eq!(NetBIOSName::decode(&long).unwrap(), NetBIOSName::server("ABCDEFGHIJKLMNO"));
    }

    #[test]
    fn session_packets() {
        let request = NetBIOSSessionPacket::Request {
            called: NetBIOSName::server("*SMBSERVER"),
            calling: NetBIOSName::workstation("3DSCLIENT"),
        };
        assert_eq!(request.payload().len(), 68);
        assert_eq!(NetBIOSSessionPacket::parse(0x81, &request.payload()).unwrap(), request);
        assert_eq!(NetBIOSSessionPacket::parse(0x83, &[0x82]).unwrap(), NetBIOSSessionPacket::NegativeResponse(0x82));
        assert!(NetBIOSSessionPacket::parse(0x83, &[]).is_err());
        assert!(NetBIOSSessionPacket::parse(0x99, &[]).is_err());
    }

    #[test]
    fn session_request_handshake() {
        let mut reply = Vec::new();
        reply.write_packet(0x82, &[]).unwrap();
        let mut connection = SMBSocketConnection::new("test".into(), Cursor::new(reply), Vec::<u8>::new());
        connection.request_session(&NetBIOSName::server("*SMBSERVER"), &NetBIOSName::workstation("3DSCLIENT")).unwrap();
        let (_, written) = connection.into_streams().unwrap();
        assert_eq!(written[0], 0x81);
        assert_eq!(&written[1..4], &[0, 0, 68]);
    }

    #[test]
    fn negative_session_response_is_connection_error() {
        let mut reply = Vec::new();
        reply.write_packet(0x83, &[0x80]).unwrap();
        let mut connection = SMBSocketConnection::new("test".into(), Cursor::new(reply), Vec::<u8>::new());
        let result = connection.request_session(&NetBIOSName::server("X"), &NetBIOSName::workstation("Y"));
        assert!(matches!(result, Err(SMBError::ConnectionError(_))));
    }

    /// Answers queued datagrams, then times out.
    #[derive(Default)]
    struct QueuedSocket {
        sent: Vec<(Vec<u8>, SocketAddr)>,
        replies: VecDeque<Vec<u8>>,
    }

    impl NameServiceSocket for QueuedSocket {
        fn send_to(&mut self, packet: &[u8], target: SocketAddr) -> io::Result<()> {
            self.sent.push((packet.to_vec(), target));
            Ok(())
        }

        fn recv(&mut self, buffer: &mut [u8], _timeout: Duration) -> io::Result<usize> {
            let reply = self.replies.pop_front().ok_or_else(|| io::Error::from(io::ErrorKind::TimedOut))?;
            buffer[..reply.len()].copy_from_slice(&reply);
            Ok(reply.len())
        }
    }

    fn broadcast_target() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::BROADCAST, NAME_SERVICE_PORT))
    }

    fn positive_response(transaction_id: u16, name: &NetBIOSName, addresses: &[Ipv4Addr]) -> Vec<u8> {
        let rdata: Vec<u8> = addresses.iter()
            .flat_map(|address| [[0_u8, 0].as_slice(), address.octets().as_slice()].concat())
            .collect();
        [
            transaction_id.to_be_bytes().to_vec(),
            vec![0x85, 0x00, 0, 0, 0, 1, 0, 0, 0, 0],
            name.encode(),
            vec![0, 0x20, 0, 0x01, 0, 0, 0x01, 0x2C],
            (rdata.len() as u16).to_be_bytes().to_vec(),
            rdata,
        ].concat()
    }

    #[test]
    fn name_query_request_layout() {
        let query = NetBIOSNameQuery { transaction_id: 0x1234, name: NetBIOSName::server("3DS"), broadcast: true };
        let bytes = query.encode();
        assert_eq!(bytes.len(), 50);
        assert_eq!(&bytes[0..4], &[0x12, 0x34, 0x01, 0x10]);
        assert_eq!(&bytes[4..12], &[0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[12..46], NetBIOSName::server("3DS").encode().as_slice());
        assert_eq!(&bytes[46..50], &[0, 0x20, 0, 0x01]);
        let unicast = NetBIOSNameQuery { broadcast: false, ..query };
        assert_eq!(&unicast.encode()[2..4], &[0x01, 0x00]);
    }

    #[test]
    fn positive_and_negative_answers() {
        let name = NetBIOSName::server("3DS");
        let query = NetBIOSNameQuery { transaction_id: 7, name: name.clone(), broadcast: true };
        let address = Ipv4Addr::new(192, 168, 1, 20);
        assert_eq!(
            query.parse_response(&positive_response(7, &name, &[address])).unwrap(),
            Some(NetBIOSNameQueryAnswer::Positive(vec![address])),
        );
        assert_eq!(query.parse_response(&positive_response(8, &name, &[address])).unwrap(), None);
        let negative = [0, 7, 0x85, 0x03, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(query.parse_response(&negative).unwrap(), Some(NetBIOSNameQueryAnswer::Negative(3)));
        assert!(query.parse_response(&[0, 7, 0x85]).is_err());
    }

    #[test]
    fn resolve_skips_other_transactions() {
        let name = NetBIOSName::server("MYDS");
        let query = NetBIOSNameQuery { transaction_id: 0x0BAD, name: name.clone(), broadcast: true };
        let address = Ipv4Addr::new(10, 0, 0, 5);
        let mut socket = QueuedSocket::default();
        socket.replies.push_back(vec![0xFF; 4]);
        socket.replies.push_back(positive_response(0x0BAE, &name, &[Ipv4Addr::new(10, 0, 0, 9)]));
        socket.replies.push_back(positive_response(0x0BAD, &name, &[address]));

        assert_eq!(resolve_name_with(&mut socket, &query, broadcast_target(), Duration::from_secs(1)).unwrap(), address);
        let (packet, target) = &socket.sent[0];
        assert_eq!(*target, broadcast_target());
        assert_eq!(packet, &query.encode());
    }

    #[test]
    fn resolve_needs_exactly_one_address() {
        let name = NetBIOSName::server("MYDS");
        let query = NetBIOSNameQuery { transaction_id: 1, name: name.clone(), broadcast: true };
        let mut socket = QueuedSocket::default();
        socket.replies.push_back(positive_response(1, &name, &[Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)]));
        assert!(matches!(
            resolve_name_with(&mut socket, &query, broadcast_target(), Duration::from_secs(1)),
            Err(SMBError::ConnectionError(_)),
        ));

        socket.replies.push_back([0, 1, 0x85, 0x03, 0, 0, 0, 0, 0, 0, 0, 0].to_vec());
        assert!(matches!(
            resolve_name_with(&mut socket, &query, broadcast_target(), Duration::from_secs(1)),
            Err(SMBError::ConnectionError(_)),
        ));

        let result = resolve_name_with(&mut socket, &query, broadcast_target(), Duration::from_secs(1));
        assert!(matches!(result, Err(SMBError::Timeout(_))));
    }

    #[test]
    fn netbios_names_are_bare_labels() {
        assert!(is_netbios_name("MYDS"));
        assert!(is_netbios_name("3ds-kitchen"));
        assert!(!is_netbios_name("192.168.1.20"));
        assert!(!is_netbios_name("nas.local"));
        assert!(!is_netbios_name("localhost"));
        assert!(!is_netbios_name("::1"));
        assert!(!is_netbios_name("a-name-longer-than-15"));
        assert!(!is_netbios_name(""));
    }
}
