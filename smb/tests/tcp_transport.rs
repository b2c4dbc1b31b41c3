//! The client over a real TCP connection, with the in-memory server behind a
//! loopback listener.

mod common;

use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pretty_assertions::assert_eq;

use common::FakeServer;
use smb_client::client::{SMBClient, SMBClientConfig, SMBSessionState};
use smb_client::socket::{SMBReadStream, SMBTransport, SMBWriteStream};
use smb_client::util::auth::User;

const SESSION_REQUEST: u8 = 0x81;
const POSITIVE_SESSION_RESPONSE: u8 = 0x82;

/// Accepts one connection and relays its frames to `server` until the
/// client hangs up. Returns the number of NetBIOS session requests seen.
fn serve_once(server: FakeServer) -> (u16, JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut transport = server.transport();
        let mut session_requests = 0;
        while let Ok((packet_type, payload)) = stream.read_packet() {
            if packet_type == SESSION_REQUEST {
                session_requests += 1;
                stream.write_packet(POSITIVE_SESSION_RESPONSE, &[]).unwrap();
                continue;
            }
            transport.send(&payload).unwrap();
            while let Ok(response) = transport.receive() {
                stream.write_frame(&response).unwrap();
            }
        }
        session_requests
    });
    (port, handle)
}

fn config(port: u16, netbios_session: bool) -> SMBClientConfig {
    SMBClientConfig::builder()
        .host("127.0.0.1")
        .port(port)
        .share("microSD")
        .netbios_session(netbios_session)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[test]
fn direct_tcp_session() {
    let server = FakeServer::default();
    let (port, handle) = serve_once(server.clone());

    let mut client = SMBClient::connect(config(port, false), User::new("carol", "secret")).unwrap();
    assert_eq!(client.state(), SMBSessionState::TreeConnected);
    client.write_all("/hello.txt", b"over the wire").unwrap();
    assert_eq!(client.read_all("hello.txt").unwrap(), b"over the wire");
    let names: Vec<String> = client.list_directory("/").unwrap().map(|entry| entry.unwrap().name).collect();
    assert_eq!(names, vec!["hello.txt".to_string()]);
    client.disconnect();

    assert_eq!(handle.join().unwrap(), 0);
    assert_eq!(server.authenticated_user().as_deref(), Some("carol"));
    assert_eq!(server.file("hello.txt"), Some(b"over the wire".to_vec()));
}

#[test]
fn netbios_session_precedes_negotiate() {
    let server = FakeServer::default();
    let (port, handle) = serve_once(server.clone());

    let mut client = SMBClient::connect(config(port, true), User::new("dave", "pw")).unwrap();
    client.echo().unwrap();
    drop(client);

    assert_eq!(handle.join().unwrap(), 1);
}
