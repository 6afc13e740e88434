use std::io::ErrorKind;

use socks4::{connect, from_url, AddressingMode, ClientConfig, Dialer, Error, TcpOpener};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Reads one SOCKS4 request up to its final NUL fields and returns it.
async fn read_request(stream: &mut TcpStream, is_4a: bool) -> Vec<u8> {
    let mut request = vec![0u8; 8];
    stream.read_exact(&mut request).await.unwrap();

    let mut nuls = if is_4a { 2 } else { 1 };
    while nuls > 0 {
        let b = stream.read_u8().await.unwrap();
        request.push(b);
        if b == 0 {
            nuls -= 1;
        }
    }
    request
}

/// One-shot proxy answering `status`, then echoing when granted.
async fn spawn_proxy(status: u8, is_4a: bool) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream, is_4a).await;
        stream
            .write_all(&[0, status, 0x12, 0x34, 1, 2, 3, 4])
            .await
            .unwrap();

        if status == 0x5a {
            let mut buf = [0u8; 64];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                stream.write_all(&buf[..n]).await.unwrap();
            }
        } else {
            // the client hangs up on refusal
            let mut rest = Vec::new();
            stream.read_to_end(&mut rest).await.unwrap();
            assert!(rest.is_empty());
        }
        request
    });

    (addr, handle)
}

#[tokio::test]
async fn socks4a_tunnel_echoes() {
    let (proxy, handle) = spawn_proxy(0x5a, true).await;
    let dialer = from_url(&format!("socks4a://{}", proxy), TcpOpener).unwrap();

    let mut stream = dialer.dial("tcp", "example.com:1080").await.unwrap();
    stream.write_all(b"ping").await.unwrap();
    let mut pong = [0u8; 4];
    stream.read_exact(&mut pong).await.unwrap();
    assert_eq!(&pong, b"ping");
    drop(stream);

    let request = handle.await.unwrap();
    assert!(request.starts_with(&[0x04, 0x01, 0x04, 0x38, 0, 0, 0, 1]));
    assert!(request.ends_with(b"nobody@0.0.0.0\0example.com\0"));
}

#[tokio::test]
async fn socks4_ip_literal_needs_no_dns() {
    let (proxy, handle) = spawn_proxy(0x5a, false).await;

    let stream = connect(&proxy, "93.184.216.34:80", &ClientConfig::default())
        .await
        .unwrap();
    drop(stream);

    let request = handle.await.unwrap();
    assert_eq!(
        request,
        [
            0x04, 0x01, 0x00, 0x50, 0x5d, 0xb8, 0xd8, 0x22, 0x6e, 0x6f, 0x62, 0x6f, 0x64, 0x79,
            0x40, 0x30, 0x2e, 0x30, 0x2e, 0x30, 0x2e, 0x30, 0x00,
        ]
    );
}

#[tokio::test]
async fn rejection_reaches_caller() {
    let (proxy, handle) = spawn_proxy(0x5b, true).await;
    let config = ClientConfig::new(AddressingMode::HostnameRelay).with_identity("carol");

    let err = connect(&proxy, "blocked.example:443", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rejected(0x5b)));
    assert!(err.is_protocol_outcome());

    let request = handle.await.unwrap();
    assert!(request.ends_with(b"carol\0blocked.example\0"));
}

#[tokio::test]
async fn unreachable_proxy_is_connect_error() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = connect(&addr, "example.com:80", &ClientConfig::default())
        .await
        .unwrap_err();
    match err {
        Error::Connect(e) => assert_eq!(e.kind(), ErrorKind::ConnectionRefused),
        other => panic!("unexpected {:?}", other),
    }
}
