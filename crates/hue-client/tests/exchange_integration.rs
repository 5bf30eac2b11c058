//! End-to-end tests: `ColorExchangeClient` over `TcpTransport` against a
//! real `hue-peer` server and against hand-rolled fake peers.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use hue_client::infrastructure::network::mock::RecordingTransport;
use hue_client::{
    ColorExchangeClient, Endpoint, ExchangeSettings, PullOutcome, PushOutcome, Target,
    TcpTransport, TcpTransportConfig,
};
use hue_core::{Color, Packet, SharedSecret};
use hue_peer::{PeerConfig, PeerServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn settings_for(port: u16, verify_responses: bool) -> ExchangeSettings {
    let target = Target {
        endpoint: Endpoint::new("127.0.0.1", port),
        secret: SharedSecret::new("SHARED_SECRET"),
    };
    ExchangeSettings {
        push: target.clone(),
        pull: target,
        verify_responses,
    }
}

#[tokio::test]
async fn test_push_then_verified_request_against_peer() {
    // Arrange: a real peer on an ephemeral port
    let config = PeerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ..PeerConfig::default()
    };
    let server = PeerServer::bind(&config).await.unwrap();
    let port = server.local_addr().unwrap().port();
    let device = server.device();
    let running = Arc::new(AtomicBool::new(true));
    let serve = tokio::spawn(server.serve(Arc::clone(&running)));

    let client = ColorExchangeClient::new(
        Arc::new(TcpTransport::default()),
        settings_for(port, true),
    );
    let orange = Color::from_unit(1.0, 0.5, 0.0);

    // Act
    let pushed = client.send_color(orange).await.unwrap();
    for _ in 0..100 {
        if device.lock().await.color() == orange {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let pulled = client.request_color().await;

    // Assert
    assert_eq!(pushed, PushOutcome::Sent { bytes_written: 52 });
    assert_eq!(pulled, PullOutcome::Received(orange));

    running.store(false, Ordering::Relaxed);
    serve.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_fake_peer_receives_exact_push_bytes() {
    // Arrange: a peer that records whatever arrives
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        socket.read_to_end(&mut received).await.unwrap();
        received
    });
    let client = ColorExchangeClient::new(
        Arc::new(TcpTransport::default()),
        settings_for(port, false),
    );

    // Act
    let outcome = client.push_color(Color::from_unit(1.0, 0.0, 0.0)).await;
    let received = peer.await.unwrap();

    // Assert
    assert_eq!(outcome, PushOutcome::Sent { bytes_written: 52 });
    assert_eq!(received.len(), 52);
    assert_eq!(&received[49..], &[0xFF, 0x00, 0x00]);
    let packet = Packet::decode(&received).unwrap();
    assert!(packet.verify(&SharedSecret::new("SHARED_SECRET")).is_ok());
}

#[tokio::test]
async fn test_short_reply_from_fake_peer_is_short_response() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 50];
        socket.read_exact(&mut request).await.unwrap();
        socket.write_all(&[1, 2, 3, 4, 5]).await.unwrap();
    });
    let client = ColorExchangeClient::new(
        Arc::new(TcpTransport::default()),
        settings_for(port, false),
    );

    let outcome = client.request_color().await;

    assert_eq!(
        outcome,
        PullOutcome::ShortResponse {
            len: 5,
            partial: Color::BLACK
        }
    );
}

#[tokio::test]
async fn test_reply_from_peer_that_keeps_socket_open_is_received() {
    // Arrange: the peer answers, then holds the connection instead of closing
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 50];
        socket.read_exact(&mut request).await.unwrap();
        socket
            .write_all(&[0, 0, 0, 0, 0, 0, 0, 0, 0x11, 0x22, 0x33])
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });
    let transport = TcpTransport::new(TcpTransportConfig {
        io_timeout: Duration::from_millis(300),
        ..TcpTransportConfig::default()
    });
    let client = ColorExchangeClient::new(Arc::new(transport), settings_for(port, false));

    // Act
    let outcome = client.request_color().await;

    // Assert
    assert_eq!(outcome, PullOutcome::Received(Color::new(0x11, 0x22, 0x33)));
    peer.abort();
}

#[tokio::test]
async fn test_unreachable_peer_is_transport_failed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let client = ColorExchangeClient::new(
        Arc::new(TcpTransport::default()),
        settings_for(port, false),
    );

    assert_eq!(client.request_color().await, PullOutcome::TransportFailed);
    assert_eq!(
        client.push_color(Color::BLACK).await,
        PushOutcome::TransportFailed
    );
}

#[tokio::test]
async fn test_recording_transport_sees_push_and_pull_targets() {
    // Arrange: push and pull point at different ports
    let transport = Arc::new(RecordingTransport::replying(vec![0, 0, 0, 0, 0, 0, 0, 0, 7, 8, 9]));
    let mut settings = settings_for(1000, false);
    settings.pull.endpoint = Endpoint::new("127.0.0.1", 2000);
    let client = ColorExchangeClient::new(transport.clone(), settings);

    // Act
    client.push_color(Color::new(1, 1, 1)).await;
    let pulled = client.request_color().await;

    // Assert
    let sent = transport.sent_packets();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].endpoint.port, 1000);
    assert_eq!(sent[0].packet.len(), 52);
    assert!(!sent[0].await_response);
    assert_eq!(sent[1].endpoint.port, 2000);
    assert_eq!(sent[1].packet.len(), 50);
    assert!(sent[1].await_response);
    assert_eq!(pulled.color(), Some(Color::new(7, 8, 9)));
}
