// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::core::keys::KEY_SIZE;
use crate::error::ChannelError;
use crate::protocol::handshake::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_secure_handshake_flow() {
    let (mut client_io, mut server_io) = duplex(256);

    let (client, server) =
        futures::future::join(initiate(&mut client_io), respond(&mut server_io)).await;
    let client = client.expect("Initiator should complete");
    let server = server.expect("Responder should complete");

    // Each side learned exactly the key the other generated
    assert_eq!(client.peer_public(), server.local_public());
    assert_eq!(server.peer_public(), client.local_public());
    assert_ne!(client.local_public(), server.local_public());
}

#[tokio::test]
async fn test_handshake_sends_raw_key_only() {
    let (mut client_io, mut peer_io) = duplex(256);

    let peer = tokio::spawn(async move {
        let mut received = [0u8; KEY_SIZE];
        peer_io.read_exact(&mut received).await.unwrap();
        // Reply with a valid key so the initiator completes
        let reply = crate::core::keys::KeyPair::generate_os().unwrap();
        peer_io.write_all(reply.public().as_bytes()).await.unwrap();

        let mut rest = Vec::new();
        let _ = peer_io.read_to_end(&mut rest).await;
        (received, rest)
    });

    let session = initiate(&mut client_io).await.unwrap();
    drop(client_io);

    let (received, rest) = peer.await.unwrap();
    assert_eq!(&received, session.local_public().as_bytes());
    assert!(rest.is_empty(), "no framing around the public key");
}

#[tokio::test]
async fn test_short_handshake_rejected() {
    let (mut server_io, mut peer_io) = duplex(256);

    peer_io.write_all(&[0x42; 16]).await.unwrap();
    drop(peer_io);

    let result = respond(&mut server_io).await;
    match result {
        Err(ChannelError::HandshakeIncomplete { expected, actual }) => {
            assert_eq!(expected, HANDSHAKE_LEN);
            assert_eq!(actual, 16);
        }
        other => panic!("Expected HandshakeIncomplete, got {other:?}"),
    }
}

#[tokio::test]
async fn test_initiator_rejects_short_reply() {
    let (mut client_io, mut peer_io) = duplex(256);

    let peer = tokio::spawn(async move {
        let mut received = [0u8; KEY_SIZE];
        peer_io.read_exact(&mut received).await.unwrap();
        peer_io.write_all(&[7u8; 10]).await.unwrap();
    });

    let result = initiate(&mut client_io).await;
    peer.await.unwrap();
    assert!(matches!(
        result,
        Err(ChannelError::HandshakeIncomplete {
            expected: 32,
            actual: 10
        })
    ));
}

#[tokio::test]
async fn test_low_order_peer_key_rejected() {
    let (mut server_io, mut peer_io) = duplex(256);

    peer_io.write_all(&[0u8; KEY_SIZE]).await.unwrap();

    let result = respond(&mut server_io).await;
    assert!(matches!(result, Err(ChannelError::InvalidPeerKey)));
}

#[tokio::test]
async fn test_seeded_handshake_is_reproducible() {
    let mut first = Vec::new();

    for _ in 0..2 {
        let (mut client_io, mut server_io) = duplex(256);
        let mut client_rng = StdRng::seed_from_u64(1);
        let mut server_rng = StdRng::seed_from_u64(2);

        let (client, server) = futures::future::join(
            perform(&mut client_io, Role::Initiator, &mut client_rng),
            perform(&mut server_io, Role::Responder, &mut server_rng),
        )
        .await;

        let keys = (
            client.unwrap().local_public().to_bytes(),
            server.unwrap().local_public().to_bytes(),
        );
        first.push(keys);
    }

    assert_eq!(first[0], first[1]);
}
