#![allow(clippy::unwrap_used)]

use async_std::net::TcpStream;
use futures::io::BufReader;
use rstest::rstest;

use hush::{
    key::PrivateKey,
    side::client::{Algorithms, Client},
    side::server::Server,
    Error, Session,
};
use hush_wire::trans::{DisconnectReason, Ignore, ServiceAccept, ServiceRequest};

mod common;

/// One full handshake for every supported algorithm in every class,
/// each exercised at least once, ending in a clean disconnect.
#[rstest]
// Key-exchange sweep.
#[case("curve25519-sha256", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("curve25519-sha256@libssh.org", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("ecdh-sha2-nistp256", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("ecdh-sha2-nistp384", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("ecdh-sha2-nistp521", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("diffie-hellman-group-exchange-sha256", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("diffie-hellman-group-exchange-sha1", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("diffie-hellman-group14-sha1", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("diffie-hellman-group1-sha1", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
// Host-key sweep.
#[case("curve25519-sha256", "ecdsa-sha2-nistp256", "aes256-ctr", "hmac-sha2-256")]
#[case("curve25519-sha256", "ecdsa-sha2-nistp384", "aes256-ctr", "hmac-sha2-256")]
#[case("curve25519-sha256", "ecdsa-sha2-nistp521", "aes256-ctr", "hmac-sha2-256")]
#[case("curve25519-sha256", "ssh-rsa", "aes256-ctr", "hmac-sha2-256")]
// Cipher and MAC sweep.
#[case("curve25519-sha256", "ssh-ed25519", "aes128-ctr", "hmac-sha2-512")]
#[case("curve25519-sha256", "ssh-ed25519", "aes128-cbc", "hmac-sha1")]
#[case("curve25519-sha256", "ssh-ed25519", "aes256-cbc", "hmac-sha2-512")]
#[case("curve25519-sha256", "ssh-ed25519", "aes128-ctr", "hmac-sha1")]
#[async_std::test]
async fn end_to_end(
    #[case] kex: &str,
    #[case] hostkey: &str,
    #[case] cipher: &str,
    #[case] mac: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let key = PrivateKey::generate(hostkey.parse()?)?;
    let (addr, handle) = common::server(Server {
        keys: vec![key],
        ..Default::default()
    })
    .await?;

    tracing::info!("kex::{kex}, key::{hostkey}, cipher::{cipher}, mac::{mac}, bound to {addr}");

    let stream = BufReader::new(TcpStream::connect(addr).await?);
    let mut client = Session::new(
        stream,
        Client {
            algorithms: Algorithms {
                kexs: vec![kex.parse()?],
                keys: vec![hostkey.parse()?],
                ciphers: vec![cipher.parse()?],
                macs: vec![mac.parse()?],
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .await?;

    client
        .send(&ServiceRequest {
            service_name: "ssh-userauth".into(),
        })
        .await?;
    client
        .recv()
        .await?
        .to::<ServiceAccept>()
        .expect("Service refused by peer");

    assert!(client.session_id().is_some());
    assert_eq!(client.exchanges(), 1);

    client
        .disconnect(DisconnectReason::ByApplication, "all done")
        .await;

    let message = handle.await;
    assert!(
        matches!(
            &message,
            Err(Error::Disconnected(err))
                if matches!(err.reason, DisconnectReason::ByApplication)
        ),
        "unexpected server outcome: {message:?}",
    );

    Ok(())
}

/// Negotiation must fail loudly when the offered sets do not intersect.
#[async_std::test]
async fn no_common_cipher_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let mut server = Server {
        keys: vec![PrivateKey::random()],
        ..Default::default()
    };
    server.algorithms.ciphers = vec!["aes128-cbc".parse()?];

    let (addr, handle) = common::server(server).await?;

    let stream = BufReader::new(TcpStream::connect(addr).await?);
    let mut client = Session::new(
        stream,
        Client {
            algorithms: Algorithms {
                ciphers: vec!["aes256-ctr".parse()?],
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .await?;

    client
        .send(&ServiceRequest {
            service_name: "ssh-userauth".into(),
        })
        .await
        .expect_err("the key-exchange should not have succeeded");

    assert!(handle.await.is_err());

    Ok(())
}

/// Sustained traffic over a tiny re-key threshold: the session stays
/// up, the identifier never changes, and fresh exchanges accumulate.
#[async_std::test]
async fn rekeying_preserves_the_session() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let (addr, handle) = common::server(Server {
        keys: vec![PrivateKey::random()],
        ..Default::default()
    })
    .await?;

    let stream = BufReader::new(TcpStream::connect(addr).await?);
    let mut client = Session::new(
        stream,
        Client {
            rekey_threshold: 1024,
            ..Default::default()
        },
    )
    .await?;

    client
        .send(&ServiceRequest {
            service_name: "ssh-userauth".into(),
        })
        .await?;
    client.recv().await?.to::<ServiceAccept>()?;

    let session_id = client.session_id().expect("kex has happened").to_vec();
    let exchanges = client.exchanges();

    for _ in 0..16 {
        client
            .send(&Ignore {
                data: vec![0; 4096].into(),
            })
            .await?;
    }

    client
        .send(&ServiceRequest {
            service_name: "ssh-userauth".into(),
        })
        .await?;
    client.recv().await?.to::<ServiceAccept>()?;

    assert!(
        client.exchanges() > exchanges,
        "no re-key happened over {} exchanged bytes",
        16 * 4096,
    );
    assert_eq!(client.session_id(), Some(&session_id[..]));

    client
        .disconnect(DisconnectReason::ByApplication, "all done")
        .await;
    assert!(handle.await.is_err());

    Ok(())
}
