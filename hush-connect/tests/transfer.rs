#![allow(clippy::unwrap_used)]

use futures::{AsyncReadExt, AsyncWriteExt};
use rand::Rng;
use rstest::rstest;
use sha2::{Digest, Sha256};

use hush::{
    key::PrivateKey,
    side::{
        client::{Algorithms, Client},
        server::Server,
    },
};
use hush_connect::{channel::Channel, channel_open::ChannelOpen, ChannelOpenContext};
use hush_wire::trans::DisconnectReason;

mod common;

/// The scripted responder on the serving side: everything received up
/// to the end-of-file comes back prefixed with a prompt and suffixed
/// with a success marker.
async fn shell(channel: Channel) {
    let mut input = Vec::new();
    channel
        .reader()
        .read_to_end(&mut input)
        .await
        .expect("the input should arrive whole");

    let mut writer = channel.writer();
    writer.write_all(b"$ ").await.unwrap();
    writer.write_all(&input).await.unwrap();
    writer.write_all(b"success\n").await.unwrap();
    writer.flush().await.unwrap();

    channel.eof().unwrap();
    channel.close();
}

/// A full stack sweep: for every algorithm suite, authenticate, open
/// a session channel, and converse through it verbatim.
#[rstest]
#[case("curve25519-sha256", "ssh-ed25519", "aes256-ctr", "hmac-sha2-256")]
#[case("ecdh-sha2-nistp256", "ssh-ed25519", "aes128-ctr", "hmac-sha2-512")]
#[case("diffie-hellman-group14-sha1", "ssh-ed25519", "aes128-cbc", "hmac-sha1")]
#[case("diffie-hellman-group-exchange-sha256", "ecdsa-sha2-nistp256", "aes256-cbc", "hmac-sha2-256")]
#[case("curve25519-sha256", "ecdsa-sha2-nistp384", "aes256-ctr", "hmac-sha1")]
#[async_std::test]
async fn suite_conversation(
    #[case] kex: &str,
    #[case] hostkey: &str,
    #[case] cipher: &str,
    #[case] mac: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let (client, server) = common::pair(
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
        Server {
            keys: vec![PrivateKey::generate(hostkey.parse()?)?],
            ..Default::default()
        },
    )
    .await?;

    let (opens_tx, opens_rx) = flume::unbounded();

    let serverside = common::serve(&server, common::accept_into(opens_tx), (), async {
        while let Ok((_, channel)) = opens_rx.recv_async().await {
            shell(channel).await;
        }
    });

    let clientside = async {
        let outcome = common::drive(&client, (), (), async {
            let ChannelOpen::Accepted(channel) =
                client.channel_open(ChannelOpenContext::Session).await?
            else {
                panic!("the session channel should have been accepted")
            };

            let mut writer = channel.writer();
            writer.write_all(b"testAgent\nexit\n").await?;
            writer.flush().await?;
            channel.eof()?;

            let mut response = Vec::new();
            channel.reader().read_to_end(&mut response).await?;
            assert_eq!(response, b"$ testAgent\nexit\nsuccess\n");

            channel.close();

            Ok::<_, hush_connect::Error>(())
        })
        .await;

        client
            .disconnect(DisconnectReason::ByApplication, "conversation over")
            .await;

        outcome
    };

    let (serverside, clientside) = futures::join!(serverside, clientside);
    serverside?;
    clientside?;

    Ok(())
}

/// Bulk traffic across a deliberately tiny re-key threshold: at least
/// one re-key happens mid-stream, the session identifier stays fixed,
/// and every byte arrives intact and in order.
#[async_std::test]
async fn rekey_continuity_under_load() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    const CHUNK: usize = 8192;
    const CHUNKS: usize = 64;

    let (client, server) = common::pair(
        Client {
            rekey_threshold: 16 * 1024,
            ..Default::default()
        },
        Server {
            keys: vec![PrivateKey::random()],
            ..Default::default()
        },
    )
    .await?;

    let (opens_tx, opens_rx) = flume::unbounded();

    let serverside = common::serve(&server, common::accept_into(opens_tx), (), async {
        while let Ok((_, channel)) = opens_rx.recv_async().await {
            // Echo everything back until the end-of-file.
            let (mut reader, mut writer) = (channel.reader(), channel.writer());
            futures::io::copy(&mut reader, &mut writer).await.unwrap();
            writer.flush().await.unwrap();

            channel.eof().unwrap();
            channel.close();
        }
    });

    let clientside = async {
        let outcome = common::drive(&client, (), (), async {
            let ChannelOpen::Accepted(channel) =
                client.channel_open(ChannelOpenContext::Session).await?
            else {
                panic!("the session channel should have been accepted")
            };

            let session_id = client.session_id().expect("the first exchange happened");
            let exchanges = client.exchanges();

            let (mut sent, mut received) = (Sha256::new(), Sha256::new());

            futures::join!(
                async {
                    let mut writer = channel.writer();

                    for _ in 0..CHUNKS {
                        let mut chunk = [0u8; CHUNK];
                        rand::thread_rng().fill(&mut chunk[..]);

                        sent.update(chunk);
                        writer.write_all(&chunk).await.unwrap();
                    }

                    writer.flush().await.unwrap();
                    channel.eof().unwrap();
                },
                async {
                    let mut reader = channel.reader();
                    let mut buffer = vec![0u8; CHUNK];

                    loop {
                        match reader.read(&mut buffer).await.unwrap() {
                            0 => break,
                            n => received.update(&buffer[..n]),
                        }
                    }
                },
            );

            assert_eq!(
                sent.finalize(),
                received.finalize(),
                "bytes were lost or reordered across the re-keys",
            );
            assert!(
                client.exchanges() > exchanges,
                "no re-key happened over {} bytes",
                CHUNK * CHUNKS,
            );
            assert_eq!(
                client.session_id().as_deref(),
                Some(&session_id[..]),
                "the session identifier must never change",
            );

            channel.close();

            Ok::<_, hush_connect::Error>(())
        })
        .await;

        client
            .disconnect(DisconnectReason::ByApplication, "transfer over")
            .await;

        outcome
    };

    let (serverside, clientside) = futures::join!(serverside, clientside);
    serverside?;
    clientside?;

    Ok(())
}

/// Concurrent channels stay isolated: two conversations interleave on
/// one session without mixing their bytes.
#[async_std::test]
async fn channels_are_isolated() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let (client, server) = common::pair(
        Client::default(),
        Server {
            keys: vec![PrivateKey::random()],
            ..Default::default()
        },
    )
    .await?;

    let (opens_tx, opens_rx) = flume::unbounded();

    let serverside = common::serve(&server, common::accept_into(opens_tx), (), async {
        let mut shells = Vec::new();
        while let Ok((_, channel)) = opens_rx.recv_async().await {
            shells.push(shell(channel));

            if shells.len() == 2 {
                futures::future::join_all(shells.drain(..)).await;
            }
        }
    });

    let clientside = async {
        let outcome = common::drive(&client, (), (), async {
            let converse = |payload: &'static [u8], expected: &'static [u8]| {
                let client = &client;

                async move {
                    let ChannelOpen::Accepted(channel) =
                        client.channel_open(ChannelOpenContext::Session).await.unwrap()
                    else {
                        panic!("the session channel should have been accepted")
                    };

                    let mut writer = channel.writer();
                    writer.write_all(payload).await.unwrap();
                    writer.flush().await.unwrap();
                    channel.eof().unwrap();

                    let mut response = Vec::new();
                    channel.reader().read_to_end(&mut response).await.unwrap();
                    assert_eq!(response, expected);

                    channel.close();
                }
            };

            futures::join!(
                converse(b"one\n", b"$ one\nsuccess\n"),
                converse(b"two\n", b"$ two\nsuccess\n"),
            );

            Ok::<_, hush_connect::Error>(())
        })
        .await;

        client
            .disconnect(DisconnectReason::ByApplication, "conversations over")
            .await;

        outcome
    };

    let (serverside, clientside) = futures::join!(serverside, clientside);
    serverside?;
    clientside?;

    Ok(())
}
