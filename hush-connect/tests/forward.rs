#![allow(clippy::unwrap_used)]

use async_std::net::{TcpListener, TcpStream};
use base64::{engine::general_purpose::STANDARD, Engine};
use futures::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use rand::RngCore;

use hush::{key::PrivateKey, side::client::Client, side::server::Server};
use hush_connect::{
    agent, channel_open::ChannelOpen, global_request, ChannelOpenContext, GlobalRequestContext,
};
use hush_wire::{
    connect::ChannelRequestContext,
    trans::DisconnectReason,
};

mod common;

/// A TCP echo service bound on the loopback, mirroring every byte.
async fn echo_listener() -> (std::net::SocketAddr, async_std::task::JoinHandle<()>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = async_std::task::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let (mut reader, mut writer) = (&stream, &stream);

            if futures::io::copy(&mut reader, &mut writer).await.is_err() {
                break;
            }
        }
    });

    (addr, handle)
}

/// Speak the challenge protocol over any byte stream: send a random
/// base64 token, expect it mirrored verbatim.
async fn challenge<IO>(mut io: IO) -> Vec<u8>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let mut token = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut token);
    let token = STANDARD.encode(token).into_bytes();

    io.write_all(&token).await.unwrap();
    io.flush().await.unwrap();

    let mut mirrored = vec![0u8; token.len()];
    io.read_exact(&mut mirrored).await.unwrap();

    assert_eq!(mirrored, token);

    token
}

/// The tunnel adapter carries an application conversation bit-exactly,
/// whether the bytes go over a raw socket or over `direct-tcpip`.
#[async_std::test]
async fn tunneled_echo_matches_direct() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let (echo_addr, _echo) = echo_listener().await;

    // Once over a plain socket, as the baseline.
    challenge(TcpStream::connect(echo_addr).await?).await;

    let (client, server) = common::pair(
        Client::default(),
        Server {
            keys: vec![PrivateKey::random()],
            ..Default::default()
        },
    )
    .await?;

    let (opens_tx, opens_rx) = flume::unbounded();

    // The serving side honors `direct-tcpip` by dialing the target and
    // splicing the two byte streams together.
    let serverside = common::serve(&server, common::accept_into(opens_tx), (), async {
        while let Ok((context, channel)) = opens_rx.recv_async().await {
            let ChannelOpenContext::DirectTcpip {
                host_to_connect,
                port_to_connect,
                ..
            } = context
            else {
                panic!("expected a direct-tcpip open")
            };

            let stream =
                TcpStream::connect((host_to_connect.as_str(), port_to_connect as u16))
                    .await
                    .unwrap();

            let tunnel = channel.into_tunnel();
            let (mut tunnel_read, mut tunnel_write) = tunnel.split();
            let (mut stream_read, mut stream_write) = (&stream, &stream);

            futures::join!(
                async {
                    futures::io::copy(&mut tunnel_read, &mut stream_write)
                        .await
                        .unwrap();
                    stream.shutdown(std::net::Shutdown::Write).ok();
                },
                async {
                    futures::io::copy(&mut stream_read, &mut tunnel_write)
                        .await
                        .unwrap();
                    tunnel_write.close().await.unwrap();
                },
            );
        }
    });

    let clientside = async {
        let outcome = common::drive(&client, (), (), async {
            let tunnel = client
                .direct_tcpip(echo_addr.ip().to_string(), echo_addr.port() as u32, ("127.0.0.1", 0))
                .await?;

            challenge(tunnel).await;

            Ok::<_, hush_connect::Error>(())
        })
        .await;

        client
            .disconnect(DisconnectReason::ByApplication, "echo over")
            .await;

        outcome
    };

    let (serverside, clientside) = futures::join!(serverside, clientside);
    serverside?;
    clientside?;

    Ok(())
}

/// `tcpip-forward` round-trip: the bound port comes back for port 0,
/// and the peer-initiated `forwarded-tcpip` channel reaches us.
#[async_std::test]
async fn forwarded_tcpip_flows_back() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let (client, server) = common::pair(
        Client::default(),
        Server {
            keys: vec![PrivateKey::random()],
            ..Default::default()
        },
    )
    .await?;

    let (server_opens_tx, _server_opens_rx) = flume::unbounded();
    let (forward_tx, forward_rx) = flume::bounded(1);

    let serverside = async {
        let on_global = move |context: &GlobalRequestContext| match context {
            GlobalRequestContext::TcpipForward { bind_port: 0, .. } => {
                forward_tx.send(()).unwrap();

                global_request::Outcome::Accept {
                    bound_port: Some(42424),
                }
            }
            _ => global_request::Outcome::Reject,
        };

        common::serve(&server, common::accept_into(server_opens_tx), on_global, async {
            // Once the forward is in place, open the inbound tunnel.
            forward_rx.recv_async().await.unwrap();

            let open = server
                .channel_open(ChannelOpenContext::ForwardedTcpip {
                    connected_address: "0.0.0.0".into(),
                    connected_port: 42424,
                    originator_address: "192.0.2.7".into(),
                    originator_port: 51515,
                })
                .await
                .unwrap();

            let ChannelOpen::Accepted(channel) = open else {
                panic!("the forwarded-tcpip channel should have been accepted")
            };

            let mut writer = channel.writer();
            writer.write_all(b"inbound connection").await.unwrap();
            writer.flush().await.unwrap();
            channel.eof().unwrap();

            // Leave the channel open until the peer disconnects.
            futures::future::pending::<()>().await;
        })
        .await
    };

    let (client_opens_tx, client_opens_rx) = flume::unbounded();

    let clientside = async {
        let outcome = common::drive(&client, common::accept_into(client_opens_tx), (), async {
            let granted = client
                .global_request(GlobalRequestContext::TcpipForward {
                    bind_address: "0.0.0.0".into(),
                    bind_port: 0,
                })
                .await?;
            assert_eq!(granted, global_request::GlobalRequest::AcceptedPort(42424));

            let (context, channel) = client_opens_rx.recv_async().await.unwrap();
            assert!(matches!(
                context,
                ChannelOpenContext::ForwardedTcpip { connected_port: 42424, .. }
            ));

            let mut inbound = Vec::new();
            channel.reader().read_to_end(&mut inbound).await?;
            assert_eq!(inbound, b"inbound connection");

            channel.close();

            Ok::<_, hush_connect::Error>(())
        })
        .await;

        client
            .disconnect(DisconnectReason::ByApplication, "forwarding over")
            .await;

        outcome
    };

    let (serverside, clientside) = futures::join!(serverside, clientside);
    serverside?;
    clientside?;

    Ok(())
}

/// Agent forwarding end-to-end: the serving side asks for the agent,
/// opens an `auth-agent@openssh.com` channel back, and signs with the
/// requesting side's in-memory identity.
#[async_std::test]
async fn forwarded_agent_signs() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let agent_key = PrivateKey::random();
    let identities = agent::Identities::new().with(agent_key.clone(), "forwarded-identity");

    let (client, server) = common::pair(
        Client::default(),
        Server {
            keys: vec![PrivateKey::random()],
            ..Default::default()
        },
    )
    .await?;

    let (server_opens_tx, server_opens_rx) = flume::unbounded();

    let serverside = common::serve(&server, common::accept_into(server_opens_tx), (), async {
        // The session channel over which the agent is requested.
        let (_, session_channel) = server_opens_rx.recv_async().await.unwrap();

        let mut requests = Box::pin(session_channel.requests());
        let request = futures::StreamExt::next(&mut requests).await.unwrap();
        assert!(matches!(
            request.context(),
            ChannelRequestContext::AuthAgentReq,
        ));
        request.accept();

        // Reach back into the peer's agent and use its identity.
        let open = server.channel_open(ChannelOpenContext::AuthAgent).await.unwrap();
        let ChannelOpen::Accepted(agent_channel) = open else {
            panic!("the auth-agent channel should have been accepted")
        };

        let mut tunnel = agent_channel.into_tunnel();

        let listed = agent::request_identities(&mut tunnel).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].1, "forwarded-identity");

        let signature = agent::sign_request(&mut tunnel, &listed[0].0, b"onward authentication")
            .await
            .unwrap();

        hush::key::PublicKey::from_blob(&listed[0].0)
            .unwrap()
            .verify(b"onward authentication", &signature)
            .expect("the forwarded signature should verify");

        tunnel.close().await.unwrap();
    });

    let (client_opens_tx, client_opens_rx) = flume::unbounded();

    let clientside = async {
        let outcome = common::drive(&client, common::accept_into(client_opens_tx), (), async {
            let ChannelOpen::Accepted(channel) =
                client.channel_open(ChannelOpenContext::Session).await?
            else {
                panic!("the session channel should have been accepted")
            };

            // Ask for agent forwarding on the session channel.
            let response = channel
                .request_wait(ChannelRequestContext::AuthAgentReq)
                .await?;
            assert_eq!(response, hush_connect::channel::request::Response::Success);

            // Serve the agent protocol on the channel the peer opens back.
            let (context, agent_channel) = client_opens_rx.recv_async().await.unwrap();
            assert!(matches!(context, ChannelOpenContext::AuthAgent));

            identities.serve(agent_channel.into_tunnel()).await?;

            channel.close();

            Ok::<_, hush_connect::Error>(())
        })
        .await;

        client
            .disconnect(DisconnectReason::ByApplication, "agent session over")
            .await;

        outcome
    };

    let (serverside, clientside) = futures::join!(serverside, clientside);
    serverside?;
    clientside?;

    Ok(())
}
