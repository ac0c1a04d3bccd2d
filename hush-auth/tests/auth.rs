#![allow(clippy::unwrap_used)]

use async_std::net::{TcpListener, TcpStream};
use futures::io::BufReader;

use hush::{
    key::{PrivateKey, PublicKey},
    service,
    side::{client::Client, server::Server, Side},
    DisconnectedBy, Error, Pipe, Session,
};
use hush_auth::{handler, request};
use hush_wire::trans::DisconnectReason;

/// A terminal service that just hands the session back.
struct Done;

impl service::Request for Done {
    type Err = hush::Error;
    type Ok<IO: Pipe, S: Side> = Session<IO, S>;

    const SERVICE_NAME: &'static str = "ssh-connection";

    async fn on_accept<IO, S>(&mut self, session: Session<IO, S>) -> Result<Session<IO, S>, Error>
    where
        IO: Pipe,
        S: Side,
    {
        Ok(session)
    }
}

impl service::Handler for Done {
    type Err = hush::Error;
    type Ok<IO: Pipe, S: Side> = Session<IO, S>;

    const SERVICE_NAME: &'static str = "ssh-connection";

    async fn on_request<IO, S>(&mut self, session: Session<IO, S>) -> Result<Session<IO, S>, Error>
    where
        IO: Pipe,
        S: Side,
    {
        Ok(session)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();
}

/// Run an authentication exchange over a TCP pair, returning both outcomes.
async fn exchange<H>(
    client_auth: request::Auth<Done>,
    server_auth: handler::Auth<Done, impl handler::none::None, impl handler::password::Password, H>,
) -> (
    Result<(), Error>,
    Result<(), Error>,
)
where
    H: handler::publickey::Publickey,
{
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    futures::join!(
        async {
            let stream = BufReader::new(TcpStream::connect(addr).await.unwrap());
            let session = Session::new(stream, Client::default()).await?;

            let mut session = session.request(client_auth).await?;
            session
                .disconnect(DisconnectReason::ByApplication, "authenticated, leaving")
                .await;

            Ok(())
        },
        async {
            let (stream, _) = listener.accept().await.unwrap();
            let session = Session::new(
                BufReader::new(stream),
                Server {
                    keys: vec![PrivateKey::random()],
                    ..Default::default()
                },
            )
            .await?;

            let mut session = session.handle(server_auth).await?;

            // The authenticated client leaves right away.
            match session.recv().await {
                Err(err) => Err(err),
                Ok(packet) => panic!("expected a disconnect, got {packet:?}"),
            }
        },
    )
}

#[async_std::test]
async fn publickey_authorizes() {
    init_tracing();

    let key = PrivateKey::random();
    let authorized = key.public_key();

    let (client, server) = exchange(
        request::Auth::new("maya", Done).publickey(key),
        handler::Auth::new(Done).publickey(
            move |user: &str, offered: &PublicKey| match user == "maya" && *offered == authorized {
                true => handler::publickey::Response::Accept,
                false => handler::publickey::Response::Reject,
            },
        ),
    )
    .await;

    client.expect("the client should have authenticated");
    let err = server.expect_err("the server ends on the client's disconnect");
    assert!(matches!(
        err,
        Error::Disconnected(err)
            if matches!(err.by, DisconnectedBy::Them)
                && matches!(err.reason, DisconnectReason::ByApplication)
    ));
}

/// An unauthorized key gets a failure carrying the method list, and
/// the client gives up with a clean disconnect.
#[async_std::test]
async fn unauthorized_publickey_exhausts_cleanly() {
    init_tracing();

    let (client, server) = exchange(
        request::Auth::new("maya", Done).publickey(PrivateKey::random()),
        handler::Auth::new(Done)
            .publickey(|_: &str, _: &PublicKey| handler::publickey::Response::Reject),
    )
    .await;

    let err = client.expect_err("the client should have run out of methods");
    assert!(matches!(
        err,
        Error::Disconnected(err)
            if matches!(err.by, DisconnectedBy::Us)
                && matches!(err.reason, DisconnectReason::NoMoreAuthMethodsAvailable)
    ));

    let err = server.expect_err("the server sees the client's disconnect");
    assert!(matches!(
        err,
        Error::Disconnected(err)
            if matches!(err.by, DisconnectedBy::Them)
                && matches!(err.reason, DisconnectReason::NoMoreAuthMethodsAvailable)
    ));
}

#[async_std::test]
async fn password_authorizes_and_binds_the_user() {
    init_tracing();

    let (client, server) = exchange(
        request::Auth::new("maya", Done).password("right horse"),
        handler::Auth::new(Done).password(|user: &str, password: &str| {
            match user == "maya" && password == "right horse" {
                true => handler::password::Response::Accept,
                false => handler::password::Response::Reject,
            }
        }),
    )
    .await;

    client.expect("the client should have authenticated");
    server.expect_err("the server ends on the client's disconnect");
}

#[async_std::test]
async fn wrong_password_is_rejected() {
    init_tracing();

    let (client, server) = exchange(
        request::Auth::new("maya", Done).password("wrong horse"),
        handler::Auth::new(Done).password(|user: &str, password: &str| {
            match user == "maya" && password == "right horse" {
                true => handler::password::Response::Accept,
                false => handler::password::Response::Reject,
            }
        }),
    )
    .await;

    let err = client.expect_err("the client should have run out of methods");
    assert!(matches!(
        err,
        Error::Disconnected(err)
            if matches!(err.reason, DisconnectReason::NoMoreAuthMethodsAvailable)
    ));
    server.expect_err("the server sees the client's disconnect");
}

/// A banner set on the handler flows before the authentication result
/// and does not disturb the exchange.
#[async_std::test]
async fn banner_does_not_disturb_the_exchange() {
    init_tracing();

    let key = PrivateKey::random();
    let authorized = key.public_key();

    let (client, server) = exchange(
        request::Auth::new("maya", Done).publickey(key),
        handler::Auth::new(Done)
            .banner("All hives are monitored.\r\n")
            .publickey(move |_: &str, offered: &PublicKey| match *offered == authorized {
                true => handler::publickey::Response::Accept,
                false => handler::publickey::Response::Reject,
            }),
    )
    .await;

    client.expect("the client should have authenticated through the banner");
    server.expect_err("the server ends on the client's disconnect");
}
