#![allow(dead_code, clippy::unwrap_used)]

use async_std::net::{TcpListener, TcpStream};
use futures::{future, io::BufReader, pin_mut};

use hush::{
    key::PrivateKey,
    side::{client::Client, server::Server, Side},
    Pipe, Session,
};
use hush_auth::{handler, request};
use hush_connect::{channel_open, global_request, Connect, Error, Service};

pub type ClientConnect = Connect<BufReader<TcpStream>, Client>;
pub type ServerConnect = Connect<BufReader<TcpStream>, Server>;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();
}

/// Establish a fully authenticated client/server [`Connect`] pair
/// over a loopback TCP stream.
pub async fn pair(
    client: Client,
    server: Server,
) -> Result<(ClientConnect, ServerConnect), hush::Error> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("loopback sockets are available");
    let addr = listener.local_addr().expect("the socket is bound");

    let key = PrivateKey::random();
    let authorized = key.public_key();

    futures::try_join!(
        async {
            let stream = BufReader::new(TcpStream::connect(addr).await?);
            let session = Session::new(stream, client).await?;

            session
                .request(request::Auth::new("testAgent", Service).publickey(key.clone()))
                .await
        },
        async {
            let (stream, _) = listener.accept().await.expect("the client connects");
            let session = Session::new(BufReader::new(stream), server).await?;

            session
                .handle(handler::Auth::new(Service).publickey(
                    move |_: &str, offered: &hush::key::PublicKey| match *offered == authorized {
                        true => handler::publickey::Response::Accept,
                        false => handler::publickey::Response::Reject,
                    },
                ))
                .await
        },
    )
}

/// Drive the connection pump alongside some `logic`, resolving with
/// the logic's output once it completes.
pub async fn drive<IO, S, T>(
    connect: &Connect<IO, S>,
    on_open: impl channel_open::Hook,
    on_global: impl global_request::Hook,
    logic: impl future::Future<Output = T>,
) -> T
where
    IO: Pipe,
    S: Side,
{
    let run = connect.run(on_open, on_global);
    pin_mut!(run, logic);

    match future::select(run, logic).await {
        future::Either::Left((outcome, _)) => {
            panic!("the connection pump ended before the logic: {:?}", outcome.err())
        }
        future::Either::Right((value, _)) => value,
    }
}

/// Drive the connection pump alongside some `logic` until the peer
/// disconnects, which is the expected end of a served session.
pub async fn serve<IO, S>(
    connect: &Connect<IO, S>,
    on_open: impl channel_open::Hook,
    on_global: impl global_request::Hook,
    logic: impl future::Future<Output = ()>,
) -> Result<(), Error>
where
    IO: Pipe,
    S: Side,
{
    let run = connect.run(on_open, on_global);
    pin_mut!(run, logic);

    match future::select(run, logic).await {
        future::Either::Left((Err(Error::Transport(hush::Error::Disconnected(_))), _)) => Ok(()),
        future::Either::Left((outcome, _)) => outcome.map(|_| ()),
        future::Either::Right(((), _)) => Ok(()),
    }
}

/// A hook routing every accepted channel into a queue.
pub fn accept_into(
    queue: flume::Sender<(hush_wire::connect::ChannelOpenContext, hush_connect::channel::Channel)>,
) -> impl channel_open::Hook {
    move |context: &hush_wire::connect::ChannelOpenContext,
          channel: hush_connect::channel::Channel| {
        match queue.send((context.clone(), channel)) {
            Ok(()) => channel_open::Outcome::Accept,
            Err(_) => channel_open::Outcome::Reject {
                reason: hush_wire::connect::ChannelOpenFailureReason::ResourceShortage,
                description: "The channel consumer is gone".into(),
            },
        }
    }
}
