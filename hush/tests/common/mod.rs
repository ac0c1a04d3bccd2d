use std::net::SocketAddr;

use async_std::net::TcpListener;
use futures::io::BufReader;

use hush::{side::server::Server, Result, Session};
use hush_wire::{
    trans::{ServiceAccept, ServiceRequest},
    Packet,
};

/// Spawn a transport-level server answering every service request,
/// resolving with the first packet it cannot answer itself.
pub async fn server(
    config: Server,
) -> Result<(SocketAddr, async_std::task::JoinHandle<Result<Packet>>)> {
    let socket = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = socket.local_addr()?;

    let handle = async_std::task::spawn(async move {
        let (stream, _) = socket.accept().await?;
        let stream = BufReader::new(stream);

        let mut session = Session::new(stream, config).await?;

        loop {
            let packet = session.recv().await?;

            match packet.to::<ServiceRequest>() {
                Ok(ServiceRequest { service_name }) => {
                    session.send(&ServiceAccept { service_name }).await?;
                }
                Err(_) => break Ok(packet),
            }
        }
    });

    Ok((addr, handle))
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();
}
