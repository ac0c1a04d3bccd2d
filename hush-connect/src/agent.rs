//! The SSH-agent request/reply protocol, served over an
//! `auth-agent@openssh.com` channel when agent forwarding is active.
//!
//! Requests are framed as `uint32 length || byte type || body`,
//! see <https://datatracker.ietf.org/doc/html/draft-miller-ssh-agent>.

use futures::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use hush_wire::{sig, Decode, Encode, Reader, Writer};

use hush::key::PrivateKey;

use crate::{Error, Result};

/// `SSH_AGENT_FAILURE`.
const AGENT_FAILURE: u8 = 5;

/// `SSH2_AGENTC_REQUEST_IDENTITIES`.
const AGENTC_REQUEST_IDENTITIES: u8 = 11;

/// `SSH2_AGENT_IDENTITIES_ANSWER`.
const AGENT_IDENTITIES_ANSWER: u8 = 12;

/// `SSH2_AGENTC_SIGN_REQUEST`.
const AGENTC_SIGN_REQUEST: u8 = 13;

/// `SSH2_AGENT_SIGN_RESPONSE`.
const AGENT_SIGN_RESPONSE: u8 = 14;

/// A sanity bound on agent messages, far above any legitimate request.
const MESSAGE_MAX_SIZE: usize = 256 * 1024;

async fn read_message<IO>(io: &mut IO) -> Result<Option<Vec<u8>>>
where
    IO: AsyncRead + Unpin,
{
    let mut length = [0u8; 4];
    match io.read_exact(&mut length).await {
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        outcome => outcome?,
    }

    let length = u32::from_be_bytes(length) as usize;
    if length == 0 || length > MESSAGE_MAX_SIZE {
        return Err(hush_wire::Error::BadPacketLength(length).into());
    }

    let mut body = vec![0; length];
    io.read_exact(&mut body).await?;

    Ok(Some(body))
}

async fn write_message<IO>(io: &mut IO, body: &[u8]) -> Result<()>
where
    IO: AsyncWrite + Unpin,
{
    io.write_all(&(body.len() as u32).to_be_bytes()).await?;
    io.write_all(body).await?;
    io.flush().await?;

    Ok(())
}

/// The in-memory identities an agent endpoint answers for.
#[derive(Debug, Default)]
pub struct Identities {
    keys: Vec<(PrivateKey, String)>,
}

impl Identities {
    /// Create an empty set of identities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity with its comment.
    pub fn with(mut self, key: PrivateKey, comment: impl Into<String>) -> Self {
        self.keys.push((key, comment.into()));

        self
    }

    /// Serve agent requests over `io` until the peer hangs up.
    ///
    /// `SSH2_AGENTC_REQUEST_IDENTITIES` and `SSH2_AGENTC_SIGN_REQUEST`
    /// are answered; anything else gets `SSH_AGENT_FAILURE`.
    pub async fn serve<IO>(&self, mut io: IO) -> Result<()>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
    {
        while let Some(body) = read_message(&mut io).await? {
            let reply = self.reply(&body);

            write_message(&mut io, &reply).await?;
        }

        Ok(())
    }

    fn reply(&self, body: &[u8]) -> Vec<u8> {
        let mut reader = Reader::new(body);
        let mut w = Writer::new();

        match reader.take_u8() {
            Ok(AGENTC_REQUEST_IDENTITIES) => {
                w.put_u8(AGENT_IDENTITIES_ANSWER);
                w.put_u32(self.keys.len() as u32);

                for (key, comment) in &self.keys {
                    w.put_bytes(&key.public_key().to_blob());
                    w.put_str(comment);
                }
            }
            Ok(AGENTC_SIGN_REQUEST) => match self.sign(&mut reader) {
                Some(signature) => {
                    w.put_u8(AGENT_SIGN_RESPONSE);
                    w.put_bytes(&signature.to_bytes());
                }
                None => w.put_u8(AGENT_FAILURE),
            },
            Ok(other) => {
                tracing::debug!("Refused an agent request of type `{other}`");

                w.put_u8(AGENT_FAILURE);
            }
            Err(_) => w.put_u8(AGENT_FAILURE),
        }

        w.into_vec()
    }

    fn sign(&self, reader: &mut Reader<'_>) -> Option<sig::Signature> {
        let blob = reader.take_bytes().ok()?;
        let data = reader.take_bytes().ok()?;
        let _flags = reader.take_u32().ok()?;

        self.keys
            .iter()
            .find(|(key, _)| key.public_key().to_blob() == blob)
            .map(|(key, _)| key.sign(data))
    }
}

/// Ask an agent on the other side of `io` for its identities,
/// as `(public blob, comment)` pairs.
pub async fn request_identities<IO>(io: &mut IO) -> Result<Vec<(Vec<u8>, String)>>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let mut w = Writer::new();
    w.put_u8(AGENTC_REQUEST_IDENTITIES);
    write_message(io, w.as_ref()).await?;

    let body = read_message(io)
        .await?
        .ok_or(Error::AgentRefused)?;
    let mut reader = Reader::new(&body);

    if reader.take_u8()? != AGENT_IDENTITIES_ANSWER {
        return Err(Error::AgentRefused);
    }

    let count = reader.take_u32()?;
    (0..count)
        .map(|_| {
            Ok((
                reader.take_bytes()?.to_vec(),
                reader.take_str()?.to_owned(),
            ))
        })
        .collect()
}

/// Ask an agent on the other side of `io` to sign `data` under the
/// identity matching the public `blob`.
pub async fn sign_request<IO>(io: &mut IO, blob: &[u8], data: &[u8]) -> Result<sig::Signature>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    let mut w = Writer::new();
    w.put_u8(AGENTC_SIGN_REQUEST);
    w.put_bytes(blob);
    w.put_bytes(data);
    w.put_u32(0); // flags
    write_message(io, w.as_ref()).await?;

    let body = read_message(io)
        .await?
        .ok_or(Error::AgentRefused)?;
    let mut reader = Reader::new(&body);

    if reader.take_u8()? != AGENT_SIGN_RESPONSE {
        return Err(Error::AgentRefused);
    }

    let signature = reader.take_bytes()?;
    Ok(sig::Signature::decode(&mut Reader::new(signature))?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[async_std::test]
    async fn it_lists_and_signs() {
        let key = PrivateKey::random();
        let identities = Identities::new().with(key.clone(), "forwarded");

        let listener = async_std::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let serve = async {
            let (stream, _) = listener.accept().await.unwrap();

            identities.serve(stream).await
        };

        let exercise = async {
            let mut stream = async_std::net::TcpStream::connect(addr).await.unwrap();

            let listed = request_identities(&mut stream).await.unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].0, key.public_key().to_blob());
            assert_eq!(listed[0].1, "forwarded");

            let signature = sign_request(&mut stream, &listed[0].0, b"attestation")
                .await
                .unwrap();
            key.public_key()
                .verify(b"attestation", &signature)
                .expect("agent signature should verify");

            sign_request(&mut stream, b"unknown blob", b"attestation")
                .await
                .expect_err("unknown identities must not sign");
        };

        let (served, ()) = futures::join!(serve, exercise);
        served.unwrap();
    }
}
