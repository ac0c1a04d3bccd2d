//! Authentication _handling_ mechanics, the server side of `ssh-userauth`.

use enumset::EnumSet;

use hush::{
    key::PublicKey,
    service::Handler,
    side::Side,
    Error, Pipe, Result, Session,
};
use hush_wire::{
    arch::NameList,
    sig,
    trans::DisconnectReason,
    userauth, Decode, Encode, Reader,
};

mod method;
use method::Method;

pub mod none;
pub mod password;
pub mod publickey;

/// Authentication attempts allowed before the session is torn down.
const MAX_ATTEMPTS: usize = 20;

#[derive(Debug, PartialEq)]
enum Attempt {
    Success,
    Failure,
    Continue,
}

/// The `ssh-userauth` service [`Handler`], wrapping the service to
/// hand the session to once a peer authenticates.
#[derive(Debug)]
pub struct Auth<H, N = (), P = (), PK = ()> {
    banner: Option<String>,
    methods: EnumSet<Method>,

    handler: H,

    none: N,
    password: P,
    publickey: PK,
}

impl<H> Auth<H>
where
    H: Handler,
{
    /// Create an [`Auth`] handler, rejecting all authentication by default.
    pub fn new(service: H) -> Self {
        Self {
            banner: None,
            methods: EnumSet::empty(),

            handler: service,

            none: (),
            password: (),
            publickey: (),
        }
    }
}

impl<H, N, P, PK> Auth<H, N, P, PK>
where
    H: Handler,
    N: none::None,
    P: password::Password,
    PK: publickey::Publickey,
{
    /// Set the banner text sent before authentication starts.
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());

        self
    }

    /// Set the hook for the `none` method.
    pub fn none(self, none: impl none::None) -> Auth<H, impl none::None, P, PK> {
        let Self {
            banner,
            mut methods,
            handler,
            none: _,
            password,
            publickey,
        } = self;

        methods |= Method::None;

        Auth {
            banner,
            methods,
            handler,
            none,
            password,
            publickey,
        }
    }

    /// Set the hook for the `password` method.
    pub fn password(
        self,
        password: impl password::Password,
    ) -> Auth<H, N, impl password::Password, PK> {
        let Self {
            banner,
            mut methods,
            handler,
            none,
            password: _,
            publickey,
        } = self;

        methods |= Method::Password;

        Auth {
            banner,
            methods,
            handler,
            none,
            password,
            publickey,
        }
    }

    /// Set the hook for the `publickey` method.
    pub fn publickey(
        self,
        publickey: impl publickey::Publickey,
    ) -> Auth<H, N, P, impl publickey::Publickey> {
        let Self {
            banner,
            mut methods,
            handler,
            none,
            password,
            publickey: _,
        } = self;

        methods |= Method::Publickey;

        Auth {
            banner,
            methods,
            handler,
            none,
            password,
            publickey,
        }
    }

    /// The method names to advertise in a failure, `none` excluded.
    fn continue_with(&self) -> NameList {
        self.methods
            .iter()
            .filter(|method| *method != Method::None)
            .map(|method| method.as_str())
            .collect()
    }

    async fn handle_attempt<IO: Pipe, S: Side>(
        &mut self,
        session: &mut Session<IO, S>,
        username: &str,
        method: userauth::Method,
    ) -> Result<Attempt> {
        Ok(match method {
            userauth::Method::None if self.methods.contains(Method::None) => {
                tracing::debug!("Attempt using method `none` for user `{username}`");

                match self.none.process(username) {
                    none::Response::Accept => Attempt::Success,
                    none::Response::Reject => Attempt::Failure,
                }
            }

            userauth::Method::Password { password, .. }
                if self.methods.contains(Method::Password) =>
            {
                tracing::debug!("Attempt using method `password` for user `{username}`");

                match self.password.process(username, &password) {
                    password::Response::Accept => Attempt::Success,
                    password::Response::Reject => Attempt::Failure,
                }
            }

            userauth::Method::Publickey {
                algorithm,
                blob,
                signature,
            } if self.methods.contains(Method::Publickey) => {
                tracing::debug!(
                    "Attempt using method `publickey` (signed: {}, algorithm: {algorithm}) for user `{username}`",
                    signature.is_some(),
                );

                let Ok(key) = PublicKey::from_blob(&blob) else {
                    return Ok(Attempt::Failure);
                };

                if key.algorithm().as_ref() != algorithm.as_str()
                    || self.publickey.process(username, &key) == publickey::Response::Reject
                {
                    return Ok(Attempt::Failure);
                }

                match signature {
                    None => {
                        // The probing round-trip: acknowledge that the
                        // key would be acceptable, without authenticating.
                        session
                            .send(&userauth::PkOk {
                                algorithm,
                                blob,
                            })
                            .await?;

                        Attempt::Continue
                    }
                    Some(signature) => {
                        let transcript = sig::Publickey {
                            session_id: session
                                .session_id()
                                .ok_or(Error::UnexpectedMessage)?,
                            username,
                            service_name: H::SERVICE_NAME,
                            algorithm: algorithm.as_str(),
                            blob: &blob,
                        }
                        .to_bytes();

                        let signature = {
                            let mut reader = Reader::new(&signature);
                            sig::Signature::decode(&mut reader)
                        };

                        match signature
                            .map_err(Error::from)
                            .and_then(|signature| Ok(key.verify(&transcript, &signature)?))
                        {
                            Ok(()) => Attempt::Success,
                            Err(err) => {
                                tracing::warn!(
                                    "Signature verification failed for user `{username}`: {err}"
                                );

                                Attempt::Failure
                            }
                        }
                    }
                }
            }

            _ => Attempt::Failure,
        })
    }
}

impl<H, N, P, PK> Handler for Auth<H, N, P, PK>
where
    H: Handler,
    N: none::None,
    P: password::Password,
    PK: publickey::Publickey,
{
    type Err = H::Err;
    type Ok<IO: Pipe, S: Side> = H::Ok<IO, S>;

    const SERVICE_NAME: &'static str = crate::SERVICE_NAME;

    async fn on_request<IO, S>(
        &mut self,
        mut session: Session<IO, S>,
    ) -> Result<Self::Ok<IO, S>, Self::Err>
    where
        IO: Pipe,
        S: Side,
    {
        if let Some(banner) = self.banner.take() {
            session
                .send(&userauth::Banner {
                    message: banner.into(),
                    language: Default::default(),
                })
                .await?;
        }

        for _ in 0..MAX_ATTEMPTS {
            let packet = session.recv().await?;

            let Ok(request) = packet.to::<userauth::Request>() else {
                return Err(Error::from(
                    session
                        .disconnect(
                            DisconnectReason::ProtocolError,
                            "Unexpected message during the authentication exchange",
                        )
                        .await,
                )
                .into());
            };

            if request.service_name != H::SERVICE_NAME {
                return Err(Error::from(
                    session
                        .disconnect(
                            DisconnectReason::ServiceNotAvailable,
                            "Requested service is unknown",
                        )
                        .await,
                )
                .into());
            }

            let attempt = self
                .handle_attempt(&mut session, &request.username, request.method)
                .await?;

            match attempt {
                Attempt::Success => {
                    session.send(&userauth::Success).await?;

                    return self.handler.on_request(session).await;
                }
                Attempt::Continue => (),
                Attempt::Failure => {
                    session
                        .send(&userauth::Failure {
                            continue_with: self.continue_with(),
                            partial_success: false,
                        })
                        .await?;
                }
            }
        }

        Err(Error::from(
            session
                .disconnect(
                    DisconnectReason::NoMoreAuthMethodsAvailable,
                    "Too many failed authentication attempts",
                )
                .await,
        )
        .into())
    }
}
