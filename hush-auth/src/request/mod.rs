//! Authentication _request_ mechanics, the client side of `ssh-userauth`.

use hashbrown::HashSet;

use hush::{
    service::Request,
    side::Side,
    Error, Pipe, Result, Session,
};
use hush_wire::{
    arch::NameList,
    sig,
    trans::DisconnectReason,
    userauth, Encode, Packet,
};

mod method;
use method::Method;

#[doc(no_inline)]
pub use hush::key::PrivateKey;

/// The responder invoked for every `keyboard-interactive` info request,
/// answering the prompts in order.
pub type Responder = Box<dyn FnMut(&userauth::InfoRequest) -> Vec<String> + Send>;

/// The `ssh-userauth` service [`Request`], wrapping the service to
/// start once the authentication goes through.
///
/// # Note
/// 1. The request always starts with the `none` method, to discover
///    the methods available on the server.
/// 2. While the `publickey` method allows for multiple keys, the
///    `password` method only keeps the last password provided.
pub struct Auth<R> {
    username: String,
    service: R,

    methods: HashSet<Method>,
    responder: Option<Responder>,
}

impl<R: Request> Auth<R> {
    /// Create an [`Auth`] request for the provided `username`, to
    /// access the provided `service`.
    pub fn new(username: impl Into<String>, service: R) -> Self {
        Self {
            username: username.into(),
            service,

            methods: Default::default(),
            responder: None,
        }
    }

    /// Attempt to authenticate with the `password` method.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.methods.replace(Method::Password {
            password: password.into(),
        });

        self
    }

    /// Attempt to authenticate with the `publickey` method.
    pub fn publickey(mut self, key: impl Into<PrivateKey>) -> Self {
        self.methods.replace(Method::Publickey {
            key: Box::new(key.into()),
        });

        self
    }

    /// Attempt to authenticate with the `keyboard-interactive` method,
    /// answering prompts through the provided `responder`.
    pub fn keyboard_interactive(
        mut self,
        responder: impl FnMut(&userauth::InfoRequest) -> Vec<String> + Send + 'static,
    ) -> Self {
        self.methods.replace(Method::KeyboardInteractive);
        self.responder = Some(Box::new(responder));

        self
    }

    fn next_method(&mut self, continue_with: &NameList) -> Option<Method> {
        self.methods
            .extract_if(|method| continue_with.contains(method.as_str()))
            .next()
    }

    /// Receive the next authentication response, logging away banners.
    async fn response<IO: Pipe, S: Side>(session: &mut Session<IO, S>) -> Result<Packet> {
        loop {
            let packet = session.recv().await?;

            if let Ok(userauth::Banner { message, .. }) = packet.to() {
                tracing::info!("Authentication banner: {message}");
            } else {
                return Ok(packet);
            }
        }
    }

    async fn attempt_method<IO: Pipe, S: Side>(
        &mut self,
        session: &mut Session<IO, S>,
        method: &Method,
    ) -> Result<Packet> {
        let username = self.username.clone();
        let build = move |method| userauth::Request {
            username: username.clone().into(),
            service_name: R::SERVICE_NAME.into(),
            method,
        };

        match method {
            Method::None => {
                session.send(&build(userauth::Method::None)).await?;

                Self::response(session).await
            }
            Method::Publickey { key } => {
                let algorithm = key.algorithm().as_ref().to_owned();
                let blob = key.public_key().to_blob();

                // Probe the server before signing, per RFC 4252 section 7.
                session
                    .send(&build(userauth::Method::Publickey {
                        algorithm: algorithm.as_str().into(),
                        blob: blob.clone().into(),
                        signature: None,
                    }))
                    .await?;

                let response = Self::response(session).await?;
                let Ok(userauth::PkOk { .. }) = response.to() else {
                    return Ok(response);
                };

                let signature = sig::Publickey {
                    session_id: session
                        .session_id()
                        .ok_or(Error::UnexpectedMessage)?,
                    username: &self.username,
                    service_name: R::SERVICE_NAME,
                    algorithm: &algorithm,
                    blob: &blob,
                }
                .to_bytes();
                let signature = key.sign(&signature);

                session
                    .send(&build(userauth::Method::Publickey {
                        algorithm: algorithm.as_str().into(),
                        blob: blob.into(),
                        signature: Some(signature.to_bytes().into()),
                    }))
                    .await?;

                Self::response(session).await
            }
            Method::Password { password } => {
                session
                    .send(&build(userauth::Method::Password {
                        password: password.as_str().into(),
                        new: None,
                    }))
                    .await?;

                Self::response(session).await
            }
            Method::KeyboardInteractive => {
                session
                    .send(&build(userauth::Method::KeyboardInteractive {
                        language: Default::default(),
                        submethods: Default::default(),
                    }))
                    .await?;

                loop {
                    let response = Self::response(session).await?;
                    let Ok(request) = response.to::<userauth::InfoRequest>() else {
                        return Ok(response);
                    };

                    let responses = match &mut self.responder {
                        Some(responder) => responder(&request),
                        None => Vec::new(),
                    };

                    session
                        .send(&userauth::InfoResponse {
                            responses: responses.into_iter().map(Into::into).collect(),
                        })
                        .await?;
                }
            }
        }
    }
}

impl<R: Request> Request for Auth<R> {
    type Err = R::Err;
    type Ok<IO: Pipe, S: Side> = R::Ok<IO, S>;

    const SERVICE_NAME: &'static str = crate::SERVICE_NAME;

    async fn on_accept<IO, S>(
        &mut self,
        mut session: Session<IO, S>,
    ) -> Result<Self::Ok<IO, S>, Self::Err>
    where
        IO: Pipe,
        S: Side,
    {
        let mut method = Method::None;

        loop {
            let response = self.attempt_method(&mut session, &method).await?;

            if response.to::<userauth::Success>().is_ok() {
                break self.service.on_accept(session).await;
            } else if let Ok(userauth::Failure { continue_with, .. }) = response.to() {
                if let Some(next) = self.next_method(&continue_with) {
                    method = next;
                } else {
                    break Err(Error::from(
                        session
                            .disconnect(
                                DisconnectReason::NoMoreAuthMethodsAvailable,
                                "Exhausted the available authentication methods",
                            )
                            .await,
                    )
                    .into());
                }
            } else {
                break Err(Error::from(
                    session
                        .disconnect(
                            DisconnectReason::ProtocolError,
                            "Unexpected message during the authentication exchange",
                        )
                        .await,
                )
                .into());
            }
        }
    }
}
