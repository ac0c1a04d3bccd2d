//! Messages involved in the SSH's **authentication** (`SSH-USERAUTH`) part of the protocol,
//! as defined in the [RFC 4252](https://datatracker.ietf.org/doc/html/rfc4252)
//! and the [RFC 4256](https://datatracker.ietf.org/doc/html/rfc4256).

use crate::{
    arch::{Ascii, Bytes, NameList, Utf8},
    codec::magic,
    Decode, Encode, Error, Reader, Result, Writer,
};

/// The authentication method carried in a [`Request`].
#[derive(Debug, Clone)]
pub enum Method {
    /// The `none` method, probing for available methods.
    None,

    /// The `publickey` method; the signature is absent on the probing
    /// round-trip and present on the actual authentication attempt.
    Publickey {
        /// The public key algorithm name.
        algorithm: Ascii,

        /// The public key blob in SSH wire form.
        blob: Bytes,

        /// The signature over the authentication transcript, if any.
        signature: Option<Bytes>,
    },

    /// The `password` method.
    Password {
        /// The password to authenticate with.
        password: Utf8,

        /// The replacement password on a change request.
        new: Option<Utf8>,
    },

    /// The `keyboard-interactive` method.
    KeyboardInteractive {
        /// Language tag.
        language: Ascii,

        /// Comma-separated submethod hints.
        submethods: Utf8,
    },
}

impl Method {
    /// The name of the `none` method.
    pub const NONE: &'static str = "none";

    /// The name of the `publickey` method.
    pub const PUBLICKEY: &'static str = "publickey";

    /// The name of the `password` method.
    pub const PASSWORD: &'static str = "password";

    /// The name of the `keyboard-interactive` method.
    pub const KEYBOARD_INTERACTIVE: &'static str = "keyboard-interactive";

    /// The method's SSH name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => Self::NONE,
            Self::Publickey { .. } => Self::PUBLICKEY,
            Self::Password { .. } => Self::PASSWORD,
            Self::KeyboardInteractive { .. } => Self::KEYBOARD_INTERACTIVE,
        }
    }
}

/// The `SSH_MSG_USERAUTH_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-5>.
#[derive(Debug, Clone)]
pub struct Request {
    /// The user name to authenticate as.
    pub username: Utf8,

    /// The service to start after authentication.
    pub service_name: Ascii,

    /// The authentication method and its parameters.
    pub method: Method,
}

impl Request {
    const MAGIC: u8 = 50;
}

impl Encode for Request {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.username.encode(w);
        self.service_name.encode(w);
        w.put_str(self.method.as_str());

        match &self.method {
            Method::None => (),
            Method::Publickey {
                algorithm,
                blob,
                signature,
            } => {
                w.put_bool(signature.is_some());
                algorithm.encode(w);
                blob.encode(w);
                if let Some(signature) = signature {
                    signature.encode(w);
                }
            }
            Method::Password { password, new } => {
                w.put_bool(new.is_some());
                password.encode(w);
                if let Some(new) = new {
                    new.encode(w);
                }
            }
            Method::KeyboardInteractive {
                language,
                submethods,
            } => {
                language.encode(w);
                submethods.encode(w);
            }
        }

        w.len() - start
    }
}

impl Decode for Request {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        let username = Utf8::decode(r)?;
        let service_name = Ascii::decode(r)?;

        let method = match r.take_str()? {
            Method::NONE => Method::None,
            Method::PUBLICKEY => {
                let signed = r.take_bool()?;
                let algorithm = Ascii::decode(r)?;
                let blob = Bytes::decode(r)?;

                Method::Publickey {
                    algorithm,
                    blob,
                    signature: signed.then(|| Bytes::decode(r)).transpose()?,
                }
            }
            Method::PASSWORD => {
                let change = r.take_bool()?;
                let password = Utf8::decode(r)?;

                Method::Password {
                    password,
                    new: change.then(|| Utf8::decode(r)).transpose()?,
                }
            }
            Method::KEYBOARD_INTERACTIVE => Method::KeyboardInteractive {
                language: Ascii::decode(r)?,
                submethods: Utf8::decode(r)?,
            },
            _ => return Err(Error::Unsupported("authentication method")),
        };

        Ok(Self {
            username,
            service_name,
            method,
        })
    }
}

/// The `SSH_MSG_USERAUTH_FAILURE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-5.1>.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Methods that may productively continue the authentication.
    pub continue_with: NameList,

    /// Whether this failure follows a correct but insufficient attempt.
    pub partial_success: bool,
}

impl Failure {
    const MAGIC: u8 = 51;
}

impl Encode for Failure {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.continue_with.encode(w);
        w.put_bool(self.partial_success);

        w.len() - start
    }
}

impl Decode for Failure {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            continue_with: NameList::decode(r)?,
            partial_success: r.take_bool()?,
        })
    }
}

/// The `SSH_MSG_USERAUTH_SUCCESS` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-5.1>.
#[derive(Debug, Clone)]
pub struct Success;

impl Success {
    const MAGIC: u8 = 52;
}

impl Encode for Success {
    fn encode(&self, w: &mut Writer) -> usize {
        w.put_u8(Self::MAGIC);

        1
    }
}

impl Decode for Success {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self)
    }
}

/// The `SSH_MSG_USERAUTH_BANNER` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-5.4>.
#[derive(Debug, Clone)]
pub struct Banner {
    /// The banner text to display before authentication.
    pub message: Utf8,

    /// Language tag.
    pub language: Ascii,
}

impl Banner {
    const MAGIC: u8 = 53;
}

impl Encode for Banner {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.message.encode(w);
        self.language.encode(w);

        w.len() - start
    }
}

impl Decode for Banner {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            message: Utf8::decode(r)?,
            language: Ascii::decode(r)?,
        })
    }
}

/// The `SSH_MSG_USERAUTH_PK_OK` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-7>.
#[derive(Debug, Clone)]
pub struct PkOk {
    /// The acknowledged public key algorithm name.
    pub algorithm: Ascii,

    /// The acknowledged public key blob.
    pub blob: Bytes,
}

impl PkOk {
    const MAGIC: u8 = 60;
}

impl Encode for PkOk {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.algorithm.encode(w);
        self.blob.encode(w);

        w.len() - start
    }
}

impl Decode for PkOk {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            algorithm: Ascii::decode(r)?,
            blob: Bytes::decode(r)?,
        })
    }
}

/// A prompt inside an [`InfoRequest`].
#[derive(Debug, Clone)]
pub struct Prompt {
    /// The text to display to the user.
    pub prompt: Utf8,

    /// Whether the user's answer should be echoed.
    pub echo: bool,
}

/// The `SSH_MSG_USERAUTH_INFO_REQUEST` message, for `keyboard-interactive`.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4256#section-3.2>.
#[derive(Debug, Clone)]
pub struct InfoRequest {
    /// Name of the authentication dialog.
    pub name: Utf8,

    /// Instructions to present to the user.
    pub instruction: Utf8,

    /// Language tag.
    pub language: Ascii,

    /// The prompts to answer.
    pub prompts: Vec<Prompt>,
}

impl InfoRequest {
    const MAGIC: u8 = 60;
}

impl Encode for InfoRequest {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.name.encode(w);
        self.instruction.encode(w);
        self.language.encode(w);
        w.put_u32(self.prompts.len() as u32);
        for prompt in &self.prompts {
            prompt.prompt.encode(w);
            w.put_bool(prompt.echo);
        }

        w.len() - start
    }
}

impl Decode for InfoRequest {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        let name = Utf8::decode(r)?;
        let instruction = Utf8::decode(r)?;
        let language = Ascii::decode(r)?;

        let count = r.take_u32()?;
        let prompts = (0..count)
            .map(|_| {
                Ok(Prompt {
                    prompt: Utf8::decode(r)?,
                    echo: r.take_bool()?,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            name,
            instruction,
            language,
            prompts,
        })
    }
}

/// The `SSH_MSG_USERAUTH_INFO_RESPONSE` message, for `keyboard-interactive`.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4256#section-3.4>.
#[derive(Debug, Clone)]
pub struct InfoResponse {
    /// The answers, one per prompt, in order.
    pub responses: Vec<Utf8>,
}

impl InfoResponse {
    const MAGIC: u8 = 61;
}

impl Encode for InfoResponse {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.responses.len() as u32);
        for response in &self.responses {
            response.encode(w);
        }

        w.len() - start
    }
}

impl Decode for InfoResponse {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        let count = r.take_u32()?;
        let responses = (0..count).map(|_| Utf8::decode(r)).collect::<Result<_>>()?;

        Ok(Self { responses })
    }
}
