//! Messages involved in the SSH's **connect** (`SSH-CONNECT`) part of the protocol,
//! as defined in the [RFC 4254](https://datatracker.ietf.org/doc/html/rfc4254).

use crate::{
    arch::{Ascii, Bytes, Utf8},
    codec::magic,
    Decode, Encode, Reader, Result, Writer,
};

/// The `SSH_MSG_GLOBAL_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-4>.
#[derive(Debug, Clone)]
pub struct GlobalRequest {
    /// Whether the sender wants a reply.
    pub want_reply: bool,

    /// The context of the global request.
    pub context: GlobalRequestContext,
}

impl GlobalRequest {
    const MAGIC: u8 = 80;
}

impl Encode for GlobalRequest {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_str(self.context.as_str());
        w.put_bool(self.want_reply);
        self.context.encode_body(w);

        w.len() - start
    }
}

impl Decode for GlobalRequest {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        let kind = Ascii::decode(r)?;
        let want_reply = r.take_bool()?;

        Ok(Self {
            want_reply,
            context: GlobalRequestContext::decode_body(kind, r)?,
        })
    }
}

/// The `context` in the `SSH_MSG_GLOBAL_REQUEST` message.
#[derive(Debug, Clone)]
pub enum GlobalRequestContext {
    /// A request of type `tcpip-forward`,
    /// as defined in [RFC4254 section 7.1](https://datatracker.ietf.org/doc/html/rfc4254#section-7.1).
    TcpipForward {
        /// Address to bind on the remote.
        bind_address: Utf8,

        /// Port to bind on the remote, randomly chosen if 0.
        bind_port: u32,
    },

    /// A request of type `cancel-tcpip-forward`,
    /// as defined in [RFC4254 section 7.1](https://datatracker.ietf.org/doc/html/rfc4254#section-7.1).
    CancelTcpipForward {
        /// Address that was bound on the remote.
        bind_address: Utf8,

        /// Port that was bound on the remote.
        bind_port: u32,
    },

    /// A request of a type this crate does not know about.
    Other {
        /// The request type name.
        kind: Ascii,

        /// The raw request-specific data.
        data: Vec<u8>,
    },
}

impl GlobalRequestContext {
    const TCPIP_FORWARD: &'static str = "tcpip-forward";
    const CANCEL_TCPIP_FORWARD: &'static str = "cancel-tcpip-forward";

    /// The request type name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::TcpipForward { .. } => Self::TCPIP_FORWARD,
            Self::CancelTcpipForward { .. } => Self::CANCEL_TCPIP_FORWARD,
            Self::Other { kind, .. } => kind,
        }
    }

    fn encode_body(&self, w: &mut Writer) {
        match self {
            Self::TcpipForward {
                bind_address,
                bind_port,
            }
            | Self::CancelTcpipForward {
                bind_address,
                bind_port,
            } => {
                bind_address.encode(w);
                w.put_u32(*bind_port);
            }
            Self::Other { data, .. } => w.put_raw(data),
        }
    }

    fn decode_body(kind: Ascii, r: &mut Reader<'_>) -> Result<Self> {
        Ok(match kind.as_str() {
            Self::TCPIP_FORWARD => Self::TcpipForward {
                bind_address: Utf8::decode(r)?,
                bind_port: r.take_u32()?,
            },
            Self::CANCEL_TCPIP_FORWARD => Self::CancelTcpipForward {
                bind_address: Utf8::decode(r)?,
                bind_port: r.take_u32()?,
            },
            _ => Self::Other {
                kind,
                data: r.take_rest().to_vec(),
            },
        })
    }
}

/// The `SSH_MSG_REQUEST_SUCCESS` message (empty body).
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-4>.
#[derive(Debug, Clone)]
pub struct RequestSuccess;

impl RequestSuccess {
    const MAGIC: u8 = 81;
}

impl Encode for RequestSuccess {
    fn encode(&self, w: &mut Writer) -> usize {
        w.put_u8(Self::MAGIC);

        1
    }
}

impl Decode for RequestSuccess {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self)
    }
}

/// The `SSH_MSG_REQUEST_SUCCESS` message in the context of a `tcpip-forward`
/// global request with port `0` and `want_reply` set.
///
/// see [RFC4254 section 7.1](https://datatracker.ietf.org/doc/html/rfc4254#section-7.1).
#[derive(Debug, Clone)]
pub struct ForwardingSuccess {
    /// Port that was bound on the remote.
    pub bound_port: u32,
}

impl ForwardingSuccess {
    const MAGIC: u8 = 81;
}

impl Encode for ForwardingSuccess {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.bound_port);

        w.len() - start
    }
}

impl Decode for ForwardingSuccess {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            bound_port: r.take_u32()?,
        })
    }
}

/// The `SSH_MSG_REQUEST_FAILURE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-4>.
#[derive(Debug, Clone)]
pub struct RequestFailure;

impl RequestFailure {
    const MAGIC: u8 = 82;
}

impl Encode for RequestFailure {
    fn encode(&self, w: &mut Writer) -> usize {
        w.put_u8(Self::MAGIC);

        1
    }
}

impl Decode for RequestFailure {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self)
    }
}

/// The `SSH_MSG_CHANNEL_OPEN` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.1>.
#[derive(Debug, Clone)]
pub struct ChannelOpen {
    /// Sender channel.
    pub sender_channel: u32,

    /// Initial window size, in bytes.
    pub initial_window_size: u32,

    /// Maximum packet size, in bytes.
    pub maximum_packet_size: u32,

    /// The context of the open request.
    pub context: ChannelOpenContext,
}

impl ChannelOpen {
    const MAGIC: u8 = 90;
}

impl Encode for ChannelOpen {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_str(self.context.as_str());
        w.put_u32(self.sender_channel);
        w.put_u32(self.initial_window_size);
        w.put_u32(self.maximum_packet_size);
        self.context.encode_body(w);

        w.len() - start
    }
}

impl Decode for ChannelOpen {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        let kind = Ascii::decode(r)?;
        let sender_channel = r.take_u32()?;
        let initial_window_size = r.take_u32()?;
        let maximum_packet_size = r.take_u32()?;

        Ok(Self {
            sender_channel,
            initial_window_size,
            maximum_packet_size,
            context: ChannelOpenContext::decode_body(kind, r)?,
        })
    }
}

/// The `context` in the `SSH_MSG_CHANNEL_OPEN` message.
#[derive(Debug, Clone)]
pub enum ChannelOpenContext {
    /// A channel of type `session`,
    /// as defined in [RFC4254 section 6.1](https://datatracker.ietf.org/doc/html/rfc4254#section-6.1).
    Session,

    /// A channel of type `direct-tcpip`,
    /// as defined in [RFC4254 section 7.2](https://datatracker.ietf.org/doc/html/rfc4254#section-7.2).
    DirectTcpip {
        /// The host the recipient should connect to.
        host_to_connect: Utf8,

        /// The port the recipient should connect to.
        port_to_connect: u32,

        /// The address of the originator of the connection.
        originator_address: Utf8,

        /// The port of the originator of the connection.
        originator_port: u32,
    },

    /// A channel of type `forwarded-tcpip`,
    /// as defined in [RFC4254 section 7.2](https://datatracker.ietf.org/doc/html/rfc4254#section-7.2).
    ForwardedTcpip {
        /// The address that was connected on the sender side.
        connected_address: Utf8,

        /// The port that was connected on the sender side.
        connected_port: u32,

        /// The address of the originator of the connection.
        originator_address: Utf8,

        /// The port of the originator of the connection.
        originator_port: u32,
    },

    /// A channel of type `auth-agent@openssh.com`, carrying
    /// SSH-agent requests back to the client's agent endpoint.
    AuthAgent,

    /// A channel of a type this crate does not know about.
    Other {
        /// The channel type name.
        kind: Ascii,

        /// The raw type-specific data.
        data: Vec<u8>,
    },
}

impl ChannelOpenContext {
    const SESSION: &'static str = "session";
    const DIRECT_TCPIP: &'static str = "direct-tcpip";
    const FORWARDED_TCPIP: &'static str = "forwarded-tcpip";
    const AUTH_AGENT: &'static str = "auth-agent@openssh.com";

    /// The channel type name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Session => Self::SESSION,
            Self::DirectTcpip { .. } => Self::DIRECT_TCPIP,
            Self::ForwardedTcpip { .. } => Self::FORWARDED_TCPIP,
            Self::AuthAgent => Self::AUTH_AGENT,
            Self::Other { kind, .. } => kind,
        }
    }

    fn encode_body(&self, w: &mut Writer) {
        match self {
            Self::Session | Self::AuthAgent => (),
            Self::DirectTcpip {
                host_to_connect,
                port_to_connect,
                originator_address,
                originator_port,
            } => {
                host_to_connect.encode(w);
                w.put_u32(*port_to_connect);
                originator_address.encode(w);
                w.put_u32(*originator_port);
            }
            Self::ForwardedTcpip {
                connected_address,
                connected_port,
                originator_address,
                originator_port,
            } => {
                connected_address.encode(w);
                w.put_u32(*connected_port);
                originator_address.encode(w);
                w.put_u32(*originator_port);
            }
            Self::Other { data, .. } => w.put_raw(data),
        }
    }

    fn decode_body(kind: Ascii, r: &mut Reader<'_>) -> Result<Self> {
        Ok(match kind.as_str() {
            Self::SESSION => Self::Session,
            Self::DIRECT_TCPIP => Self::DirectTcpip {
                host_to_connect: Utf8::decode(r)?,
                port_to_connect: r.take_u32()?,
                originator_address: Utf8::decode(r)?,
                originator_port: r.take_u32()?,
            },
            Self::FORWARDED_TCPIP => Self::ForwardedTcpip {
                connected_address: Utf8::decode(r)?,
                connected_port: r.take_u32()?,
                originator_address: Utf8::decode(r)?,
                originator_port: r.take_u32()?,
            },
            Self::AUTH_AGENT => Self::AuthAgent,
            _ => Self::Other {
                kind,
                data: r.take_rest().to_vec(),
            },
        })
    }
}

/// The `SSH_MSG_CHANNEL_OPEN_CONFIRMATION` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.1>.
#[derive(Debug, Clone)]
pub struct ChannelOpenConfirmation {
    /// Recipient channel.
    pub recipient_channel: u32,

    /// Sender channel.
    pub sender_channel: u32,

    /// Initial window size, in bytes.
    pub initial_window_size: u32,

    /// Maximum packet size, in bytes.
    pub maximum_packet_size: u32,
}

impl ChannelOpenConfirmation {
    const MAGIC: u8 = 91;
}

impl Encode for ChannelOpenConfirmation {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);
        w.put_u32(self.sender_channel);
        w.put_u32(self.initial_window_size);
        w.put_u32(self.maximum_packet_size);

        w.len() - start
    }
}

impl Decode for ChannelOpenConfirmation {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
            sender_channel: r.take_u32()?,
            initial_window_size: r.take_u32()?,
            maximum_packet_size: r.take_u32()?,
        })
    }
}

/// The `reason` in the `SSH_MSG_CHANNEL_OPEN_FAILURE` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOpenFailureReason {
    /// `SSH_OPEN_ADMINISTRATIVELY_PROHIBITED`.
    AdministrativelyProhibited,

    /// `SSH_OPEN_CONNECT_FAILED`.
    ConnectFailed,

    /// `SSH_OPEN_UNKNOWN_CHANNEL_TYPE`.
    UnknownChannelType,

    /// `SSH_OPEN_RESOURCE_SHORTAGE`.
    ResourceShortage,

    /// Any other reason, may be non-standard.
    Other(u32),
}

impl From<u32> for ChannelOpenFailureReason {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::AdministrativelyProhibited,
            2 => Self::ConnectFailed,
            3 => Self::UnknownChannelType,
            4 => Self::ResourceShortage,
            other => Self::Other(other),
        }
    }
}

impl From<ChannelOpenFailureReason> for u32 {
    fn from(value: ChannelOpenFailureReason) -> Self {
        match value {
            ChannelOpenFailureReason::AdministrativelyProhibited => 1,
            ChannelOpenFailureReason::ConnectFailed => 2,
            ChannelOpenFailureReason::UnknownChannelType => 3,
            ChannelOpenFailureReason::ResourceShortage => 4,
            ChannelOpenFailureReason::Other(other) => other,
        }
    }
}

/// The `SSH_MSG_CHANNEL_OPEN_FAILURE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.1>.
#[derive(Debug, Clone)]
pub struct ChannelOpenFailure {
    /// Recipient channel.
    pub recipient_channel: u32,

    /// Reason for the rejection.
    pub reason: ChannelOpenFailureReason,

    /// Description of the reason.
    pub description: Utf8,

    /// Language tag.
    pub language: Ascii,
}

impl ChannelOpenFailure {
    const MAGIC: u8 = 92;
}

impl Encode for ChannelOpenFailure {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);
        w.put_u32(self.reason.into());
        self.description.encode(w);
        self.language.encode(w);

        w.len() - start
    }
}

impl Decode for ChannelOpenFailure {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
            reason: r.take_u32()?.into(),
            description: Utf8::decode(r)?,
            language: Ascii::decode(r)?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_WINDOW_ADJUST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.2>.
#[derive(Debug, Clone)]
pub struct ChannelWindowAdjust {
    /// Recipient channel.
    pub recipient_channel: u32,

    /// Amount of bytes to add to the window.
    pub bytes_to_add: u32,
}

impl ChannelWindowAdjust {
    const MAGIC: u8 = 93;
}

impl Encode for ChannelWindowAdjust {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);
        w.put_u32(self.bytes_to_add);

        w.len() - start
    }
}

impl Decode for ChannelWindowAdjust {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
            bytes_to_add: r.take_u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_DATA` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.2>.
#[derive(Debug, Clone)]
pub struct ChannelData {
    /// Recipient channel.
    pub recipient_channel: u32,

    /// The data bytes.
    pub data: Bytes,
}

impl ChannelData {
    const MAGIC: u8 = 94;
}

impl Encode for ChannelData {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);
        self.data.encode(w);

        w.len() - start
    }
}

impl Decode for ChannelData {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
            data: Bytes::decode(r)?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_EXTENDED_DATA` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.2>.
#[derive(Debug, Clone)]
pub struct ChannelExtendedData {
    /// Recipient channel.
    pub recipient_channel: u32,

    /// The extended stream identifier, `1` for `SSH_EXTENDED_DATA_STDERR`.
    pub data_type: u32,

    /// The data bytes.
    pub data: Bytes,
}

impl ChannelExtendedData {
    const MAGIC: u8 = 95;
}

impl Encode for ChannelExtendedData {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);
        w.put_u32(self.data_type);
        self.data.encode(w);

        w.len() - start
    }
}

impl Decode for ChannelExtendedData {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
            data_type: r.take_u32()?,
            data: Bytes::decode(r)?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_EOF` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.3>.
#[derive(Debug, Clone)]
pub struct ChannelEof {
    /// Recipient channel.
    pub recipient_channel: u32,
}

impl ChannelEof {
    const MAGIC: u8 = 96;
}

impl Encode for ChannelEof {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);

        w.len() - start
    }
}

impl Decode for ChannelEof {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_CLOSE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.3>.
#[derive(Debug, Clone)]
pub struct ChannelClose {
    /// Recipient channel.
    pub recipient_channel: u32,
}

impl ChannelClose {
    const MAGIC: u8 = 97;
}

impl Encode for ChannelClose {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);

        w.len() - start
    }
}

impl Decode for ChannelClose {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.4>.
#[derive(Debug, Clone)]
pub struct ChannelRequest {
    /// Recipient channel.
    pub recipient_channel: u32,

    /// Whether the sender wants a reply.
    pub want_reply: bool,

    /// The context of the channel request.
    pub context: ChannelRequestContext,
}

impl ChannelRequest {
    const MAGIC: u8 = 98;
}

impl Encode for ChannelRequest {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);
        w.put_str(self.context.as_str());
        w.put_bool(self.want_reply);
        self.context.encode_body(w);

        w.len() - start
    }
}

impl Decode for ChannelRequest {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        let recipient_channel = r.take_u32()?;
        let kind = Ascii::decode(r)?;
        let want_reply = r.take_bool()?;

        Ok(Self {
            recipient_channel,
            want_reply,
            context: ChannelRequestContext::decode_body(kind, r)?,
        })
    }
}

/// The `context` in the `SSH_MSG_CHANNEL_REQUEST` message.
#[derive(Debug, Clone)]
pub enum ChannelRequestContext {
    /// A request of type `pty-req`,
    /// as defined in [RFC4254 section 6.2](https://datatracker.ietf.org/doc/html/rfc4254#section-6.2).
    PtyReq {
        /// The `TERM` environment variable value.
        term: Utf8,

        /// Terminal width, in characters.
        width_chars: u32,

        /// Terminal height, in rows.
        height_rows: u32,

        /// Terminal width, in pixels.
        width_pixels: u32,

        /// Terminal height, in pixels.
        height_pixels: u32,

        /// Encoded terminal modes.
        modes: Bytes,
    },

    /// A request of type `env`,
    /// as defined in [RFC4254 section 6.4](https://datatracker.ietf.org/doc/html/rfc4254#section-6.4).
    Env {
        /// The variable name.
        name: Utf8,

        /// The variable value.
        value: Utf8,
    },

    /// A request of type `shell`,
    /// as defined in [RFC4254 section 6.5](https://datatracker.ietf.org/doc/html/rfc4254#section-6.5).
    Shell,

    /// A request of type `exec`,
    /// as defined in [RFC4254 section 6.5](https://datatracker.ietf.org/doc/html/rfc4254#section-6.5).
    Exec {
        /// The command to execute.
        command: Utf8,
    },

    /// A request of type `subsystem`,
    /// as defined in [RFC4254 section 6.5](https://datatracker.ietf.org/doc/html/rfc4254#section-6.5).
    Subsystem {
        /// The name of the subsystem.
        name: Ascii,
    },

    /// A request of type `window-change`,
    /// as defined in [RFC4254 section 6.7](https://datatracker.ietf.org/doc/html/rfc4254#section-6.7).
    WindowChange {
        /// Terminal width, in characters.
        width_chars: u32,

        /// Terminal height, in rows.
        height_rows: u32,

        /// Terminal width, in pixels.
        width_pixels: u32,

        /// Terminal height, in pixels.
        height_pixels: u32,
    },

    /// A request of type `exit-status`,
    /// as defined in [RFC4254 section 6.10](https://datatracker.ietf.org/doc/html/rfc4254#section-6.10).
    ExitStatus {
        /// The command's exit status.
        code: u32,
    },

    /// A request of type `exit-signal`,
    /// as defined in [RFC4254 section 6.10](https://datatracker.ietf.org/doc/html/rfc4254#section-6.10).
    ExitSignal {
        /// The signal name, without the `SIG` prefix.
        name: Ascii,

        /// Whether a core dump occured.
        core_dumped: bool,

        /// A textual error message.
        error_message: Utf8,

        /// Language tag.
        language: Ascii,
    },

    /// A request of type `auth-agent-req@openssh.com`,
    /// asking the recipient to forward the SSH agent.
    AuthAgentReq,

    /// A request of a type this crate does not know about.
    Other {
        /// The request type name.
        kind: Ascii,

        /// The raw request-specific data.
        data: Vec<u8>,
    },
}

impl ChannelRequestContext {
    const PTY_REQ: &'static str = "pty-req";
    const ENV: &'static str = "env";
    const SHELL: &'static str = "shell";
    const EXEC: &'static str = "exec";
    const SUBSYSTEM: &'static str = "subsystem";
    const WINDOW_CHANGE: &'static str = "window-change";
    const EXIT_STATUS: &'static str = "exit-status";
    const EXIT_SIGNAL: &'static str = "exit-signal";
    const AUTH_AGENT_REQ: &'static str = "auth-agent-req@openssh.com";

    /// The request type name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PtyReq { .. } => Self::PTY_REQ,
            Self::Env { .. } => Self::ENV,
            Self::Shell => Self::SHELL,
            Self::Exec { .. } => Self::EXEC,
            Self::Subsystem { .. } => Self::SUBSYSTEM,
            Self::WindowChange { .. } => Self::WINDOW_CHANGE,
            Self::ExitStatus { .. } => Self::EXIT_STATUS,
            Self::ExitSignal { .. } => Self::EXIT_SIGNAL,
            Self::AuthAgentReq => Self::AUTH_AGENT_REQ,
            Self::Other { kind, .. } => kind,
        }
    }

    fn encode_body(&self, w: &mut Writer) {
        match self {
            Self::PtyReq {
                term,
                width_chars,
                height_rows,
                width_pixels,
                height_pixels,
                modes,
            } => {
                term.encode(w);
                w.put_u32(*width_chars);
                w.put_u32(*height_rows);
                w.put_u32(*width_pixels);
                w.put_u32(*height_pixels);
                modes.encode(w);
            }
            Self::Env { name, value } => {
                name.encode(w);
                value.encode(w);
            }
            Self::Shell | Self::AuthAgentReq => (),
            Self::Exec { command } => {
                command.encode(w);
            }
            Self::Subsystem { name } => {
                name.encode(w);
            }
            Self::WindowChange {
                width_chars,
                height_rows,
                width_pixels,
                height_pixels,
            } => {
                w.put_u32(*width_chars);
                w.put_u32(*height_rows);
                w.put_u32(*width_pixels);
                w.put_u32(*height_pixels);
            }
            Self::ExitStatus { code } => {
                w.put_u32(*code);
            }
            Self::ExitSignal {
                name,
                core_dumped,
                error_message,
                language,
            } => {
                name.encode(w);
                w.put_bool(*core_dumped);
                error_message.encode(w);
                language.encode(w);
            }
            Self::Other { data, .. } => w.put_raw(data),
        }
    }

    fn decode_body(kind: Ascii, r: &mut Reader<'_>) -> Result<Self> {
        Ok(match kind.as_str() {
            Self::PTY_REQ => Self::PtyReq {
                term: Utf8::decode(r)?,
                width_chars: r.take_u32()?,
                height_rows: r.take_u32()?,
                width_pixels: r.take_u32()?,
                height_pixels: r.take_u32()?,
                modes: Bytes::decode(r)?,
            },
            Self::ENV => Self::Env {
                name: Utf8::decode(r)?,
                value: Utf8::decode(r)?,
            },
            Self::SHELL => Self::Shell,
            Self::EXEC => Self::Exec {
                command: Utf8::decode(r)?,
            },
            Self::SUBSYSTEM => Self::Subsystem {
                name: Ascii::decode(r)?,
            },
            Self::WINDOW_CHANGE => Self::WindowChange {
                width_chars: r.take_u32()?,
                height_rows: r.take_u32()?,
                width_pixels: r.take_u32()?,
                height_pixels: r.take_u32()?,
            },
            Self::EXIT_STATUS => Self::ExitStatus {
                code: r.take_u32()?,
            },
            Self::EXIT_SIGNAL => Self::ExitSignal {
                name: Ascii::decode(r)?,
                core_dumped: r.take_bool()?,
                error_message: Utf8::decode(r)?,
                language: Ascii::decode(r)?,
            },
            Self::AUTH_AGENT_REQ => Self::AuthAgentReq,
            _ => Self::Other {
                kind,
                data: r.take_rest().to_vec(),
            },
        })
    }
}

/// The `SSH_MSG_CHANNEL_SUCCESS` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.4>.
#[derive(Debug, Clone)]
pub struct ChannelSuccess {
    /// Recipient channel.
    pub recipient_channel: u32,
}

impl ChannelSuccess {
    const MAGIC: u8 = 99;
}

impl Encode for ChannelSuccess {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);

        w.len() - start
    }
}

impl Decode for ChannelSuccess {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_FAILURE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.4>.
#[derive(Debug, Clone)]
pub struct ChannelFailure {
    /// Recipient channel.
    pub recipient_channel: u32,
}

impl ChannelFailure {
    const MAGIC: u8 = 100;
}

impl Encode for ChannelFailure {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.recipient_channel);

        w.len() - start
    }
}

impl Decode for ChannelFailure {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            recipient_channel: r.take_u32()?,
        })
    }
}

/// Message numbers of the `SSH-CONNECT` protocol, used by the
/// connection multiplexer to route without a full parse.
pub mod numbers {
    /// `SSH_MSG_GLOBAL_REQUEST`.
    pub const GLOBAL_REQUEST: u8 = 80;

    /// `SSH_MSG_REQUEST_SUCCESS`.
    pub const REQUEST_SUCCESS: u8 = 81;

    /// `SSH_MSG_REQUEST_FAILURE`.
    pub const REQUEST_FAILURE: u8 = 82;

    /// `SSH_MSG_CHANNEL_OPEN`.
    pub const CHANNEL_OPEN: u8 = 90;

    /// `SSH_MSG_CHANNEL_OPEN_CONFIRMATION`.
    pub const CHANNEL_OPEN_CONFIRMATION: u8 = 91;

    /// `SSH_MSG_CHANNEL_OPEN_FAILURE`.
    pub const CHANNEL_OPEN_FAILURE: u8 = 92;

    /// `SSH_MSG_CHANNEL_WINDOW_ADJUST`.
    pub const CHANNEL_WINDOW_ADJUST: u8 = 93;

    /// `SSH_MSG_CHANNEL_DATA`.
    pub const CHANNEL_DATA: u8 = 94;

    /// `SSH_MSG_CHANNEL_EXTENDED_DATA`.
    pub const CHANNEL_EXTENDED_DATA: u8 = 95;

    /// `SSH_MSG_CHANNEL_EOF`.
    pub const CHANNEL_EOF: u8 = 96;

    /// `SSH_MSG_CHANNEL_CLOSE`.
    pub const CHANNEL_CLOSE: u8 = 97;

    /// `SSH_MSG_CHANNEL_REQUEST`.
    pub const CHANNEL_REQUEST: u8 = 98;

    /// `SSH_MSG_CHANNEL_SUCCESS`.
    pub const CHANNEL_SUCCESS: u8 = 99;

    /// `SSH_MSG_CHANNEL_FAILURE`.
    pub const CHANNEL_FAILURE: u8 = 100;
}
