//! Messages involved in the SSH's **transport** (`SSH-TRANS`) part of the protocol,
//! as defined in the [RFC 4253](https://datatracker.ietf.org/doc/html/rfc4253).

use crate::{
    arch::{Ascii, Bytes, NameList, Utf8},
    codec::magic,
    Decode, Encode, Reader, Result, Writer,
};

/// The `SSH_MSG_DISCONNECT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.1>.
#[derive(Debug, Clone)]
pub struct Disconnect {
    /// Reason for disconnection.
    pub reason: DisconnectReason,

    /// Description of the reason for disconnection.
    pub description: Utf8,

    /// Language tag.
    pub language: Ascii,
}

impl Disconnect {
    const MAGIC: u8 = 1;
}

impl Encode for Disconnect {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.reason.into());
        self.description.encode(w);
        self.language.encode(w);

        w.len() - start
    }
}

impl Decode for Disconnect {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            reason: r.take_u32()?.into(),
            description: Utf8::decode(r)?,
            language: Ascii::decode(r)?,
        })
    }
}

/// The `reason` for disconnect in the `SSH_MSG_DISCONNECT` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `SSH_DISCONNECT_HOST_NOT_ALLOWED_TO_CONNECT`.
    HostNotAllowedToConnect,

    /// `SSH_DISCONNECT_PROTOCOL_ERROR`.
    ProtocolError,

    /// `SSH_DISCONNECT_KEY_EXCHANGE_FAILED`.
    KeyExchangeFailed,

    /// `SSH_DISCONNECT_RESERVED`.
    Reserved,

    /// `SSH_DISCONNECT_MAC_ERROR`.
    MacError,

    /// `SSH_DISCONNECT_COMPRESSION_ERROR`.
    CompressionError,

    /// `SSH_DISCONNECT_SERVICE_NOT_AVAILABLE`.
    ServiceNotAvailable,

    /// `SSH_DISCONNECT_PROTOCOL_VERSION_NOT_SUPPORTED`.
    ProtocolVersionNotSupported,

    /// `SSH_DISCONNECT_HOST_KEY_NOT_VERIFIABLE`.
    HostKeyNotVerifiable,

    /// `SSH_DISCONNECT_CONNECTION_LOST`.
    ConnectionLost,

    /// `SSH_DISCONNECT_BY_APPLICATION`.
    ByApplication,

    /// `SSH_DISCONNECT_TOO_MANY_CONNECTIONS`.
    TooManyConnections,

    /// `SSH_DISCONNECT_AUTH_CANCELLED_BY_USER`.
    AuthCancelledByUser,

    /// `SSH_DISCONNECT_NO_MORE_AUTH_METHODS_AVAILABLE`.
    NoMoreAuthMethodsAvailable,

    /// `SSH_DISCONNECT_ILLEGAL_USER_NAME`.
    IllegalUserName,

    /// Any other disconnect reason, may be non-standard.
    Other(u32),
}

impl From<u32> for DisconnectReason {
    fn from(value: u32) -> Self {
        match value {
            1 => Self::HostNotAllowedToConnect,
            2 => Self::ProtocolError,
            3 => Self::KeyExchangeFailed,
            4 => Self::Reserved,
            5 => Self::MacError,
            6 => Self::CompressionError,
            7 => Self::ServiceNotAvailable,
            8 => Self::ProtocolVersionNotSupported,
            9 => Self::HostKeyNotVerifiable,
            10 => Self::ConnectionLost,
            11 => Self::ByApplication,
            12 => Self::TooManyConnections,
            13 => Self::AuthCancelledByUser,
            14 => Self::NoMoreAuthMethodsAvailable,
            15 => Self::IllegalUserName,
            other => Self::Other(other),
        }
    }
}

impl From<DisconnectReason> for u32 {
    fn from(value: DisconnectReason) -> Self {
        match value {
            DisconnectReason::HostNotAllowedToConnect => 1,
            DisconnectReason::ProtocolError => 2,
            DisconnectReason::KeyExchangeFailed => 3,
            DisconnectReason::Reserved => 4,
            DisconnectReason::MacError => 5,
            DisconnectReason::CompressionError => 6,
            DisconnectReason::ServiceNotAvailable => 7,
            DisconnectReason::ProtocolVersionNotSupported => 8,
            DisconnectReason::HostKeyNotVerifiable => 9,
            DisconnectReason::ConnectionLost => 10,
            DisconnectReason::ByApplication => 11,
            DisconnectReason::TooManyConnections => 12,
            DisconnectReason::AuthCancelledByUser => 13,
            DisconnectReason::NoMoreAuthMethodsAvailable => 14,
            DisconnectReason::IllegalUserName => 15,
            DisconnectReason::Other(other) => other,
        }
    }
}

/// The `SSH_MSG_IGNORE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.2>.
#[derive(Debug, Default, Clone)]
pub struct Ignore {
    /// A random blob of data to ignore.
    pub data: Bytes,
}

impl Ignore {
    const MAGIC: u8 = 2;
}

impl Encode for Ignore {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.data.encode(w);

        w.len() - start
    }
}

impl Decode for Ignore {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            data: Bytes::decode(r)?,
        })
    }
}

/// The `SSH_MSG_UNIMPLEMENTED` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.4>.
#[derive(Debug, Clone)]
pub struct Unimplemented {
    /// Packet sequence number of the rejected message.
    pub seq: u32,
}

impl Unimplemented {
    const MAGIC: u8 = 3;
}

impl Encode for Unimplemented {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_u32(self.seq);

        w.len() - start
    }
}

impl Decode for Unimplemented {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            seq: r.take_u32()?,
        })
    }
}

/// The `SSH_MSG_DEBUG` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.3>.
#[derive(Debug, Default, Clone)]
pub struct Debug {
    /// Whether the debug data should be forcefully displayed.
    pub always_display: bool,

    /// The debug message.
    pub message: Utf8,

    /// Language tag.
    pub language: Ascii,
}

impl Debug {
    const MAGIC: u8 = 4;
}

impl Encode for Debug {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_bool(self.always_display);
        self.message.encode(w);
        self.language.encode(w);

        w.len() - start
    }
}

impl Decode for Debug {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            always_display: r.take_bool()?,
            message: Utf8::decode(r)?,
            language: Ascii::decode(r)?,
        })
    }
}

/// The `SSH_MSG_SERVICE_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-10>.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    /// The name of the requested service.
    pub service_name: Ascii,
}

impl ServiceRequest {
    const MAGIC: u8 = 5;
}

impl Encode for ServiceRequest {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.service_name.encode(w);

        w.len() - start
    }
}

impl Decode for ServiceRequest {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            service_name: Ascii::decode(r)?,
        })
    }
}

/// The `SSH_MSG_SERVICE_ACCEPT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-10>.
#[derive(Debug, Clone)]
pub struct ServiceAccept {
    /// The name of the accepted service.
    pub service_name: Ascii,
}

impl ServiceAccept {
    const MAGIC: u8 = 6;
}

impl Encode for ServiceAccept {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        self.service_name.encode(w);

        w.len() - start
    }
}

impl Decode for ServiceAccept {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self {
            service_name: Ascii::decode(r)?,
        })
    }
}

/// The `SSH_MSG_KEXINIT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-7.1>.
#[derive(Debug, Clone)]
pub struct KexInit {
    /// Random bytes distinguishing this negotiation.
    pub cookie: [u8; 16],

    /// Supported key-exchange algorithms, in preference order.
    pub kex_algorithms: NameList,

    /// Supported host-key algorithms, in preference order.
    pub server_host_key_algorithms: NameList,

    /// Supported encryption algorithms, client-to-server.
    pub encryption_algorithms_client_to_server: NameList,

    /// Supported encryption algorithms, server-to-client.
    pub encryption_algorithms_server_to_client: NameList,

    /// Supported MAC algorithms, client-to-server.
    pub mac_algorithms_client_to_server: NameList,

    /// Supported MAC algorithms, server-to-client.
    pub mac_algorithms_server_to_client: NameList,

    /// Supported compression algorithms, client-to-server.
    pub compression_algorithms_client_to_server: NameList,

    /// Supported compression algorithms, server-to-client.
    pub compression_algorithms_server_to_client: NameList,

    /// Supported languages, client-to-server.
    pub languages_client_to_server: NameList,

    /// Supported languages, server-to-client.
    pub languages_server_to_client: NameList,

    /// Whether a guessed key-exchange packet follows.
    pub first_kex_packet_follows: bool,
}

impl KexInit {
    const MAGIC: u8 = 20;
}

impl Encode for KexInit {
    fn encode(&self, w: &mut Writer) -> usize {
        let start = w.len();

        w.put_u8(Self::MAGIC);
        w.put_raw(&self.cookie);
        self.kex_algorithms.encode(w);
        self.server_host_key_algorithms.encode(w);
        self.encryption_algorithms_client_to_server.encode(w);
        self.encryption_algorithms_server_to_client.encode(w);
        self.mac_algorithms_client_to_server.encode(w);
        self.mac_algorithms_server_to_client.encode(w);
        self.compression_algorithms_client_to_server.encode(w);
        self.compression_algorithms_server_to_client.encode(w);
        self.languages_client_to_server.encode(w);
        self.languages_server_to_client.encode(w);
        w.put_bool(self.first_kex_packet_follows);
        w.put_u32(0); // reserved for future extension

        w.len() - start
    }
}

impl Decode for KexInit {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        let message = Self {
            cookie: r.take_raw(16)?.try_into().expect("span is 16 bytes"),
            kex_algorithms: NameList::decode(r)?,
            server_host_key_algorithms: NameList::decode(r)?,
            encryption_algorithms_client_to_server: NameList::decode(r)?,
            encryption_algorithms_server_to_client: NameList::decode(r)?,
            mac_algorithms_client_to_server: NameList::decode(r)?,
            mac_algorithms_server_to_client: NameList::decode(r)?,
            compression_algorithms_client_to_server: NameList::decode(r)?,
            compression_algorithms_server_to_client: NameList::decode(r)?,
            languages_client_to_server: NameList::decode(r)?,
            languages_server_to_client: NameList::decode(r)?,
            first_kex_packet_follows: r.take_bool()?,
        };
        r.take_u32()?; // reserved

        Ok(message)
    }
}

/// The `SSH_MSG_NEWKEYS` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-7.3>.
#[derive(Debug, Clone)]
pub struct NewKeys;

impl NewKeys {
    const MAGIC: u8 = 21;
}

impl Encode for NewKeys {
    fn encode(&self, w: &mut Writer) -> usize {
        w.put_u8(Self::MAGIC);

        1
    }
}

impl Decode for NewKeys {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        magic(r, Self::MAGIC)?;

        Ok(Self)
    }
}
