use enumset::EnumSetType;
use hush_wire::userauth;

/// The authentication methods the server may advertise.
#[derive(EnumSetType, Debug)]
pub(super) enum Method {
    None,
    Password,
    Publickey,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => userauth::Method::NONE,
            Self::Password => userauth::Method::PASSWORD,
            Self::Publickey => userauth::Method::PUBLICKEY,
        }
    }
}
