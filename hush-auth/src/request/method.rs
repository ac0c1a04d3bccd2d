use hush::key::PrivateKey;
use hush_wire::userauth;

/// The authentication methods the client may attempt.
pub(super) enum Method {
    /// The SSH `none` authentication method.
    None,

    /// The SSH `publickey` authentication method.
    Publickey {
        /// The identity to authenticate with.
        key: Box<PrivateKey>,
    },

    /// The SSH `password` authentication method.
    Password {
        /// The password to authenticate with.
        password: String,
    },

    /// The SSH `keyboard-interactive` authentication method;
    /// the prompt responder lives on the [`Auth`](super::Auth) itself.
    KeyboardInteractive,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => userauth::Method::NONE,
            Self::Publickey { .. } => userauth::Method::PUBLICKEY,
            Self::Password { .. } => userauth::Method::PASSWORD,
            Self::KeyboardInteractive => userauth::Method::KEYBOARD_INTERACTIVE,
        }
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Allow keys with different public blobs to coexist in the set.
            (Self::Publickey { key }, Self::Publickey { key: other }) => {
                key.public_key().to_blob() == other.public_key().to_blob()
            }
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Eq for Method {}

impl std::hash::Hash for Method {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);

        if let Self::Publickey { key } = self {
            key.public_key().to_blob().hash(state);
        }
    }
}
