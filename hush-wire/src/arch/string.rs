use crate::{Decode, Encode, Reader, Result, Writer};

/// A `string` as defined in the SSH protocol, restricted to valid **UTF-8**.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4251#section-5>.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Utf8(String);

impl Utf8 {
    /// Create a new [`Utf8`] string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Views this [`Utf8`] as a `str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the [`Utf8`] to a [`String`].
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Utf8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Deref for Utf8 {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Into<String>> From<T> for Utf8 {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl Encode for Utf8 {
    fn encode(&self, w: &mut Writer) -> usize {
        w.put_str(&self.0);

        4 + self.0.len()
    }
}

impl Decode for Utf8 {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self(r.take_str()?.to_owned()))
    }
}

/// A `string` as defined in the SSH protocol, restricted to valid **US-ASCII**.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4251#section-5>.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Ascii(String);

impl Ascii {
    /// Create a new [`Ascii`] string, stripping any non-ASCII characters.
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().chars().filter(char::is_ascii).collect())
    }

    /// Views this [`Ascii`] as a `str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the [`Ascii`] to a [`String`].
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Ascii {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Deref for Ascii {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<str> for Ascii {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Ascii {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<T: AsRef<str>> From<T> for Ascii {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl Encode for Ascii {
    fn encode(&self, w: &mut Writer) -> usize {
        w.put_str(&self.0);

        4 + self.0.len()
    }
}

impl Decode for Ascii {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let text = r.take_str()?;
        if !text.is_ascii() {
            return Err(crate::Error::Unsupported("non-ASCII name string"));
        }

        Ok(Self(text.to_owned()))
    }
}
