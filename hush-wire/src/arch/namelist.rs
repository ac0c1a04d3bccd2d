use crate::{Decode, Encode, Error, Reader, Result, Writer};

/// A `name-list` as defined in the SSH protocol, a comma-separated
/// list of US-ASCII names carried in a `string`.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4251#section-5>.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameList(Vec<String>);

impl NameList {
    /// Create a [`NameList`] from the provided names.
    pub fn new(names: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self(
            names
                .into_iter()
                .map(|name| name.as_ref().to_owned())
                .collect(),
        )
    }

    /// Whether the list contains the provided `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|own| own == name)
    }

    /// The first name in `self` — the preference order — that also
    /// appears in `other`, as used by the algorithm negotiation.
    pub fn preferred_in(&self, other: &Self) -> Option<&str> {
        self.0
            .iter()
            .find(|name| other.contains(name))
            .map(String::as_str)
    }

    /// Iterate over the names in the list.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: AsRef<str>> FromIterator<T> for NameList {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl std::fmt::Display for NameList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl Encode for NameList {
    fn encode(&self, w: &mut Writer) -> usize {
        let joined = self.0.join(",");
        w.put_str(&joined);

        4 + joined.len()
    }
}

impl Decode for NameList {
    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let text = r.take_str()?;
        if !text.is_ascii() {
            return Err(Error::Unsupported("non-ASCII name-list"));
        }

        Ok(Self(match text {
            "" => Vec::new(),
            _ => text.split(',').map(str::to_owned).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_roundtrips_and_negotiates() {
        let ours = NameList::new(["curve25519-sha256", "diffie-hellman-group14-sha1"]);
        let theirs = NameList::new(["diffie-hellman-group14-sha1", "curve25519-sha256"]);

        let bytes = ours.to_bytes();
        let read = NameList::decode(&mut Reader::new(&bytes)).unwrap();

        assert_eq!(read, ours);
        assert_eq!(ours.preferred_in(&theirs), Some("curve25519-sha256"));
        assert_eq!(theirs.preferred_in(&ours), Some("diffie-hellman-group14-sha1"));
        assert_eq!(
            NameList::decode(&mut Reader::new(&NameList::default().to_bytes()))
                .unwrap(),
            NameList::default()
        );
    }
}
