//! The `known_hosts` file format: `host[,host...] keytype base64-blob [comment]`.
//!
//! The policy on mismatches (accept, prompt, reject) belongs to the
//! front-end; this module only parses, matches and renders lines.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::key::PublicKey;

/// One line of a `known_hosts` file.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The host patterns the key is valid for.
    pub hosts: Vec<String>,

    /// The key's algorithm name.
    pub algorithm: String,

    /// The raw public key blob.
    pub blob: Vec<u8>,

    /// Trailing free-form comment, if any.
    pub comment: Option<String>,
}

impl Entry {
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();

        let hosts = fields.next()?.split(',').map(str::to_owned).collect();
        let algorithm = fields.next()?.to_owned();
        let blob = STANDARD.decode(fields.next()?).ok()?;

        let comment = {
            let rest = fields.collect::<Vec<_>>().join(" ");

            (!rest.is_empty()).then_some(rest)
        };

        Some(Self {
            hosts,
            algorithm,
            blob,
            comment,
        })
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.hosts.join(","),
            self.algorithm,
            STANDARD.encode(&self.blob),
        )?;

        if let Some(comment) = &self.comment {
            write!(f, " {comment}")?;
        }

        Ok(())
    }
}

/// The outcome of a host-key lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// The host is known and presented the recorded key.
    Match,

    /// The host is known but presented a *different* key.
    Mismatch,

    /// The host has no entry for this key type.
    Unknown,
}

/// An in-memory `known_hosts` database.
#[derive(Debug, Clone, Default)]
pub struct KnownHosts {
    entries: Vec<Entry>,
}

impl KnownHosts {
    /// Parse a `known_hosts` document, skipping blank and `#` comment lines.
    pub fn parse(text: &str) -> Self {
        Self {
            entries: text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .filter_map(Entry::parse)
                .collect(),
        }
    }

    /// Look up `host` against the presented key `blob`.
    pub fn check(&self, host: &str, algorithm: &str, blob: &[u8]) -> Check {
        let mut outcome = Check::Unknown;

        for entry in &self.entries {
            if entry.algorithm != algorithm || !entry.hosts.iter().any(|own| own == host) {
                continue;
            }

            if entry.blob == blob {
                return Check::Match;
            }

            outcome = Check::Mismatch;
        }

        outcome
    }

    /// Record `key` for `host`, as [`Self::render`] will persist it.
    pub fn insert(&mut self, host: &str, key: &PublicKey) {
        self.entries.push(Entry {
            hosts: vec![host.to_owned()],
            algorithm: key.algorithm().as_ref().to_owned(),
            blob: key.to_blob(),
            comment: None,
        });
    }

    /// The recorded entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Render the database back to its file format.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{entry}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PrivateKey;

    #[test]
    fn it_parses_and_matches() {
        let key = PrivateKey::random().public_key();

        let mut hosts = KnownHosts::default();
        hosts.insert("bastion.example.org", &key);

        let rendered = hosts.render();
        let reparsed = KnownHosts::parse(&format!("# managed\n\n{rendered}"));

        assert_eq!(
            reparsed.check("bastion.example.org", "ssh-ed25519", &key.to_blob()),
            Check::Match,
        );
        assert_eq!(
            reparsed.check("bastion.example.org", "ssh-ed25519", b"not the key"),
            Check::Mismatch,
        );
        assert_eq!(
            reparsed.check("elsewhere.example.org", "ssh-ed25519", &key.to_blob()),
            Check::Unknown,
        );
    }

    #[test]
    fn it_keeps_multi_host_lines_and_comments() {
        let key = PrivateKey::random().public_key();
        let line = format!(
            "alpha,beta {} {} trusted since 2024\n",
            key.algorithm().as_ref(),
            base64::engine::general_purpose::STANDARD.encode(key.to_blob()),
        );

        let hosts = KnownHosts::parse(&line);

        assert_eq!(hosts.entries().len(), 1);
        assert_eq!(hosts.check("beta", "ssh-ed25519", &key.to_blob()), Check::Match);
        assert_eq!(
            hosts.entries()[0].comment.as_deref(),
            Some("trusted since 2024"),
        );
        assert_eq!(hosts.render(), line);
    }
}
