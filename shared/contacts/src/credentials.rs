//! Contact payloads produced by scanning a QR code.
//!
//! The scanner hands over text such as
//! `xmpp:alice@example.com?omemo-sid-1234=05ab...;preauth=TOKEN`. This module
//! turns that text into a [`ScannedContact`]: the address to prefill, the OMEMO
//! fingerprints keyed by device id, and an optional pre-authentication token
//! that lets the peer's server auto-approve the subscription.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use percent_encoding::percent_decode_str;
use url::Url;

const XMPP_SCHEME: &str = "xmpp";
const OMEMO_SID_PREFIX: &str = "omemo-sid-";
const PREAUTH_KEY: &str = "preauth";
const JOIN_KEY: &str = "join";
const FINGERPRINT_GROUP: usize = 8;

/// Errors raised while reading a scanned payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("scanned code contains no address")]
    MissingAddress,
    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(String),
    #[error("malformed URI: {0}")]
    InvalidUri(String),
    #[error("invalid OMEMO device id: {0}")]
    InvalidDeviceId(String),
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),
}

pub type Result<T> = std::result::Result<T, CredentialError>;

/// Normalized identity-key fingerprint (lowercase hex, no separators).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Accepts hex with optional whitespace or `:` separators.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CredentialError::InvalidFingerprint(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form in blocks of eight hex characters.
    pub fn grouped(&self) -> String {
        self.0
            .as_bytes()
            .chunks(FINGERPRINT_GROUP)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprints attached to a scanned address, keyed by OMEMO device id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedCredential(BTreeMap<u32, Fingerprint>);

impl ScannedCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, device_id: u32, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.0.insert(device_id, fingerprint)
    }

    pub fn get(&self, device_id: u32) -> Option<&Fingerprint> {
        self.0.get(&device_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Fingerprint)> {
        self.0.iter().map(|(id, fp)| (*id, fp))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u32, Fingerprint)> for ScannedCredential {
    fn from_iter<I: IntoIterator<Item = (u32, Fingerprint)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decoded content of a contact QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedContact {
    /// Address as carried by the code; validated by the form like typed input.
    pub address: String,
    pub credential: ScannedCredential,
    pub preauth_token: Option<String>,
    /// The code asked to join a room rather than add a contact.
    pub join_hint: bool,
}

impl ScannedContact {
    /// Parses scanner text: an `xmpp:` URI or a plain address.
    pub fn from_uri(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CredentialError::MissingAddress);
        }

        let has_scheme = text
            .get(..XMPP_SCHEME.len() + 1)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("xmpp:"));
        if !has_scheme {
            if text.contains("://") {
                let scheme = text.split("://").next().unwrap_or_default();
                return Err(CredentialError::UnsupportedScheme(scheme.to_string()));
            }
            return Ok(Self {
                address: text.to_string(),
                credential: ScannedCredential::new(),
                preauth_token: None,
                join_hint: false,
            });
        }

        let uri = Url::parse(text).map_err(|e| CredentialError::InvalidUri(e.to_string()))?;
        // `Url` percent-encodes non-ASCII path bytes, so raw and encoded
        // addresses both come back through the decoder.
        let address = percent_decode_str(uri.path().trim_start_matches('/'))
            .decode_utf8()
            .map_err(|e| CredentialError::InvalidUri(e.to_string()))?
            .into_owned();
        if address.is_empty() {
            return Err(CredentialError::MissingAddress);
        }

        let mut credential = ScannedCredential::new();
        let mut preauth_token = None;
        let mut join_hint = false;

        // xmpp: URIs separate query pairs with ';' (RFC 5122).
        for part in uri.query().unwrap_or_default().split(';') {
            for (key, value) in url::form_urlencoded::parse(part.as_bytes()) {
                if let Some(device) = key.strip_prefix(OMEMO_SID_PREFIX) {
                    let device_id = device
                        .parse::<u32>()
                        .map_err(|_| CredentialError::InvalidDeviceId(device.to_string()))?;
                    credential.insert(device_id, Fingerprint::parse(&value)?);
                } else if key == PREAUTH_KEY && !value.is_empty() {
                    preauth_token = Some(value.into_owned());
                } else if key == JOIN_KEY {
                    join_hint = true;
                }
            }
        }

        Ok(Self {
            address,
            credential,
            preauth_token,
            join_hint,
        })
    }
}
