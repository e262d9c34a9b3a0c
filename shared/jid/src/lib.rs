//! XMPP address (JID) helpers shared by Rostergate crates.
//!
//! User input is first checked against a loose syntax pattern so obviously
//! broken addresses never leave the form. Accepted input is then canonicalized
//! into a [`BareJid`]: surrounding whitespace trimmed, resource dropped, bare
//! part lowercased. Everything downstream (roster keys, classification
//! requests, trust records) works on the bare form only.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Result type exposed by the JID helpers.
pub type Result<T> = std::result::Result<T, JidError>;

/// Errors raised while splitting an address into its parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JidError {
    #[error("address is empty")]
    Empty,
    #[error("address has no domain part")]
    MissingHost,
}

/// Reason raw input cannot be submitted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputProblem {
    Empty,
    Invalid,
}

// Optional local-part, then a domain with a dot and a 2+ char trailing segment.
static PLAUSIBLE_JID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^@]+@)?.+\..{2,}$").expect("invalid PLAUSIBLE_JID pattern"));

/// Returns true when `raw` looks like `user@domain.tld` or `domain.tld`.
///
/// The check runs on the input exactly as typed; trimming happens later in
/// [`split_jid`].
pub fn is_plausible_jid(raw: &str) -> bool {
    PLAUSIBLE_JID.is_match(raw)
}

/// Classifies raw input into "submittable" or the first problem found.
pub fn validate_input(raw: &str) -> std::result::Result<(), InputProblem> {
    if raw.is_empty() {
        return Err(InputProblem::Empty);
    }
    if !is_plausible_jid(raw) {
        return Err(InputProblem::Invalid);
    }
    Ok(())
}

/// Structural parts of an address after canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JidParts {
    node: Option<String>,
    host: String,
    resource: Option<String>,
}

impl JidParts {
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The resource as typed. It never takes part in the bare address.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn bare(&self) -> BareJid {
        match &self.node {
            Some(node) => BareJid(format!("{}@{}", node, self.host)),
            None => BareJid(self.host.clone()),
        }
    }
}

/// Splits `raw` into node, host and resource.
///
/// The resource is cut at the first `/` and keeps its case; the bare part is
/// lowercased and split at the first `@`. An empty local-part counts as
/// absent. Fails with [`JidError::MissingHost`] when nothing is left for the
/// domain.
pub fn split_jid(raw: &str) -> Result<JidParts> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(JidError::Empty);
    }

    let (bare, resource) = match trimmed.find('/') {
        Some(slash) => {
            let resource = &trimmed[slash + 1..];
            (
                &trimmed[..slash],
                (!resource.is_empty()).then(|| resource.to_string()),
            )
        }
        None => (trimmed, None),
    };

    let bare = bare.to_lowercase();
    let (node, host) = match bare.find('@') {
        Some(at) => {
            let node = Some(bare[..at].to_string()).filter(|node| !node.is_empty());
            (node, bare[at + 1..].to_string())
        }
        None => (None, bare),
    };

    if host.is_empty() {
        return Err(JidError::MissingHost);
    }

    Ok(JidParts {
        node,
        host,
        resource,
    })
}

/// Canonical `node@host` (or bare `host`) address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BareJid(String);

impl BareJid {
    /// Canonicalizes `raw` and keeps only the bare part.
    pub fn parse(raw: &str) -> Result<Self> {
        split_jid(raw).map(|parts| parts.bare())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn node(&self) -> Option<&str> {
        self.0.split_once('@').map(|(node, _)| node)
    }

    pub fn host(&self) -> &str {
        self.0.split_once('@').map_or(self.0.as_str(), |(_, host)| host)
    }
}

impl Display for BareJid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BareJid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BareJid {
    type Error = JidError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<BareJid> for String {
    fn from(jid: BareJid) -> Self {
        jid.0
    }
}

impl AsRef<str> for BareJid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
