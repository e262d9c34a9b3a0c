//! Address-type answers returned by an account's classification oracle.

use serde::{Deserialize, Serialize};

/// Kind of entity behind an address, as reported by the server.
///
/// Kept open: kinds this crate does not know about are preserved verbatim in
/// [`AddressKind::Other`] instead of being folded into an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AddressKind {
    /// A user account (`"account"`).
    Account,
    /// A multi-user chat room (`"muc"`).
    Muc,
    Other(String),
}

impl AddressKind {
    pub fn as_str(&self) -> &str {
        match self {
            AddressKind::Account => "account",
            AddressKind::Muc => "muc",
            AddressKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for AddressKind {
    fn from(value: &str) -> Self {
        match value {
            "account" => AddressKind::Account,
            "muc" => AddressKind::Muc,
            other => AddressKind::Other(other.to_string()),
        }
    }
}

impl From<String> for AddressKind {
    fn from(value: String) -> Self {
        AddressKind::from(value.as_str())
    }
}

impl From<AddressKind> for String {
    fn from(kind: AddressKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One classification answer: the kind plus an optional server message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: AddressKind,
    pub error_message: Option<String>,
}

impl Classification {
    pub fn account() -> Self {
        Self {
            kind: AddressKind::Account,
            error_message: None,
        }
    }

    pub fn muc() -> Self {
        Self {
            kind: AddressKind::Muc,
            error_message: None,
        }
    }

    /// An answer with a raw server kind and optional server text. Known kinds
    /// map onto their variants.
    pub fn from_server(kind: impl Into<String>, error_message: Option<String>) -> Self {
        Self {
            kind: AddressKind::from(kind.into()),
            error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_parse_and_unknown_kinds_survive() {
        assert_eq!(AddressKind::from("account"), AddressKind::Account);
        assert_eq!(AddressKind::from("muc"), AddressKind::Muc);

        let other = AddressKind::from("gateway");
        assert_eq!(other, AddressKind::Other("gateway".into()));
        assert_eq!(other.as_str(), "gateway");
    }

    #[test]
    fn raw_kinds_never_wrap_known_variants() {
        assert_eq!(Classification::from_server("account", None).kind, AddressKind::Account);
        assert_eq!(Classification::from_server("muc", None).kind, AddressKind::Muc);

        for raw in ["account", "muc", "gateway"] {
            let kind = Classification::from_server(raw, None).kind;
            assert_eq!(AddressKind::from(kind.as_str()), kind);
        }
    }

    #[test]
    fn kinds_serialize_as_plain_strings() {
        let json = serde_json::to_string(&Classification::muc()).unwrap();
        assert!(json.contains("\"kind\":\"muc\""));

        let parsed: Classification =
            serde_json::from_str(r#"{"kind":"error","error_message":"item-not-found"}"#).unwrap();
        assert_eq!(parsed.kind, AddressKind::Other("error".into()));
        assert_eq!(parsed.error_message.as_deref(), Some("item-not-found"));
    }
}
