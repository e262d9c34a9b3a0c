//! Invitation links created through the account's server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-issued invitation: a landing page the invitee opens to set up a
/// client, after which both sides are added to each other's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub landing_url: String,
    pub expires: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn new(landing_url: impl Into<String>, expires: Option<DateTime<Utc>>) -> Self {
        Self {
            landing_url: landing_url.into(),
            expires,
        }
    }

    /// Invitations without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Expiry in a short human-readable form, if any.
    pub fn expiry_label(&self) -> Option<String> {
        self.expires
            .map(|expires| format!("This invitation will expire on {}", expires.format("%Y-%m-%d %H:%M UTC")))
    }

    /// Text to hand to the platform share sheet or clipboard.
    pub fn share_text(&self) -> String {
        format!(
            "Direct your buddy to this webpage for instructions on how to setup an xmpp client. \
             You will then automatically be added to their contact list.\n{}",
            self.landing_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn expiry_is_compared_against_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let open = Invitation::new("https://example.com/i/abc", None);
        let later = Invitation::new("https://example.com/i/abc", Some(now + Duration::hours(1)));
        let earlier = Invitation::new("https://example.com/i/abc", Some(now - Duration::hours(1)));

        assert!(!open.is_expired(now));
        assert!(!later.is_expired(now));
        assert!(earlier.is_expired(now));
    }

    #[test]
    fn share_text_carries_landing_url() {
        let expires = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let invitation = Invitation::new("https://example.com/i/abc", Some(expires));

        assert!(invitation.share_text().ends_with("https://example.com/i/abc"));
        assert_eq!(
            invitation.expiry_label().as_deref(),
            Some("This invitation will expire on 2024-05-01 12:30 UTC")
        );
    }
}
