//! Runtime behind the "add contact or channel" flow of an XMPP client.
//!
//! [`form::AddContactForm`] holds the screen state, [`resolver::AddressResolver`]
//! turns a submitted address into a roster outcome, and [`storage`] persists
//! contacts and imported key trust. Network-facing collaborators are traits in
//! [`accounts`], [`groups`] and [`invitations`]; [`memory`] has scripted
//! implementations of each.

pub mod accounts;
pub mod config;
pub mod form;
pub mod groups;
pub mod invitations;
pub mod memory;
pub mod resolver;
pub mod state;
pub mod storage;

pub use accounts::{Account, AccountDirectory, AccountSelection};
pub use config::AppConfig;
pub use form::{AddContactForm, AlertKind, FormAlert, InvitationAlert, SubmitResult};
pub use groups::{GroupService, JoinHandlerRegistry};
pub use invitations::{request_invitation, InvitationService};
pub use resolver::AddressResolver;
pub use state::AppState;
pub use storage::{ContactStore, RosterStorage, TrustImport, TrustStore};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
