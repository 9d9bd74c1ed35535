//! Credential layer for Tally.
//!
//! Three concerns live here:
//! - Password hashing: salted keyed-BLAKE3 digests, stored as
//!   `salt-hex$digest-hex`.
//! - Access tokens: JSON claims (subject, role, issue/expiry times) signed
//!   with the server's ed25519 key. Stateless: the credential travels with
//!   every request and no session store exists.
//! - Capabilities: an [`Action`] enumeration and a single role -> action
//!   table, checked before any ledger mutation.

pub mod capability;
pub mod error;
pub mod password;
pub mod token;

pub use capability::{allows, authorize, Action};
pub use error::AuthError;
pub use password::{generate_password, hash_password, verify_password};
pub use token::{Claims, TokenSigner};
