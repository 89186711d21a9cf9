pub mod auth;
pub mod body;
pub mod client;
pub mod error;

pub use auth::StoredCredentials;
pub use body::decode_body;
pub use client::{Label, MailboxClient};
pub use error::{MailError, Result};
