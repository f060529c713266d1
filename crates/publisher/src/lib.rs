//! Publishing notes to the record store, keyed by slug.
//!
//! [`Publisher`] performs the lookups and writes and reports typed errors.
//! [`Session`] sits at the editor boundary: it turns every outcome into one
//! short notification and copies public links to the clipboard.

pub mod config;
pub mod error;
pub mod host;
pub mod messages;
pub mod publisher;

pub use config::{ConfigError, PublisherConfig};
pub use error::{Action, PublishError};
pub use host::{Clipboard, Notifier, Outcome, Session};
pub use publisher::{Published, PublishedNote, Publisher, WriteKind};
