use std::fmt;

use sharenote_store::StoreError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::messages;

/// The orchestration step a store failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Publish,
    Update,
    Delete,
    List,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Publish => "publish",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
        })
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The path slugifies to nothing; a blank slug marks unpublished records.
    #[error("'{path}' does not produce a slug")]
    EmptySlug { path: String },

    /// Lookup by slug found nothing where a record was required.
    #[error("no published note with slug '{slug}'")]
    NotFound { slug: String },

    #[error("{action} failed")]
    Store {
        action: Action,
        #[source]
        source: StoreError,
    },
}

impl PublishError {
    pub(crate) fn store(action: Action) -> impl FnOnce(StoreError) -> Self {
        move |source| PublishError::Store { action, source }
    }

    /// Short text shown to the user; the cause chain goes to the log.
    pub fn notice(&self) -> &'static str {
        match self {
            PublishError::Config(_) => messages::SETTINGS_NOT_SET,
            PublishError::EmptySlug { .. } => messages::UNPUBLISHABLE_PATH,
            PublishError::NotFound { .. } => messages::NOTE_NOT_FOUND,
            PublishError::Store { action, .. } => match action {
                Action::Publish => messages::CREATING_ERROR,
                Action::Update => messages::UPDATING_ERROR,
                Action::Delete => messages::DELETING_ERROR,
                Action::List => messages::LISTING_ERROR,
            },
        }
    }

    /// Whether the user can fix this without the backend changing.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            PublishError::Config(_) | PublishError::EmptySlug { .. } | PublishError::NotFound { .. }
        )
    }
}
