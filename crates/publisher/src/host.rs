//! The editor-facing boundary.
//!
//! Nothing past this point returns an error: every failure becomes one
//! notification, and the cause is logged.

use sharenote_store::{Fields, RecordStore};

use crate::error::PublishError;
use crate::messages;
use crate::publisher::{Published, PublishedNote, Publisher, WriteKind};

/// Surface for short, user-visible status messages.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Destination for public links.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> anyhow::Result<()>;
}

/// How an editor command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The store was changed; carries the public link when there is one.
    Done { link: Option<String> },
    /// The user can fix the cause (configuration, unknown note).
    Rejected,
    /// The backend call failed.
    Failed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Done { .. })
    }
}

/// Runs publisher operations on behalf of an editor host.
pub struct Session<'a, S> {
    publisher: &'a Publisher<S>,
    notifier: &'a dyn Notifier,
    clipboard: &'a dyn Clipboard,
}

impl<'a, S: RecordStore> Session<'a, S> {
    pub fn new(
        publisher: &'a Publisher<S>,
        notifier: &'a dyn Notifier,
        clipboard: &'a dyn Clipboard,
    ) -> Self {
        Self {
            publisher,
            notifier,
            clipboard,
        }
    }

    pub async fn publish(&self, path: &str, title: &str, content: &str) -> Outcome {
        match self.publisher.publish(path, title, content).await {
            Ok(published) => self.share(published),
            Err(err) => self.fail(err),
        }
    }

    pub async fn update(&self, path: &str, fields: &Fields) -> Outcome {
        match self.publisher.update_by_slug(path, fields).await {
            Ok(published) => self.share(published),
            Err(err) => self.fail(err),
        }
    }

    pub async fn remove(&self, path: &str) -> Outcome {
        match self.publisher.remove_by_slug(path).await {
            Ok(_) => {
                self.notifier.notify(messages::DELETED_NOTE);
                Outcome::Done { link: None }
            }
            Err(err) => self.fail(err),
        }
    }

    /// Published notes, or `None` after notifying about the failure.
    pub async fn list(&self) -> Option<Vec<PublishedNote>> {
        match self.publisher.list_published().await {
            Ok(notes) => {
                if notes.is_empty() {
                    self.notifier.notify(messages::NO_PUBLISHED_NOTES);
                }
                Some(notes)
            }
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn share(&self, published: Published) -> Outcome {
        let copied = match self.clipboard.write_text(&published.link) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, link = %published.link, "could not copy link");
                false
            }
        };

        if copied {
            self.notifier.notify(match published.kind {
                WriteKind::Created => messages::CREATED_NOTE,
                WriteKind::Updated => messages::NOTE_UPDATED,
            });
        } else {
            self.notifier.notify(&published.link);
        }

        Outcome::Done {
            link: Some(published.link),
        }
    }

    fn fail(&self, err: PublishError) -> Outcome {
        if err.is_user_correctable() {
            tracing::warn!(error = %err, "operation rejected");
        } else {
            tracing::error!(
                error = &err as &(dyn std::error::Error + 'static),
                "operation failed"
            );
        }
        self.notifier.notify(err.notice());

        if err.is_user_correctable() {
            Outcome::Rejected
        } else {
            Outcome::Failed
        }
    }
}
