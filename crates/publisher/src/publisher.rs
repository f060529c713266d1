use sharenote_kernel::slugify;
use sharenote_store::{Field, Fields, Filter, ListQuery, Record, RecordStore};

use crate::config::PublisherConfig;
use crate::error::{Action, PublishError};

/// Whether a publish inserted a new record or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Created,
    Updated,
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub kind: WriteKind,
    pub slug: String,
    pub link: String,
    pub record: Record,
}

/// A published record and its public link.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedNote {
    pub slug: String,
    pub title: String,
    pub link: String,
}

/// Create-or-update orchestration keyed by slug.
///
/// Each operation checks the configuration, performs at most one lookup and
/// one mutation, and never retries.
pub struct Publisher<S> {
    store: S,
    config: PublisherConfig,
}

impl<S: RecordStore> Publisher<S> {
    pub fn new(store: S, config: PublisherConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Publish `content` under the slug derived from `path`.
    pub async fn publish(
        &self,
        path: &str,
        title: &str,
        content: &str,
    ) -> Result<Published, PublishError> {
        self.config.validate()?;

        let slug = slugify(path);
        if slug.is_empty() {
            return Err(PublishError::EmptySlug {
                path: path.to_string(),
            });
        }
        let fields = Fields::document(slug.as_str(), title, content);

        let (kind, record) = match self.find_by_slug(&slug, Action::Publish).await? {
            None => {
                tracing::info!(%slug, "no record for slug, creating one");
                let record = self
                    .store
                    .create(&fields)
                    .await
                    .map_err(PublishError::store(Action::Publish))?;
                (WriteKind::Created, record)
            }
            Some(existing) => {
                tracing::info!(%slug, id = %existing.id, "found record for slug, updating");
                let record = self
                    .store
                    .update(&existing.id, &fields)
                    .await
                    .map_err(PublishError::store(Action::Publish))?;
                (WriteKind::Updated, record)
            }
        };

        Ok(self.published(kind, slug, record))
    }

    /// Delete the record published from `path`.
    pub async fn remove_by_slug(&self, path: &str) -> Result<Record, PublishError> {
        self.config.validate()?;

        let slug = slugify(path);
        let record = self
            .find_by_slug(&slug, Action::Delete)
            .await?
            .ok_or_else(|| PublishError::NotFound { slug: slug.clone() })?;

        self.store
            .delete(&record.id)
            .await
            .map_err(PublishError::store(Action::Delete))?;

        tracing::info!(%slug, id = %record.id, "record deleted");
        Ok(record)
    }

    /// Apply `fields`, and only those, to the record published from `path`.
    pub async fn update_by_slug(
        &self,
        path: &str,
        fields: &Fields,
    ) -> Result<Published, PublishError> {
        self.config.validate()?;

        let slug = slugify(path);
        let existing = self
            .find_by_slug(&slug, Action::Update)
            .await?
            .ok_or_else(|| PublishError::NotFound { slug: slug.clone() })?;

        if fields.is_empty() {
            tracing::debug!(%slug, "partial update carries no fields");
        }

        let record = self
            .store
            .update(&existing.id, fields)
            .await
            .map_err(PublishError::store(Action::Update))?;

        tracing::info!(%slug, id = %record.id, "record updated");
        Ok(self.published(WriteKind::Updated, slug, record))
    }

    /// Every record on the first page that carries a slug.
    pub async fn list_published(&self) -> Result<Vec<PublishedNote>, PublishError> {
        self.config.validate()?;

        let records = self
            .store
            .list(&ListQuery::all())
            .await
            .map_err(PublishError::store(Action::List))?;

        Ok(records
            .iter()
            .filter_map(|record| {
                let slug = record.slug()?;
                Some(PublishedNote {
                    slug: slug.to_string(),
                    title: record.fields.title.clone().unwrap_or_default(),
                    link: self.config.link_for(slug),
                })
            })
            .collect())
    }

    async fn find_by_slug(&self, slug: &str, action: Action) -> Result<Option<Record>, PublishError> {
        // `{slug} = ''` would match every unpublished record.
        if slug.is_empty() {
            tracing::debug!("empty slug never names a published record");
            return Ok(None);
        }

        // Two records are requested so duplicates can be reported.
        let query = ListQuery::matching(Filter::field_eq(Field::Slug, slug)).limit(2);
        let records = self
            .store
            .list(&query)
            .await
            .map_err(PublishError::store(action))?;

        if records.len() > 1 {
            let ids: Vec<&str> = records.iter().map(|record| record.id.as_str()).collect();
            tracing::warn!(%slug, ?ids, "several records share this slug; using the first");
        }

        Ok(records.into_iter().next())
    }

    fn published(&self, kind: WriteKind, slug: String, record: Record) -> Published {
        let slug = record
            .slug()
            .map(slugify)
            .unwrap_or(slug);
        Published {
            kind,
            link: self.config.link_for(&slug),
            slug,
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use sharenote_store::{MemoryStore, MockRecordStore, StoreCall, StoreError};
    use tracing_test::traced_test;

    fn config() -> PublisherConfig {
        PublisherConfig {
            api_key: "keyABC".to_string(),
            base_id: "appBase".to_string(),
            table: "Notes".to_string(),
            website_url: "https://notes.example".to_string(),
        }
    }

    fn slug_query(slug: &str) -> ListQuery {
        ListQuery::matching(Filter::field_eq(Field::Slug, slug)).limit(2)
    }

    #[tokio::test]
    async fn publish_creates_when_slug_is_unknown() {
        let publisher = Publisher::new(MemoryStore::new(), config());

        let published = publisher
            .publish("My Notes/Déjà vu.md", "Déjà vu", "# content")
            .await
            .unwrap();

        assert_eq!(published.kind, WriteKind::Created);
        assert_eq!(published.slug, "my-notes-deja-vumd");
        assert_eq!(published.link, "https://notes.example/notes/my-notes-deja-vumd");

        let records = publisher.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields, Fields::document("my-notes-deja-vumd", "Déjà vu", "# content"));
        assert!(!publisher
            .store()
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::Update { .. })));
    }

    #[tokio::test]
    async fn publish_updates_in_place_when_slug_exists() {
        let store = MemoryStore::with_records([Fields::document("notes-amd", "Old", "old body")]);
        let id = store.records()[0].id.clone();
        let publisher = Publisher::new(store, config());

        let published = publisher.publish("notes/a.md", "a", "new body").await.unwrap();

        assert_eq!(published.kind, WriteKind::Updated);
        assert_eq!(published.record.id, id);
        let records = publisher.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields, Fields::document("notes-amd", "a", "new body"));
        assert!(!publisher
            .store()
            .calls()
            .iter()
            .any(|call| matches!(call, StoreCall::Create(_))));
    }

    #[tokio::test]
    async fn publish_then_lookup_round_trips() {
        let publisher = Publisher::new(MemoryStore::new(), config());
        publisher.publish("Ideas.md", "Ideas", "body text").await.unwrap();

        let found = publisher
            .store()
            .list(&ListQuery::matching(Filter::field_eq(Field::Slug, "ideasmd")))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fields.data.as_deref(), Some("body text"));
        assert_eq!(found[0].fields.title.as_deref(), Some("Ideas"));
    }

    #[tokio::test]
    #[traced_test]
    async fn duplicate_slugs_update_the_first_record() {
        let store = MemoryStore::with_records([
            Fields::document("dup", "First", "1"),
            Fields::document("dup", "Second", "2"),
        ]);
        let first_id = store.records()[0].id.clone();
        let publisher = Publisher::new(store, config());

        let published = publisher.publish("dup", "Fresh", "3").await.unwrap();

        assert_eq!(published.record.id, first_id);
        assert_eq!(publisher.store().records()[1].fields.title.as_deref(), Some("Second"));
        assert!(logs_contain("several records share this slug"));
    }

    #[tokio::test]
    #[traced_test]
    async fn unique_slug_lookup_does_not_warn() {
        let store = MemoryStore::with_records([Fields::document("solo", "Solo", "1")]);
        let publisher = Publisher::new(store, config());

        publisher.publish("solo", "Solo", "2").await.unwrap();

        assert!(!logs_contain("several records share this slug"));
    }

    fn unpublished_draft() -> MemoryStore {
        MemoryStore::with_records([Fields {
            title: Some("Draft row kept in the table".to_string()),
            data: Some("keep".to_string()),
            ..Fields::default()
        }])
    }

    #[tokio::test]
    async fn blank_slug_publish_is_refused_without_store_calls() {
        let publisher = Publisher::new(unpublished_draft(), config());

        let err = publisher.publish("!!!", "Bang", "overwrite").await.unwrap_err();

        assert!(matches!(err, PublishError::EmptySlug { ref path } if path == "!!!"));
        assert!(err.is_user_correctable());
        assert_eq!(err.notice(), crate::messages::UNPUBLISHABLE_PATH);
        assert!(publisher.store().calls().is_empty());
        let records = publisher.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields.data.as_deref(), Some("keep"));
        assert_eq!(records[0].fields.slug, None);
    }

    #[tokio::test]
    async fn blank_slug_never_matches_unpublished_records() {
        let publisher = Publisher::new(unpublished_draft(), config());

        let removed = publisher.remove_by_slug("???").await.unwrap_err();
        let updated = publisher
            .update_by_slug(
                "???",
                &Fields {
                    title: Some("Renamed".to_string()),
                    ..Fields::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(removed, PublishError::NotFound { ref slug } if slug.is_empty()));
        assert!(matches!(updated, PublishError::NotFound { .. }));
        assert!(publisher.store().calls().is_empty());
        assert_eq!(
            publisher.store().records()[0].fields.title.as_deref(),
            Some("Draft row kept in the table")
        );
    }

    #[tokio::test]
    async fn remove_unknown_slug_is_not_found_without_delete() {
        let publisher = Publisher::new(MemoryStore::new(), config());

        let err = publisher.remove_by_slug("Missing.md").await.unwrap_err();

        assert!(matches!(err, PublishError::NotFound { ref slug } if slug == "missingmd"));
        assert_eq!(publisher.store().calls(), vec![StoreCall::List(slug_query("missingmd"))]);
    }

    #[tokio::test]
    async fn remove_deletes_the_matching_record() {
        let store = MemoryStore::with_records([
            Fields::document("keep", "Keep", ""),
            Fields::document("drop", "Drop", ""),
        ]);
        let publisher = Publisher::new(store, config());

        let removed = publisher.remove_by_slug("drop").await.unwrap();

        assert_eq!(removed.fields.title.as_deref(), Some("Drop"));
        let remaining = publisher.store().records();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].slug(), Some("keep"));
    }

    #[tokio::test]
    async fn update_by_slug_sends_only_given_fields() {
        let store = MemoryStore::with_records([Fields::document("draft", "Draft", "body")]);
        let id = store.records()[0].id.clone();
        let publisher = Publisher::new(store, config());
        let changes = Fields {
            password: Some("hunter2".to_string()),
            ..Fields::default()
        };

        publisher.update_by_slug("Draft", &changes).await.unwrap();

        let calls = publisher.store().calls();
        assert_eq!(
            calls.last(),
            Some(&StoreCall::Update {
                id,
                fields: changes
            })
        );
        let stored = &publisher.store().records()[0].fields;
        assert_eq!(stored.title.as_deref(), Some("Draft"));
        assert_eq!(stored.data.as_deref(), Some("body"));
        assert_eq!(stored.password.as_deref(), Some("hunter2"));
    }

    #[tokio::test]
    async fn update_by_slug_on_unknown_slug_is_not_found() {
        let publisher = Publisher::new(MemoryStore::new(), config());
        let err = publisher
            .update_by_slug("nope", &Fields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::NotFound { .. }));
        assert_eq!(publisher.store().calls().len(), 1);
    }

    #[tokio::test]
    async fn incomplete_config_short_circuits_every_operation() {
        for blank in sharenote_kernel::settings::CredentialKey::ALL {
            let mut config = config();
            config.set(blank, "");
            // No expectations: any store call panics.
            let publisher = Publisher::new(MockRecordStore::new(), config);

            assert!(matches!(
                publisher.publish("a", "a", "a").await,
                Err(PublishError::Config(_))
            ));
            assert!(matches!(
                publisher.remove_by_slug("a").await,
                Err(PublishError::Config(_))
            ));
            assert!(matches!(
                publisher.update_by_slug("a", &Fields::default()).await,
                Err(PublishError::Config(_))
            ));
            assert!(matches!(
                publisher.list_published().await,
                Err(PublishError::Config(_))
            ));
        }
    }

    #[tokio::test]
    async fn failed_create_is_a_publish_error() {
        let mut store = MockRecordStore::new();
        store
            .expect_list()
            .with(eq(slug_query("a")))
            .times(1)
            .returning(|_| Ok(vec![]));
        store.expect_create().times(1).returning(|_| {
            Err(StoreError::Api {
                status: 422,
                payload: serde_json::json!({"error": {"type": "INVALID_VALUE_FOR_COLUMN"}}),
            })
        });
        let publisher = Publisher::new(store, config());

        let err = publisher.publish("a", "A", "").await.unwrap_err();

        assert!(matches!(
            err,
            PublishError::Store {
                action: Action::Publish,
                ..
            }
        ));
        assert_eq!(err.notice(), crate::messages::CREATING_ERROR);
    }

    #[tokio::test]
    async fn failed_lookup_stops_before_mutation() {
        let mut store = MockRecordStore::new();
        store.expect_list().times(1).returning(|_| {
            Err(StoreError::Api {
                status: 503,
                payload: serde_json::Value::Null,
            })
        });
        store.expect_delete().never();
        let publisher = Publisher::new(store, config());

        let err = publisher.remove_by_slug("a").await.unwrap_err();
        assert_eq!(err.notice(), crate::messages::DELETING_ERROR);
    }

    #[tokio::test]
    async fn failed_delete_surfaces_store_error() {
        let mut store = MockRecordStore::new();
        store.expect_list().returning(|_| {
            Ok(vec![Record {
                id: "rec1".to_string(),
                created_time: None,
                fields: Fields::document("a", "A", ""),
            }])
        });
        store
            .expect_delete()
            .withf(|id| id == "rec1")
            .times(1)
            .returning(|id| Err(StoreError::RecordNotFound(id.to_string())));
        let publisher = Publisher::new(store, config());

        let err = publisher.remove_by_slug("a").await.unwrap_err();
        assert!(matches!(
            err,
            PublishError::Store {
                action: Action::Delete,
                source: StoreError::RecordNotFound(_)
            }
        ));
    }

    #[tokio::test]
    async fn listing_skips_unpublished_records() {
        let store = MemoryStore::with_records([
            Fields::document("visible", "Visible", ""),
            Fields {
                title: Some("Scratch".to_string()),
                ..Fields::default()
            },
        ]);
        let publisher = Publisher::new(store, config());

        let notes = publisher.list_published().await.unwrap();

        assert_eq!(
            notes,
            vec![PublishedNote {
                slug: "visible".to_string(),
                title: "Visible".to_string(),
                link: "https://notes.example/notes/visible".to_string(),
            }]
        );
    }
}
